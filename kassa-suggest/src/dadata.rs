use crate::traits::{
    AddressSuggestions, SuggestBound, SuggestError, SuggestOptions, Suggestion,
};
use async_trait::async_trait;
use kassa_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};

const SUGGEST_ADDRESS_PATH: &str = "suggest/address";

/// Client for a DaData-style suggestion service.
///
/// Authenticates with `Authorization: Token <key>`; the token never appears
/// in log events.
pub struct DadataClient {
    client: HttpClient,
    token: String,
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    query: &'a str,
    count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_bound: Option<BoundValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_bound: Option<BoundValue>,
}

#[derive(Serialize)]
struct BoundValue {
    value: &'static str,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

impl DadataClient {
    pub fn new(endpoint: &str, token: String) -> Result<Self, SuggestError> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| SuggestError::Config(format!("HttpClient init failed: {e}")))?;
        Ok(Self { client, token })
    }

    fn bounds(opts: &SuggestOptions) -> (Option<BoundValue>, Option<BoundValue>) {
        match opts.bound {
            Some(SuggestBound::CityToSettlement) => (
                Some(BoundValue { value: "city" }),
                Some(BoundValue { value: "settlement" }),
            ),
            None => (None, None),
        }
    }
}

#[async_trait]
impl AddressSuggestions for DadataClient {
    async fn suggest(
        &self,
        query: &str,
        opts: &SuggestOptions,
    ) -> Result<Vec<Suggestion>, SuggestError> {
        let (from_bound, to_bound) = Self::bounds(opts);
        let req = SuggestRequest {
            query,
            count: opts.count,
            from_bound,
            to_bound,
        };

        let resp: SuggestResponse = self
            .client
            .post_json(
                SUGGEST_ADDRESS_PATH,
                &req,
                RequestOpts {
                    auth: Some(Auth::Token(&self.token)),
                    ..Default::default()
                },
            )
            .await
            .map_err(http_to_suggest)?;

        tracing::debug!(
            query_len = query.len(),
            returned = resp.suggestions.len(),
            scoped = opts.bound.is_some(),
            "suggest.response"
        );
        Ok(resp.suggestions)
    }
}

fn http_to_suggest(e: HttpError) -> SuggestError {
    match e {
        HttpError::Network(m) => SuggestError::Network(m),
        other => SuggestError::Api(other.to_string()),
    }
}
