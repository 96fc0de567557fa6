use crate::feeders::spawn_page_feeders;
use anyhow::Result;
use kassa_actors::{actor::Addr, builder::Builder};
use kassa_common::KassaError;
use kassa_config::{KassaConfig, SuggestionsConfig};
use kassa_dom::{Document, PageMetrics};
use kassa_forms::binder::{SuggestBinder, SuggestBinderConfig};
use kassa_page::markup::standard_checkout_document;
use kassa_page::PageActor;
use kassa_suggest::{AddressSuggestions, DadataClient};
use std::sync::Arc;

const DEFAULT_MAILBOX: usize = 256;

pub struct Tether {
    builder: Builder,
}

impl Tether {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(),
        }
    }
    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }
    pub async fn run(self) -> Result<()> {
        self.builder.run_until_ctrl_c().await
    }
}

/// Decide whether autocompletion is wired at all. The missing token is the
/// single startup failure of the feature: one diagnostic, binder omitted,
/// everything else on the page unaffected.
fn autocomplete_parts(
    doc: &Document,
    cfg: &SuggestionsConfig,
) -> kassa_common::Result<(Option<SuggestBinder>, Option<Arc<dyn AddressSuggestions>>)> {
    let Some(token) = &cfg.token else {
        tracing::error!("suggestion token not configured; address autocomplete disabled");
        return Ok((None, None));
    };

    let client = DadataClient::new(&cfg.endpoint, token.clone())
        .map_err(|e| KassaError::Config(format!("suggestion client: {e}")))?;
    let binder = SuggestBinder::attach(
        doc,
        SuggestBinderConfig {
            min_chars: cfg.min_chars,
            count: cfg.count,
        },
    );
    Ok((Some(binder), Some(Arc::new(client) as Arc<dyn AddressSuggestions>)))
}

pub async fn build_from_config(t: &mut Tether, cfg: KassaConfig) -> Result<Addr<PageActor>> {
    let b = t.builder_mut();
    let shutdown = b.shutdown_handle();

    let r_page = b.reserve::<PageActor>("page:checkout", DEFAULT_MAILBOX);

    let doc = standard_checkout_document(PageMetrics {
        inner_width: cfg.page.inner_width,
        body_width: cfg.page.body_width,
    });
    let (binder, provider) = autocomplete_parts(&doc, &cfg.suggestions)?;

    let page = PageActor::new(doc, binder, provider);
    b.start_reserved(r_page, page);

    let addr: Addr<PageActor> = b.addr("page:checkout").expect("page addr");
    spawn_page_feeders(addr.clone(), shutdown);
    Ok(addr)
}
