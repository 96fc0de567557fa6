//! Address-suggestion contract and clients.
//!
//! The form layer only sees [`traits::AddressSuggestions`]; the concrete
//! [`dadata::DadataClient`] speaks the suggestion service's HTTP dialect.
pub mod dadata;
pub mod traits;

pub use dadata::DadataClient;
pub use traits::{
    AddressSuggestions, SuggestBound, SuggestError, SuggestOptions, Suggestion, SuggestionData,
};
