//! Address autocomplete binder.
//!
//! Watches the city and address fields, decides when a suggestion query
//! should fire, holds the latest results per field, and applies a picked
//! suggestion to the form. The actual fetch is owned by the page runtime;
//! the binder only describes it, so it stays synchronous and testable.

use kassa_dom::{Document, EventKind, NodeId, PageEvent};
use kassa_suggest::{SuggestBound, SuggestOptions, Suggestion};

pub const CITY_FIELD_ID: &str = "city";
pub const ADDRESS_FIELD_ID: &str = "address";
pub const POSTCODE_FIELD_ID: &str = "postcode";

pub const ERROR_CLASS: &str = "input-error";
pub const SUCCESS_CLASS: &str = "input-success";

/// Which of the two bound fields an event or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundField {
    City,
    Address,
}

#[derive(Debug, Clone)]
pub struct SuggestBinderConfig {
    /// Minimum typed characters before a query fires.
    pub min_chars: usize,
    /// Maximum suggestions requested per query.
    pub count: u8,
}

impl Default for SuggestBinderConfig {
    fn default() -> Self {
        Self {
            min_chars: 3,
            count: 5,
        }
    }
}

/// A fetch the runtime should perform on the binder's behalf.
#[derive(Debug, Clone)]
pub struct SuggestQuery {
    pub field: BoundField,
    /// Monotonic per-field sequence; stale results are dropped by it.
    pub seq: u64,
    pub query: String,
    pub opts: SuggestOptions,
}

struct FieldState {
    node: NodeId,
    seq: u64,
    items: Vec<Suggestion>,
}

pub struct SuggestBinder {
    city: Option<FieldState>,
    address: Option<FieldState>,
    config: SuggestBinderConfig,
}

impl SuggestBinder {
    /// Bind to whatever of the two fields the document actually has.
    /// A missing field is logged and skipped; the other keeps working.
    pub fn attach(doc: &Document, config: SuggestBinderConfig) -> Self {
        let bind = |id: &str| match doc.element_by_id(id) {
            Ok(node) => Some(FieldState {
                node,
                seq: 0,
                items: Vec::new(),
            }),
            Err(_) => {
                tracing::warn!(field = id, "suggest field missing; not binding");
                None
            }
        };
        Self {
            city: bind(CITY_FIELD_ID),
            address: bind(ADDRESS_FIELD_ID),
            config,
        }
    }

    fn field_of(&self, node: NodeId) -> Option<BoundField> {
        if self.city.as_ref().is_some_and(|f| f.node == node) {
            return Some(BoundField::City);
        }
        if self.address.as_ref().is_some_and(|f| f.node == node) {
            return Some(BoundField::Address);
        }
        None
    }

    fn state_mut(&mut self, field: BoundField) -> Option<&mut FieldState> {
        match field {
            BoundField::City => self.city.as_mut(),
            BoundField::Address => self.address.as_mut(),
        }
    }

    /// React to an event on a bound field. Returns the query to run, if the
    /// typed value has reached the trigger threshold.
    pub fn on_event(&mut self, event: &PageEvent, doc: &Document) -> Option<SuggestQuery> {
        if event.kind != EventKind::Input {
            return None;
        }
        let field = self.field_of(event.target)?;
        let value = doc.value(event.target).to_string();
        if value.chars().count() < self.config.min_chars {
            return None;
        }

        let count = self.config.count;
        let state = self.state_mut(field)?;
        state.seq += 1;
        let bound = match field {
            BoundField::City => Some(SuggestBound::CityToSettlement),
            BoundField::Address => None,
        };
        Some(SuggestQuery {
            field,
            seq: state.seq,
            query: value,
            opts: SuggestOptions { count, bound },
        })
    }

    /// Store fetched results. Results from a superseded query are dropped.
    pub fn on_results(&mut self, field: BoundField, seq: u64, items: Vec<Suggestion>) {
        let Some(state) = self.state_mut(field) else {
            return;
        };
        if seq != state.seq {
            tracing::debug!(?field, seq, current = state.seq, "stale suggestions dropped");
            return;
        }
        state.items = items;
    }

    pub fn suggestions(&self, field: BoundField) -> &[Suggestion] {
        match field {
            BoundField::City => self.city.as_ref().map(|f| f.items.as_slice()),
            BoundField::Address => self.address.as_ref().map(|f| f.items.as_slice()),
        }
        .unwrap_or(&[])
    }

    /// Apply a picked suggestion to the form. Field writes use the same
    /// null-tolerant semantics as the page markup: a missing target field
    /// is a no-op, not a fault.
    pub fn on_pick(&mut self, target: NodeId, index: usize, doc: &mut Document) {
        let Some(field) = self.field_of(target) else {
            return;
        };
        let Some(picked) = self.suggestions(field).get(index).cloned() else {
            return;
        };

        match field {
            BoundField::City => {
                let name = picked
                    .data
                    .city
                    .as_deref()
                    .or(picked.data.settlement.as_deref());
                if let (Some(name), Some(state)) = (name, self.city.as_ref()) {
                    doc.set_value(state.node, name);
                }
            }
            BoundField::Address => {
                if let (Some(city), Some(state)) = (picked.data.city.as_deref(), self.city.as_ref())
                {
                    doc.set_value(state.node, city);
                }
                if let Some(postal_code) = picked.data.postal_code.as_deref() {
                    if let Ok(postcode) = doc.element_by_id(POSTCODE_FIELD_ID) {
                        doc.set_value(postcode, postal_code);
                        doc.remove_class(postcode, ERROR_CLASS);
                        doc.add_class(postcode, SUCCESS_CLASS);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_dom::{Document, ElementSpec, PageMetrics};
    use kassa_suggest::SuggestionData;

    fn checkout_doc() -> Document {
        let mut doc = Document::new(PageMetrics {
            inner_width: 1280.0,
            body_width: 1263.0,
        });
        let body = doc.body();
        for id in [CITY_FIELD_ID, ADDRESS_FIELD_ID, POSTCODE_FIELD_ID] {
            doc.append_element(body, ElementSpec::new("input").with_id(id));
        }
        doc
    }

    fn suggestion(
        city: Option<&str>,
        settlement: Option<&str>,
        postal_code: Option<&str>,
    ) -> Suggestion {
        Suggestion {
            value: "display".into(),
            unrestricted_value: None,
            data: SuggestionData {
                city: city.map(str::to_string),
                settlement: settlement.map(str::to_string),
                postal_code: postal_code.map(str::to_string),
                ..Default::default()
            },
        }
    }

    fn input_event(doc: &mut Document, id: &str, value: &str) -> PageEvent {
        let node = doc.element_by_id(id).unwrap();
        doc.set_value(node, value);
        PageEvent::new(node, EventKind::Input)
    }

    #[test]
    fn queries_fire_only_at_the_threshold() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());

        let ev = input_event(&mut doc, CITY_FIELD_ID, "Тв");
        assert!(binder.on_event(&ev, &doc).is_none());

        let ev = input_event(&mut doc, CITY_FIELD_ID, "Тве");
        let q = binder.on_event(&ev, &doc).expect("threshold reached");
        assert_eq!(q.field, BoundField::City);
        assert_eq!(q.query, "Тве");
        assert_eq!(q.opts.bound, Some(SuggestBound::CityToSettlement));
    }

    #[test]
    fn address_queries_are_unscoped() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let ev = input_event(&mut doc, ADDRESS_FIELD_ID, "Lenina 5");
        let q = binder.on_event(&ev, &doc).unwrap();
        assert_eq!(q.field, BoundField::Address);
        assert_eq!(q.opts.bound, None);
    }

    #[test]
    fn stale_results_are_dropped_by_sequence() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());

        let ev = input_event(&mut doc, CITY_FIELD_ID, "Тве");
        let first = binder.on_event(&ev, &doc).unwrap();
        let ev = input_event(&mut doc, CITY_FIELD_ID, "Твер");
        let second = binder.on_event(&ev, &doc).unwrap();

        binder.on_results(
            BoundField::City,
            first.seq,
            vec![suggestion(Some("Тверия"), None, None)],
        );
        assert!(binder.suggestions(BoundField::City).is_empty());

        binder.on_results(
            BoundField::City,
            second.seq,
            vec![suggestion(Some("Тверь"), None, None)],
        );
        assert_eq!(binder.suggestions(BoundField::City).len(), 1);
    }

    #[test]
    fn city_pick_prefers_city_then_settlement() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let city_node = doc.element_by_id(CITY_FIELD_ID).unwrap();

        let ev = input_event(&mut doc, CITY_FIELD_ID, "Тве");
        let q = binder.on_event(&ev, &doc).unwrap();
        binder.on_results(
            BoundField::City,
            q.seq,
            vec![
                suggestion(Some("Тверь"), None, None),
                suggestion(None, Some("Заволжский"), None),
            ],
        );

        binder.on_pick(city_node, 1, &mut doc);
        assert_eq!(doc.value(city_node), "Заволжский");

        binder.on_pick(city_node, 0, &mut doc);
        assert_eq!(doc.value(city_node), "Тверь");
    }

    #[test]
    fn address_pick_fills_city_and_postcode_and_flips_styling() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let city_node = doc.element_by_id(CITY_FIELD_ID).unwrap();
        let address_node = doc.element_by_id(ADDRESS_FIELD_ID).unwrap();
        let postcode_node = doc.element_by_id(POSTCODE_FIELD_ID).unwrap();
        doc.add_class(postcode_node, ERROR_CLASS);

        let ev = input_event(&mut doc, ADDRESS_FIELD_ID, "Lenina 5");
        let q = binder.on_event(&ev, &doc).unwrap();
        binder.on_results(
            BoundField::Address,
            q.seq,
            vec![suggestion(Some("Тверь"), None, Some("123456"))],
        );

        binder.on_pick(address_node, 0, &mut doc);
        assert_eq!(doc.value(city_node), "Тверь");
        assert_eq!(doc.value(postcode_node), "123456");
        assert!(!doc.has_class(postcode_node, ERROR_CLASS));
        assert!(doc.has_class(postcode_node, SUCCESS_CLASS));
    }

    #[test]
    fn address_pick_without_postcode_leaves_styling_alone() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let address_node = doc.element_by_id(ADDRESS_FIELD_ID).unwrap();
        let postcode_node = doc.element_by_id(POSTCODE_FIELD_ID).unwrap();
        doc.add_class(postcode_node, ERROR_CLASS);

        let ev = input_event(&mut doc, ADDRESS_FIELD_ID, "Lenina 5");
        let q = binder.on_event(&ev, &doc).unwrap();
        binder.on_results(
            BoundField::Address,
            q.seq,
            vec![suggestion(Some("Тверь"), None, None)],
        );

        binder.on_pick(address_node, 0, &mut doc);
        assert_eq!(doc.value(postcode_node), "");
        assert!(doc.has_class(postcode_node, ERROR_CLASS));
        assert!(!doc.has_class(postcode_node, SUCCESS_CLASS));
    }

    #[test]
    fn missing_fields_are_skipped_without_faulting() {
        let mut doc = Document::new(PageMetrics {
            inner_width: 1280.0,
            body_width: 1263.0,
        });
        let body = doc.body();
        doc.append_element(body, ElementSpec::new("input").with_id(ADDRESS_FIELD_ID));

        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let address_node = doc.element_by_id(ADDRESS_FIELD_ID).unwrap();

        let ev = input_event(&mut doc, ADDRESS_FIELD_ID, "Lenina 5");
        let q = binder.on_event(&ev, &doc).unwrap();
        binder.on_results(
            BoundField::Address,
            q.seq,
            vec![suggestion(Some("Тверь"), None, Some("123456"))],
        );

        // No #city and no #postcode: the pick is a quiet no-op.
        binder.on_pick(address_node, 0, &mut doc);
        assert_eq!(doc.value(address_node), "Lenina 5");
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let mut doc = checkout_doc();
        let mut binder = SuggestBinder::attach(&doc, SuggestBinderConfig::default());
        let city_node = doc.element_by_id(CITY_FIELD_ID).unwrap();
        binder.on_pick(city_node, 3, &mut doc);
        assert_eq!(doc.value(city_node), "");
    }
}
