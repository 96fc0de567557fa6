//! Phone input mask.
//!
//! Rebuilds the field's display value from its digits on every relevant
//! event. The template's digit positions (the underscores and the country
//! digit itself) are fill slots; everything else is literal chrome.

use kassa_dom::{Dispatch, Document, EventKind, NodeId, PageEvent};
use regex::Regex;

pub const MASK_TEMPLATE: &str = "+7 (___) ___ ____";

/// Caret positions below this land inside the literal prefix and the
/// keystroke's default action is suppressed.
const PREFIX_EDIT_GUARD: usize = 3;

/// Values shorter than this are "nothing meaningfully entered".
const SHORT_VALUE_LEN: usize = 5;

const DIGIT_KEY_RANGE: std::ops::RangeInclusive<u32> = 48..=57;

/// Mask state for one `tel` input. Each bound field tracks its own last
/// key code independently.
pub struct PhoneMask {
    field: NodeId,
    last_key_code: Option<u32>,
}

impl PhoneMask {
    pub fn new(field: NodeId) -> Self {
        Self {
            field,
            last_key_code: None,
        }
    }

    /// One mask per `input[type="tel"]` in the document.
    pub fn attach_all(doc: &Document) -> Vec<PhoneMask> {
        doc.inputs_of_type("tel").into_iter().map(Self::new).collect()
    }

    pub fn field(&self) -> NodeId {
        self.field
    }

    pub fn handles(&self, event: &PageEvent) -> bool {
        event.target == self.field
            && matches!(
                event.kind,
                EventKind::Input | EventKind::Focus | EventKind::Blur | EventKind::KeyDown(_)
            )
    }

    pub fn on_event(&mut self, event: &PageEvent, doc: &mut Document, dispatch: &mut Dispatch) {
        if !self.handles(event) {
            return;
        }

        // Zero key codes are ignored, like a falsy keyCode in the DOM event.
        if let Some(code) = event.key_code() {
            if code != 0 {
                self.last_key_code = Some(code);
            }
        }

        if doc.caret(self.field) < PREFIX_EDIT_GUARD {
            dispatch.prevent_default();
        }

        let raw = doc.value(self.field).to_string();
        let candidate = fill_template(&raw);

        let digit_key = matches!(&self.last_key_code, Some(c) if DIGIT_KEY_RANGE.contains(c));
        let accept = !matches_template_prefix(&raw)
            || raw.chars().count() < SHORT_VALUE_LEN
            || digit_key;
        if accept {
            doc.set_value(self.field, &candidate);
        }

        if event.kind == EventKind::Blur
            && doc.value(self.field).chars().count() < SHORT_VALUE_LEN
        {
            doc.set_value(self.field, "");
        }
    }
}

/// A template position is a fill slot if it is an underscore or a digit.
fn is_slot(ch: char) -> bool {
    ch == '_' || ch.is_ascii_digit()
}

/// Substitute the raw value's digits into the template's slots in order,
/// then cut at the first unfilled slot. The cut index is floored to 3 when
/// it would land inside the literal prefix.
fn fill_template(raw: &str) -> String {
    let mut digits = raw.chars().filter(char::is_ascii_digit);
    let filled: String = MASK_TEMPLATE
        .chars()
        .map(|ch| {
            if is_slot(ch) {
                digits.next().unwrap_or(ch)
            } else {
                ch
            }
        })
        .collect();

    match filled.chars().position(|c| c == '_') {
        Some(i) => {
            let cut = if i < 5 { 3 } else { i };
            filled.chars().take(cut).collect()
        }
        None => filled,
    }
}

/// Does the raw value match the template's shape, up to its own length?
/// Underscore runs become `\d{1,N}`; literal chrome matches itself.
fn matches_template_prefix(raw: &str) -> bool {
    let len = raw.chars().count();
    let prefix: Vec<char> = MASK_TEMPLATE.chars().take(len).collect();

    let mut pattern = String::from("^");
    let mut i = 0;
    while i < prefix.len() {
        if prefix[i] == '_' {
            let start = i;
            while i < prefix.len() && prefix[i] == '_' {
                i += 1;
            }
            pattern.push_str(&format!("\\d{{1,{}}}", i - start));
        } else {
            pattern.push_str(&regex::escape(&prefix[i].to_string()));
            i += 1;
        }
    }
    pattern.push('$');

    Regex::new(&pattern)
        .expect("template-derived pattern is valid")
        .is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_dom::{key_code_for, Document, ElementSpec, PageMetrics};

    fn phone_doc() -> (Document, NodeId) {
        let mut doc = Document::new(PageMetrics {
            inner_width: 1280.0,
            body_width: 1263.0,
        });
        let body = doc.body();
        let phone = doc.append_element(
            body,
            ElementSpec::new("input")
                .with_id("phone")
                .with_input_type("tel"),
        );
        (doc, phone)
    }

    /// Drive the field the way a user types: keydown first, then the
    /// default insertion and the input event unless suppressed.
    fn type_str(mask: &mut PhoneMask, doc: &mut Document, text: &str) {
        let field = mask.field();
        for ch in text.chars() {
            let mut dispatch = Dispatch::new();
            mask.on_event(
                &PageEvent::new(field, EventKind::KeyDown(key_code_for(ch))),
                doc,
                &mut dispatch,
            );
            if !dispatch.default_prevented() {
                doc.insert_at_caret(field, ch);
                mask.on_event(
                    &PageEvent::new(field, EventKind::Input),
                    doc,
                    &mut Dispatch::new(),
                );
            }
        }
    }

    #[test]
    fn full_number_renders_complete_template() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);
        type_str(&mut mask, &mut doc, "71234567890");
        assert_eq!(doc.value(phone), "+7 (123) 456 7890");
    }

    #[test]
    fn template_literals_hold_at_every_typed_length() {
        let literal_positions: Vec<(usize, char)> = MASK_TEMPLATE
            .chars()
            .enumerate()
            .filter(|(_, ch)| !is_slot(*ch))
            .collect();

        for n in 1..=11 {
            let (mut doc, phone) = phone_doc();
            let mut mask = PhoneMask::new(phone);
            type_str(&mut mask, &mut doc, &"71234567890"[..n]);

            let value: Vec<char> = doc.value(phone).chars().collect();
            for &(i, ch) in &literal_positions {
                if i < value.len() {
                    assert_eq!(
                        value[i], ch,
                        "literal at {i} broken after typing {n} digits: {:?}",
                        doc.value(phone)
                    );
                }
            }
        }
    }

    #[test]
    fn first_keystroke_into_empty_field_is_suppressed_but_seeds_prefix() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);

        let mut dispatch = Dispatch::new();
        mask.on_event(
            &PageEvent::new(phone, EventKind::KeyDown(key_code_for('9'))),
            &mut doc,
            &mut dispatch,
        );
        assert!(dispatch.default_prevented());
        assert_eq!(doc.value(phone), "+7 ");
    }

    #[test]
    fn blur_clears_short_values() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);
        type_str(&mut mask, &mut doc, "7");
        assert_eq!(doc.value(phone), "+7 ");

        mask.on_event(
            &PageEvent::new(phone, EventKind::Blur),
            &mut doc,
            &mut Dispatch::new(),
        );
        assert_eq!(doc.value(phone), "");
    }

    #[test]
    fn blur_keeps_meaningful_values() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);
        type_str(&mut mask, &mut doc, "7912");
        mask.on_event(
            &PageEvent::new(phone, EventKind::Blur),
            &mut doc,
            &mut Dispatch::new(),
        );
        assert_eq!(doc.value(phone), "+7 (912");
    }

    #[test]
    fn focus_masks_a_programmatically_set_value() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);
        doc.set_value(phone, "89123456789");
        mask.on_event(
            &PageEvent::new(phone, EventKind::Focus),
            &mut doc,
            &mut Dispatch::new(),
        );
        assert_eq!(doc.value(phone), "+8 (912) 345 6789");
    }

    #[test]
    fn non_digit_characters_are_dropped_from_the_fill() {
        let (mut doc, phone) = phone_doc();
        let mut mask = PhoneMask::new(phone);
        doc.set_value(phone, "7 (91a2b) 3");
        mask.on_event(
            &PageEvent::new(phone, EventKind::Input),
            &mut doc,
            &mut Dispatch::new(),
        );
        assert_eq!(doc.value(phone), "+7 (912) 3");
    }

    #[test]
    fn fill_template_floors_the_cut_inside_the_prefix() {
        assert_eq!(fill_template(""), "+7 ");
        assert_eq!(fill_template("7"), "+7 ");
        assert_eq!(fill_template("71"), "+7 (1");
        assert_eq!(fill_template("71234"), "+7 (123) 4");
    }

    #[test]
    fn template_prefix_pattern_accepts_masked_values() {
        assert!(matches_template_prefix("+7 (1"));
        assert!(matches_template_prefix("+7 (123) 456 7890"));
        assert!(!matches_template_prefix("8912"));
        assert!(!matches_template_prefix("+7 [1"));
    }
}
