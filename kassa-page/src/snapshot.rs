//! Serializable view of the form state, for the stdin driver and tests.

use kassa_dom::{Document, Overflow};
use kassa_forms::modal::{MODAL_CLASS, VISIBLE_CLASS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub id: String,
    pub value: String,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub fields: Vec<FieldSnapshot>,
    pub modal_open: bool,
    pub body_overflow: String,
    pub body_padding_right: f64,
}

impl PageSnapshot {
    pub fn capture(doc: &Document) -> Self {
        let mut fields: Vec<FieldSnapshot> = doc
            .elements_with_id()
            .map(|(id, node)| FieldSnapshot {
                id: id.to_string(),
                value: doc.value(node).to_string(),
                classes: doc.classes(node).to_vec(),
            })
            .collect();
        fields.sort_by(|a, b| a.id.cmp(&b.id));

        let body = doc.body();
        let modal_open = doc
            .elements_by_class(MODAL_CLASS)
            .into_iter()
            .any(|m| doc.has_class(m, VISIBLE_CLASS));

        Self {
            fields,
            modal_open,
            body_overflow: match doc.overflow(body) {
                Overflow::Visible => "visible".to_string(),
                Overflow::Hidden => "hidden".to_string(),
            },
            body_padding_right: doc.padding_right(body),
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|f| f.id == id)
    }
}
