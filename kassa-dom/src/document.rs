use std::collections::HashMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("selector not found: {0}")]
    NotFound(String),
}

/// Arena index of a node. Stable for the life of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Overflow mode of an element's content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// Window and body widths as rendered; their difference is the scrollbar.
#[derive(Debug, Clone, Copy)]
pub struct PageMetrics {
    pub inner_width: f64,
    pub body_width: f64,
}

impl PageMetrics {
    /// Scrollbar width used for padding compensation; never negative.
    pub fn scrollbar_width(&self) -> f64 {
        (self.inner_width - self.body_width).max(0.0)
    }
}

/// Blueprint for [`Document::append_element`].
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub input_type: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_input_type(mut self, ty: &str) -> Self {
        self.input_type = Some(ty.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    classes: Vec<String>,
    pub input_type: Option<String>,
    value: String,
    caret: usize,
    overflow: Overflow,
    padding_right: f64,
}

impl Element {
    fn from_spec(spec: ElementSpec) -> Self {
        Self {
            tag: spec.tag,
            id: spec.id,
            classes: spec.classes,
            input_type: spec.input_type,
            value: String::new(),
            caret: 0,
            overflow: Overflow::default(),
            padding_right: 0.0,
        }
    }
}

struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
}

/// The page: a body element plus everything appended under it.
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    id_index: HashMap<String, NodeId>,
    metrics: PageMetrics,
}

impl Document {
    pub fn new(metrics: PageMetrics) -> Self {
        let body = Node {
            parent: None,
            children: Vec::new(),
            element: Element::from_spec(ElementSpec::new("body")),
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            id_index: HashMap::new(),
            metrics,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn metrics(&self) -> PageMetrics {
        self.metrics
    }

    pub fn append_element(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id_attr = spec.id.clone();
        let node = Node {
            parent: Some(parent),
            children: Vec::new(),
            element: Element::from_spec(spec),
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        if let Some(id_attr) = id_attr {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    /// Resolve `#id` or `.class` selectors to the first matching node.
    pub fn query(&self, selector: &str) -> Result<NodeId> {
        if let Some(id) = selector.strip_prefix('#') {
            return self.element_by_id(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self
                .elements_by_class(class)
                .into_iter()
                .next()
                .ok_or_else(|| DomError::NotFound(selector.to_string()));
        }
        Err(DomError::NotFound(selector.to_string()))
    }

    pub fn element_by_id(&self, id: &str) -> Result<NodeId> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| DomError::NotFound(format!("#{id}")))
    }

    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&n| self.has_class(n, class))
            .collect()
    }

    /// Elements matching `input[type=ty]`.
    pub fn inputs_of_type(&self, ty: &str) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|&n| {
                let el = &self.nodes[n.0].element;
                el.tag == "input" && el.input_type.as_deref() == Some(ty)
            })
            .collect()
    }

    /// Nearest ancestor (including `node` itself) carrying `class`.
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.has_class(n, class) {
                return Some(n);
            }
            cur = self.nodes[n.0].parent;
        }
        None
    }

    /// First descendant of `node` carrying `class`, depth-first.
    pub fn descendant_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.clone();
        while let Some(n) = stack.pop() {
            if self.has_class(n, class) {
                return Some(n);
            }
            stack.extend(self.nodes[n.0].children.iter().copied());
        }
        None
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0]
            .element
            .classes
            .iter()
            .any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.0].element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0].element.classes.retain(|c| c != class);
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].element.classes
    }

    pub fn value(&self, node: NodeId) -> &str {
        &self.nodes[node.0].element.value
    }

    /// Assigning a value moves the caret to the end, as a browser does.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        let el = &mut self.nodes[node.0].element;
        el.value = value.to_string();
        el.caret = el.value.chars().count();
    }

    pub fn caret(&self, node: NodeId) -> usize {
        self.nodes[node.0].element.caret
    }

    pub fn set_caret(&mut self, node: NodeId, caret: usize) {
        let el = &mut self.nodes[node.0].element;
        el.caret = caret.min(el.value.chars().count());
    }

    /// Insert a character at the caret (the default action of a keystroke).
    pub fn insert_at_caret(&mut self, node: NodeId, ch: char) {
        let el = &mut self.nodes[node.0].element;
        let byte_pos = el
            .value
            .char_indices()
            .nth(el.caret)
            .map(|(i, _)| i)
            .unwrap_or(el.value.len());
        el.value.insert(byte_pos, ch);
        el.caret += 1;
    }

    pub fn overflow(&self, node: NodeId) -> Overflow {
        self.nodes[node.0].element.overflow
    }

    pub fn set_overflow(&mut self, node: NodeId, overflow: Overflow) {
        self.nodes[node.0].element.overflow = overflow;
    }

    pub fn padding_right(&self, node: NodeId) -> f64 {
        self.nodes[node.0].element.padding_right
    }

    pub fn set_padding_right(&mut self, node: NodeId, px: f64) {
        self.nodes[node.0].element.padding_right = px;
    }

    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].element.id.as_deref()
    }

    /// All elements carrying an id attribute, for state snapshots.
    pub fn elements_with_id(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.id_index.iter().map(|(id, node)| (id.as_str(), *node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(PageMetrics {
            inner_width: 1280.0,
            body_width: 1263.0,
        })
    }

    #[test]
    fn id_lookup_and_selector_resolution() {
        let mut d = doc();
        let body = d.body();
        let city = d.append_element(body, ElementSpec::new("input").with_id("city"));
        assert_eq!(d.element_by_id("city").unwrap(), city);
        assert_eq!(d.query("#city").unwrap(), city);
        assert_eq!(
            d.query("#nope"),
            Err(DomError::NotFound("#nope".to_string()))
        );
    }

    #[test]
    fn closest_walks_ancestors_including_self() {
        let mut d = doc();
        let body = d.body();
        let modal = d.append_element(body, ElementSpec::new("div").with_class("modal"));
        let overlay =
            d.append_element(modal, ElementSpec::new("div").with_class("modal__overlay"));
        let button =
            d.append_element(overlay, ElementSpec::new("button").with_class("modal__close-button"));

        assert_eq!(d.closest(button, "modal"), Some(modal));
        assert_eq!(d.closest(button, "modal__close-button"), Some(button));
        assert_eq!(d.closest(modal, "modal__overlay"), None);
    }

    #[test]
    fn descendant_search_finds_nested_nodes() {
        let mut d = doc();
        let body = d.body();
        let modal = d.append_element(body, ElementSpec::new("div").with_class("modal"));
        let inner = d.append_element(modal, ElementSpec::new("div"));
        let overlay =
            d.append_element(inner, ElementSpec::new("div").with_class("modal__overlay"));
        assert_eq!(d.descendant_with_class(modal, "modal__overlay"), Some(overlay));
        assert_eq!(d.descendant_with_class(modal, "missing"), None);
    }

    #[test]
    fn set_value_moves_caret_to_end() {
        let mut d = doc();
        let body = d.body();
        let phone = d.append_element(
            body,
            ElementSpec::new("input").with_id("phone").with_input_type("tel"),
        );
        d.set_value(phone, "+7 (12");
        assert_eq!(d.caret(phone), 6);
        d.set_caret(phone, 2);
        d.insert_at_caret(phone, '9');
        assert_eq!(d.value(phone), "+79 (12");
        assert_eq!(d.caret(phone), 3);
    }

    #[test]
    fn class_mutation_is_idempotent() {
        let mut d = doc();
        let body = d.body();
        let field = d.append_element(body, ElementSpec::new("input").with_id("postcode"));
        d.add_class(field, "input-error");
        d.add_class(field, "input-error");
        assert_eq!(d.classes(field).len(), 1);
        d.remove_class(field, "input-error");
        assert!(!d.has_class(field, "input-error"));
    }

    #[test]
    fn scrollbar_width_never_negative() {
        let m = PageMetrics {
            inner_width: 1000.0,
            body_width: 1010.0,
        };
        assert_eq!(m.scrollbar_width(), 0.0);
    }

    #[test]
    fn inputs_of_type_filters_on_tag_and_type() {
        let mut d = doc();
        let body = d.body();
        d.append_element(body, ElementSpec::new("input").with_input_type("text"));
        let tel = d.append_element(body, ElementSpec::new("input").with_input_type("tel"));
        d.append_element(body, ElementSpec::new("div").with_input_type("tel"));
        assert_eq!(d.inputs_of_type("tel"), vec![tel]);
    }
}
