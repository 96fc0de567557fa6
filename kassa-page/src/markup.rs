//! The standard checkout page structure, built programmatically.
//!
//! Ids and classes here are the de facto contract with the behaviors: the
//! binder looks for `#city`/`#address`/`#postcode`, the mask for
//! `input[type="tel"]`, the modal toggler for its trigger and modal classes.

use kassa_dom::{Document, ElementSpec, PageMetrics};
use kassa_forms::binder::{ADDRESS_FIELD_ID, CITY_FIELD_ID, ERROR_CLASS, POSTCODE_FIELD_ID};
use kassa_forms::modal::{
    CLOSE_BUTTON_CLASS, MODAL_CLASS, OVERLAY_CLASS, PERSONAL_DATA_MODAL_CLASS,
    PERSONAL_DATA_TRIGGER_CLASS,
};

pub fn standard_checkout_document(metrics: PageMetrics) -> Document {
    let mut doc = Document::new(metrics);
    let body = doc.body();

    let form = doc.append_element(body, ElementSpec::new("form").with_id("order"));
    doc.append_element(form, ElementSpec::new("input").with_id(CITY_FIELD_ID));
    doc.append_element(form, ElementSpec::new("input").with_id(ADDRESS_FIELD_ID));
    // Postcode starts in the error state until a suggestion fills it.
    doc.append_element(
        form,
        ElementSpec::new("input")
            .with_id(POSTCODE_FIELD_ID)
            .with_class(ERROR_CLASS),
    );
    doc.append_element(
        form,
        ElementSpec::new("input")
            .with_id("phone")
            .with_input_type("tel"),
    );

    doc.append_element(
        form,
        ElementSpec::new("a")
            .with_id("personal-data-link")
            .with_class(PERSONAL_DATA_TRIGGER_CLASS),
    );

    let modal = doc.append_element(
        body,
        ElementSpec::new("div")
            .with_class(MODAL_CLASS)
            .with_class(PERSONAL_DATA_MODAL_CLASS),
    );
    let overlay = doc.append_element(modal, ElementSpec::new("div").with_class(OVERLAY_CLASS));
    doc.append_element(
        overlay,
        ElementSpec::new("button").with_class(CLOSE_BUTTON_CLASS),
    );

    doc
}
