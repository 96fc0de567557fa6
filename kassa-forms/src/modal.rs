//! Modal open/close with scroll-lock compensation.
//!
//! Opening locks body scroll and pads body and overlay by the scrollbar
//! width so the layout does not shift. Closing is requested immediately but
//! applied by the page runtime after a fixed deferral; the apply step
//! re-checks visibility, so overlapping deferrals are harmless.

use kassa_dom::{Document, DomError, NodeId, Overflow};
use std::time::Duration;

/// How long a close request waits before it is applied.
pub const MODAL_CLOSE_DELAY: Duration = Duration::from_millis(200);

pub const MODAL_CLASS: &str = "modal";
pub const OVERLAY_CLASS: &str = "modal__overlay";
pub const CLOSE_BUTTON_CLASS: &str = "modal__close-button";
pub const VISIBLE_CLASS: &str = "-js-visible";

/// Default trigger/modal pair for the personal-data consent dialog.
pub const PERSONAL_DATA_TRIGGER_CLASS: &str = "-js-personalData-modal";
pub const PERSONAL_DATA_MODAL_CLASS: &str = "personalData-modal";

/// Outcome of a click as seen by the toggler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing modal-related under the click.
    Ignored,
    /// A modal was opened.
    Opened,
    /// A deferred close should be scheduled.
    CloseRequested,
}

pub struct ModalToggler {
    trigger_class: String,
    modal_class: String,
}

impl ModalToggler {
    pub fn new(trigger_class: &str, modal_class: &str) -> Self {
        Self {
            trigger_class: trigger_class.to_string(),
            modal_class: modal_class.to_string(),
        }
    }

    /// The personal-data consent dialog wiring used by the checkout page.
    pub fn personal_data() -> Self {
        Self::new(PERSONAL_DATA_TRIGGER_CLASS, PERSONAL_DATA_MODAL_CLASS)
    }

    /// Route a document-wide click. Open happens synchronously; close is
    /// only requested here and applied later via [`close_visible_modals`].
    pub fn on_click(&self, target: NodeId, doc: &mut Document) -> Result<ClickOutcome, DomError> {
        let mut outcome = ClickOutcome::Ignored;

        if doc.closest(target, &self.trigger_class).is_some() {
            self.open(doc)?;
            outcome = ClickOutcome::Opened;
        }

        if doc.closest(target, CLOSE_BUTTON_CLASS).is_some()
            || doc.has_class(target, OVERLAY_CLASS)
        {
            outcome = ClickOutcome::CloseRequested;
        }

        Ok(outcome)
    }

    fn open(&self, doc: &mut Document) -> Result<(), DomError> {
        let modal = doc
            .elements_by_class(&self.modal_class)
            .into_iter()
            .next()
            .ok_or_else(|| DomError::NotFound(format!(".{}", self.modal_class)))?;
        let overlay = doc
            .descendant_with_class(modal, OVERLAY_CLASS)
            .ok_or_else(|| DomError::NotFound(format!(".{OVERLAY_CLASS}")))?;

        let padding = doc.metrics().scrollbar_width();
        let body = doc.body();

        doc.add_class(modal, VISIBLE_CLASS);
        doc.set_overflow(body, Overflow::Hidden);
        doc.set_padding_right(body, padding);
        doc.set_padding_right(overlay, padding);
        Ok(())
    }
}

/// Apply a deferred close: every modal still in the visible state loses it,
/// and the scroll lock is undone. Already-closed modals are untouched, which
/// is what makes stacked deferrals idempotent.
pub fn close_visible_modals(doc: &mut Document) -> Result<(), DomError> {
    let body = doc.body();
    for modal in doc.elements_by_class(MODAL_CLASS) {
        if !doc.has_class(modal, VISIBLE_CLASS) {
            continue;
        }
        let overlay = doc
            .descendant_with_class(modal, OVERLAY_CLASS)
            .ok_or_else(|| DomError::NotFound(format!(".{OVERLAY_CLASS}")))?;

        doc.remove_class(modal, VISIBLE_CLASS);
        doc.set_overflow(body, Overflow::Visible);
        doc.set_padding_right(body, 0.0);
        doc.set_padding_right(overlay, 0.0);
    }
    Ok(())
}
