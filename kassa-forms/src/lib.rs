//! Form behaviors for the checkout page.
//!
//! Three independent, separately testable handlers attach to a
//! [`kassa_dom::Document`]:
//!
//! - [`mask::PhoneMask`] rewrites `tel` inputs to the fixed phone template
//!   on every input/focus/blur/keydown.
//! - [`modal::ModalToggler`] opens and (after a fixed deferral) closes the
//!   personal-data modal with scrollbar-compensation padding.
//! - [`binder::SuggestBinder`] wires the city/address fields to the address
//!   suggestion service and applies selections to the form.
//!
//! None of them know about each other; the page runtime routes events to
//! whichever ones claim the target.
pub mod binder;
pub mod mask;
pub mod modal;
