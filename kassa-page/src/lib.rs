//! The page runtime: one actor owns the document and every attached
//! behavior, so all DOM access is serialized through its mailbox exactly
//! like a browser's event loop. Deferred modal closes and suggestion
//! fetches run as spawned tasks that message back in.
pub mod markup;
pub mod page;
pub mod snapshot;

pub use page::{PageActor, PageMsg};
pub use snapshot::{FieldSnapshot, PageSnapshot};
