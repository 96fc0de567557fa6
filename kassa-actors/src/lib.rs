//! Minimal mailbox-actor toolkit for the Kassa workspace.
//!
//! A page runtime is one actor owning the document; feeders and deferred
//! timers talk to it exclusively through its [`actor::Addr`], which is what
//! serializes all document access onto a single task.
pub mod actor;
pub mod builder;
pub mod registry;
pub mod system;
