//! Item event delivery infrastructure.
//!
//! Hosts hand item lifecycle events to the listeners registered with them.
//! This crate provides that seam for the teardown listener:
//!
//! - [`ListenerRegistry`] holds registered [`teardown::ItemListener`]s and
//!   delivers each event to every one of them. A listener that panics is
//!   logged and skipped; the remaining listeners still receive the event and
//!   the caller never sees the panic.
//!
//! - [`JsonLinesEventSource`] reads [`teardown::ItemEvent`]s encoded one per
//!   line as JSON, the format the CLI's `watch` mode consumes from stdin.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport and decoding live here. The [`teardown`]
//! crate sees only [`teardown::ItemListener`] and [`teardown::ItemEvent`].

pub mod registry;
pub mod source;

pub use registry::{DeliveryReport, ListenerRegistry};
pub use source::{JsonLinesEventSource, ListenerError};
