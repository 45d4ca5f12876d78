//! The Switchboard editing core.
//!
//! This crate turns a flat, mutable editing state into the canonical
//! route document the registry consumes, and back again:
//!
//! * [RouteDraft] is the fully-materialized editable form of one
//!   routing rule. Hydration ([RouteDraft::hydrate]) fills any block
//!   the stored document omits from its default, so the editing
//!   surface never has to reason about missing state.
//! * [RouteDraft::compile] is the inverse: it validates the draft and
//!   emits a [PersistedRoute](switchboard_api::PersistedRoute) with
//!   every inactive policy block stripped.
//! * [EditorSession] ties the two to a live [Registry], with
//!   optimistic full-list replacement and rollback on failure.

mod error;
pub use crate::error::{Error, Result, TransportError};

mod draft;
pub use crate::draft::RouteDraft;

mod compile;

mod registry;
pub use crate::registry::{HttpRegistry, Registry};

mod session;
pub use crate::session::EditorSession;
