//! Switchboard API configuration.
//!
//! These types describe a routing rule the way the proxy's registry
//! stores it: a path pattern, a target pool, and a set of optional
//! policy blocks (load balancing, canary splits, circuit breaking, and
//! so on). A block that is absent from a document means the proxy runs
//! with its built-in behavior for that concern.
//!
//! Use this crate directly if you're producing or consuming route
//! documents. Use the `switchboard-editor` crate if you want to edit
//! routes and sync them with a live registry.

pub mod route;

mod shared;
pub use shared::OrderedMap;

pub use route::PersistedRoute;

/// An HTTP method name in upper case, as defined by [RFC
/// 7231](https://datatracker.ietf.org/doc/html/rfc7231#section-4).
pub type Method = String;

/// The address of a backend server, e.g. `http://10.0.0.3:8080`.
pub type TargetAddr = String;
