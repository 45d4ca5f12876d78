//! The editable form of a route.
//!
//! A [RouteDraft] is what the editing surface mutates field by field.
//! Unlike a [PersistedRoute], every policy block is always present: a
//! block the wire document omits is materialized at its default value
//! during hydration, so the draft only ever tracks current values, not
//! whether a block came from the document or from a default. The two
//! states are deliberately indistinguishable once a draft exists.

use std::collections::BTreeMap;

use switchboard_api::route::{
    AuthPolicy, CachePolicy, CanarySplit, CircuitBreaker, HeaderRewrite, HealthCheck, LbAlgorithm,
    MatchRules, RateLimit, Resilience, RouteSource, SessionAffinity,
};
use switchboard_api::{Method, PersistedRoute, TargetAddr};

/// One routing rule, fully materialized for editing.
///
/// A draft is created either empty ([RouteDraft::new]) or from an
/// existing document ([RouteDraft::hydrate]). It is owned by a single
/// editing session for its whole lifetime and ends either by being
/// discarded or by being compiled and committed.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDraft {
    pub path: String,
    pub methods: Vec<Method>,
    pub priority: i32,

    /// Target rows as the surface shows them. May contain blank rows;
    /// those are discarded at compile time, and at least one row is
    /// always kept so there is something to type into.
    pub targets: Vec<TargetAddr>,

    pub algorithm: LbAlgorithm,
    pub weights: BTreeMap<TargetAddr, u32>,
    pub rules: MatchRules,
    pub canary: CanarySplit,
    pub affinity: SessionAffinity,
    pub resilience: Resilience,
    pub circuit_breaker: CircuitBreaker,
    pub rate_limit: RateLimit,
    pub auth: AuthPolicy,
    pub cache: CachePolicy,
    pub headers: HeaderRewrite,
    pub health_check: HealthCheck,

    /// Provenance carried through from the document, if any. The
    /// editor never modifies it.
    pub source: Option<RouteSource>,

    /// Whether the advanced settings panel has been expanded. Editor
    /// state only - it never appears on the wire, but it drives the
    /// emission of the panel-gated policy blocks at compile time.
    pub advanced: bool,
}

impl RouteDraft {
    /// A draft for a brand new route: every block at its default, one
    /// empty target row, advanced panel collapsed.
    pub fn new() -> Self {
        Self {
            path: String::new(),
            methods: Vec::new(),
            priority: 0,
            targets: vec![String::new()],
            algorithm: LbAlgorithm::default(),
            weights: BTreeMap::new(),
            rules: MatchRules::default(),
            canary: CanarySplit::default(),
            affinity: SessionAffinity::default(),
            resilience: Resilience::default(),
            circuit_breaker: CircuitBreaker::default(),
            rate_limit: RateLimit::default(),
            auth: AuthPolicy::default(),
            cache: CachePolicy::default(),
            headers: HeaderRewrite::default(),
            health_check: HealthCheck::default(),
            source: None,
            advanced: false,
        }
    }

    /// Build a draft from an existing document.
    ///
    /// Fields present in the document are copied verbatim; absent
    /// blocks are filled from their defaults. An empty target list
    /// becomes a single blank row.
    ///
    /// The wire has no "advanced panel" bit, so it is inferred: the
    /// panel is considered expanded iff any panel-gated block is
    /// present. This keeps compile-then-hydrate a no-op for settled
    /// drafts.
    pub fn hydrate(route: &PersistedRoute) -> Self {
        let targets = if route.targets.is_empty() {
            vec![String::new()]
        } else {
            route.targets.clone()
        };

        let advanced = route.circuit_breaker.is_some()
            || route.rate_limit.is_some()
            || route.cache.is_some()
            || route.headers.is_some()
            || route.health_check.is_some();

        Self {
            path: route.path.clone(),
            methods: route.methods.clone(),
            priority: route.priority,
            targets,
            algorithm: route.algorithm.unwrap_or_default(),
            weights: route.weights.clone().unwrap_or_default(),
            rules: route.rules.clone().unwrap_or_default(),
            canary: route.canary.clone().unwrap_or_default(),
            affinity: route.affinity.clone().unwrap_or_default(),
            resilience: route.resilience.clone().unwrap_or_default(),
            circuit_breaker: route.circuit_breaker.clone().unwrap_or_default(),
            rate_limit: route.rate_limit.clone().unwrap_or_default(),
            auth: route.auth.clone().unwrap_or_default(),
            cache: route.cache.clone().unwrap_or_default(),
            headers: route.headers.clone().unwrap_or_default(),
            health_check: route.health_check.clone().unwrap_or_default(),
            source: route.source.clone(),
            advanced,
        }
    }

    /// Append a blank target row.
    pub fn add_target(&mut self) {
        self.targets.push(String::new());
    }

    /// Replace the text of a target row. Out-of-range rows are
    /// ignored.
    pub fn set_target(&mut self, index: usize, value: impl Into<TargetAddr>) {
        if let Some(slot) = self.targets.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Remove a target row. The last remaining row cannot be removed,
    /// matching the surface, which always shows at least one input.
    pub fn remove_target(&mut self, index: usize) {
        if self.targets.len() > 1 && index < self.targets.len() {
            self.targets.remove(index);
        }
    }

    /// Toggle an HTTP method on or off.
    pub fn toggle_method(&mut self, method: &str) {
        match self.methods.iter().position(|m| m == method) {
            Some(idx) => {
                self.methods.remove(idx);
            }
            None => self.methods.push(method.to_string()),
        }
    }

    /// Expand or collapse the advanced settings panel.
    pub fn toggle_advanced(&mut self) {
        self.advanced = !self.advanced;
    }
}

impl Default for RouteDraft {
    fn default() -> Self {
        Self::new()
    }
}
