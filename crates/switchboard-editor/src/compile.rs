//! Draft compilation.
//!
//! Compiling turns a [RouteDraft] back into the [PersistedRoute] the
//! registry stores. Each policy block has its own emission rule, and
//! the set of rules is the wire contract: a block that fails its rule
//! is omitted from the document entirely, and hydration will fill it
//! back in from defaults next time the route is opened.
//!
//! The emission rules are not uniform. `resilience` is value-based: it
//! is only written when it differs from the proxy default. The blocks
//! behind the advanced panel (`circuit_breaker`, `rate_limit`,
//! `headers`, `health_check`) are visibility-based: once the panel has
//! been expanded they are written even when still at their defaults.
//! Whether that split is intentional ("touching advanced settings
//! persists the whole bundle") is an open product question; until it
//! is answered, this module reproduces the observed behavior exactly.

use switchboard_api::route::{AffinityKind, AuthKind, LbAlgorithm, Resilience};
use switchboard_api::PersistedRoute;

use crate::draft::RouteDraft;
use crate::error::{Error, Result};

impl RouteDraft {
    /// Compile this draft into a registry document.
    ///
    /// This is the validation gate: a draft with an empty path or no
    /// non-blank targets fails here, synchronously, before anything
    /// touches the network.
    pub fn compile(&self) -> Result<PersistedRoute> {
        if self.path.is_empty() {
            return Err(Error::EmptyPath);
        }

        // blank rows are dropped; surviving rows keep their text as
        // typed, untrimmed
        let targets: Vec<String> = self
            .targets
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        if targets.is_empty() {
            return Err(Error::EmptyTargets);
        }

        let route = PersistedRoute {
            path: self.path.clone(),
            methods: self.methods.clone(),
            priority: self.priority,
            targets,
            source: self.source.clone(),

            // the algorithm is always written, even at its default
            algorithm: Some(self.algorithm),

            // weights ride along with the weighted algorithm, even
            // when the map is empty; under any other algorithm they
            // are dropped no matter what the draft holds
            weights: (self.algorithm == LbAlgorithm::Weighted).then(|| self.weights.clone()),

            rules: (!self.rules.conditions.is_empty()).then(|| self.rules.clone()),

            // a zero-weight canary is no canary
            canary: (self.canary.weight > 0).then(|| self.canary.clone()),

            // canary/affinity/auth have no enabled flag; activation is
            // inferred from their own fields, and only here
            affinity: (self.affinity.kind != AffinityKind::None).then(|| self.affinity.clone()),

            resilience: (self.resilience.timeout_ms != Resilience::DEFAULT_TIMEOUT_MS
                || self.resilience.max_retries > 0)
                .then(|| self.resilience.clone()),

            circuit_breaker: self.advanced.then(|| self.circuit_breaker.clone()),

            rate_limit: self.advanced.then(|| self.rate_limit.clone()),

            auth: (self.auth.kind != AuthKind::None).then(|| self.auth.clone()),

            cache: (self.advanced && self.cache.enabled).then(|| self.cache.clone()),

            headers: self.advanced.then(|| self.headers.clone()),

            health_check: self.advanced.then(|| self.health_check.clone()),
        };

        tracing::trace!(
            path = %route.path,
            targets = route.targets.len(),
            "compiled route draft"
        );

        Ok(route)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use switchboard_api::route::{CanarySplit, MatchCondition, SessionAffinity};
    use switchboard_api::OrderedMap;

    use super::*;

    fn draft(path: &str, targets: &[&str]) -> RouteDraft {
        let mut draft = RouteDraft::new();
        draft.path = path.to_string();
        draft.targets = targets.iter().map(|t| t.to_string()).collect();
        draft
    }

    #[test]
    fn test_basic_route_compiles_lean() {
        // advanced panel collapsed, everything else at defaults: the
        // document carries only the identity fields and the algorithm
        let route = draft("/api", &["http://backend:8080"]).compile().unwrap();

        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            json!({
                "path": "/api",
                "methods": [],
                "priority": 0,
                "targets": ["http://backend:8080"],
                "algorithm": "round_robin",
            })
        );
    }

    #[test]
    fn test_blank_target_rows_are_dropped() {
        let route = draft("/api", &["t1", "   ", "t2", ""]).compile().unwrap();
        assert_eq!(route.targets, vec!["t1", "t2"]);
    }

    #[test]
    fn test_all_blank_targets_fail() {
        let err = draft("/api", &["", "  "]).compile().unwrap_err();
        assert!(matches!(err, Error::EmptyTargets));
        assert!(err.is_validation());
    }

    #[test]
    fn test_empty_path_fails() {
        let err = draft("", &["http://backend:8080"]).compile().unwrap_err();
        assert!(matches!(err, Error::EmptyPath));
    }

    #[test]
    fn test_weights_follow_weighted_algorithm() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.weights.insert("http://a:8080".to_string(), 3);

        // any other algorithm drops the weights, full map or not
        d.algorithm = LbAlgorithm::LeastConn;
        assert_eq!(d.compile().unwrap().weights, None);

        // the weighted algorithm emits them, even empty
        d.algorithm = LbAlgorithm::Weighted;
        assert!(d.compile().unwrap().weights.is_some());

        d.weights.clear();
        let route = d.compile().unwrap();
        assert_eq!(route.weights.as_ref().map(|w| w.len()), Some(0));
    }

    #[test]
    fn test_rules_emitted_only_with_conditions() {
        let mut d = draft("/api", &["http://a:8080"]);
        assert_eq!(d.compile().unwrap().rules, None);

        d.rules.conditions.push(MatchCondition {
            kind: switchboard_api::route::ConditionKind::Header,
            key: "X-User-Type".to_string(),
            operator: switchboard_api::route::ConditionOp::Equals,
            value: "beta".to_string(),
        });
        assert!(d.compile().unwrap().rules.is_some());
    }

    #[test]
    fn test_canary_threshold() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.canary = CanarySplit {
            weight: 0,
            targets: vec!["http://canary:8080".to_string()],
        };
        assert_eq!(d.compile().unwrap().canary, None);

        // a positive weight emits the block even with no canary pool
        d.canary = CanarySplit {
            weight: 10,
            targets: vec![],
        };
        assert!(d.compile().unwrap().canary.is_some());
    }

    #[test]
    fn test_affinity_and_auth_activate_by_kind() {
        let mut d = draft("/api", &["http://a:8080"]);
        assert_eq!(d.compile().unwrap().affinity, None);
        assert_eq!(d.compile().unwrap().auth, None);

        d.affinity = SessionAffinity {
            kind: AffinityKind::Cookie,
            cookie_name: "sb_affinity".to_string(),
        };
        d.auth.kind = AuthKind::ApiKey;

        let route = d.compile().unwrap();
        assert!(route.affinity.is_some());
        assert!(route.auth.is_some());
    }

    #[test]
    fn test_resilience_is_value_based() {
        let mut d = draft("/api", &["http://a:8080"]);
        assert_eq!(d.compile().unwrap().resilience, None);

        d.resilience.max_retries = 2;
        assert!(d.compile().unwrap().resilience.is_some());

        d.resilience.max_retries = 0;
        d.resilience.timeout_ms = 5_000;
        assert!(d.compile().unwrap().resilience.is_some());

        // expanding the panel has no effect on resilience
        d.resilience = Resilience::default();
        d.advanced = true;
        assert_eq!(d.compile().unwrap().resilience, None);
    }

    #[test]
    fn test_advanced_panel_emits_breaker_at_defaults() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.advanced = true;

        let route = d.compile().unwrap();
        assert_eq!(
            serde_json::to_value(route.circuit_breaker.unwrap()).unwrap(),
            json!({
                "error_threshold": 5,
                "success_threshold": 2,
                "timeout_ms": 30000,
            })
        );
        assert!(route.rate_limit.is_some());
        assert!(route.health_check.is_some());
    }

    #[test]
    fn test_collapsed_panel_suppresses_gated_blocks() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.cache.enabled = true;

        let route = d.compile().unwrap();
        assert_eq!(route.circuit_breaker, None);
        assert_eq!(route.rate_limit, None);
        assert_eq!(route.headers, None);
        assert_eq!(route.health_check, None);
        // cache needs the panel open as well as its own flag
        assert_eq!(route.cache, None);
    }

    #[test]
    fn test_cache_needs_panel_and_flag() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.advanced = true;
        assert_eq!(d.compile().unwrap().cache, None);

        d.cache.enabled = true;
        assert!(d.compile().unwrap().cache.is_some());
    }

    #[test]
    fn test_headers_emit_all_four_tables() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.advanced = true;
        d.headers.add_request = OrderedMap::from([("X-Custom-Req", "req-val")]);
        d.headers.add_response = OrderedMap::from([("X-Custom-Res", "res-val")]);

        let route = d.compile().unwrap();
        assert_eq!(
            serde_json::to_value(route.headers.unwrap()).unwrap(),
            json!({
                "add_request": {"X-Custom-Req": "req-val"},
                "remove_request": [],
                "add_response": {"X-Custom-Res": "res-val"},
                "remove_response": [],
            })
        );
    }

    #[test]
    fn test_source_passes_through() {
        let mut d = draft("/api", &["http://a:8080"]);
        d.source = serde_json::from_value(json!({
            "type": "template",
            "template_id": "tmpl-1",
        }))
        .ok();

        let route = d.compile().unwrap();
        assert_eq!(route.source, d.source);
    }

    #[test]
    fn test_settled_drafts_round_trip() {
        // a draft whose blocks are each either untouched or fully
        // specified hydrates back to itself after compiling
        let mut d = draft("/api", &["http://a:8080", "http://b:8080"]);
        d.methods = vec!["GET".to_string()];
        d.priority = 7;
        d.algorithm = LbAlgorithm::Weighted;
        d.weights.insert("http://a:8080".to_string(), 3);
        d.canary = CanarySplit {
            weight: 25,
            targets: vec!["http://canary:8080".to_string()],
        };
        d.resilience.max_retries = 2;
        d.advanced = true;
        d.cache.enabled = true;
        d.headers.add_request.insert("X-Custom-Req", "req-val");

        let compiled = d.compile().unwrap();
        assert_eq!(RouteDraft::hydrate(&compiled), d);
    }

    #[test]
    fn test_collapsed_default_draft_round_trips() {
        let d = draft("/api", &["http://a:8080"]);
        let compiled = d.compile().unwrap();
        assert_eq!(RouteDraft::hydrate(&compiled), d);
    }
}
