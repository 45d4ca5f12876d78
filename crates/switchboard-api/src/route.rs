//! Route documents.
//!
//! A [PersistedRoute] is one entry in the registry's active rule set.
//! Required fields identify the route and its target pool; everything
//! else is an optional policy block that is only present on the wire
//! when it is active. Consumers treat an absent block as "use the
//! proxy's built-in behavior".

use crate::shared::OrderedMap;
use crate::{Method, TargetAddr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A routing rule as the registry stores it.
///
/// Routes are uniquely identified by `path` within a rule set. The
/// registry exchanges rule sets only as whole lists, so a
/// `PersistedRoute` is never updated in place on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedRoute {
    /// The path pattern requests are matched against, e.g. `/api/v1/*`.
    pub path: String,

    /// HTTP methods this route applies to. Empty matches every method.
    #[serde(default)]
    pub methods: Vec<Method>,

    /// Evaluation priority. Lower values are matched first.
    #[serde(default)]
    pub priority: i32,

    /// The backend pool traffic is forwarded to. Never empty in a
    /// well-formed document.
    #[serde(default)]
    pub targets: Vec<TargetAddr>,

    /// Provenance metadata attached by the template deployment
    /// workflow. Carried through edits untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RouteSource>,

    /// How traffic is spread across `targets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<LbAlgorithm>,

    /// Per-target weights. Only meaningful with
    /// [LbAlgorithm::Weighted]; present (possibly empty) exactly when
    /// that algorithm is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<TargetAddr, u32>>,

    /// Advanced request match rules, applied on top of `path` and
    /// `methods`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<MatchRules>,

    /// Canary traffic split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canary: Option<CanarySplit>,

    /// Session affinity (sticky routing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<SessionAffinity>,

    /// Upstream timeout and retry policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resilience: Option<Resilience>,

    /// Circuit breaker thresholds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreaker>,

    /// Token-bucket rate limiting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,

    /// Request authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthPolicy>,

    /// Response caching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CachePolicy>,

    /// Request/response header rewriting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderRewrite>,

    /// Active health checking of the target pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
}

/// Where a route came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouteSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Manual,
    Template,
}

/// A load balancing algorithm for spreading traffic across a route's
/// target pool.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LbAlgorithm {
    /// Targets are picked in sequential order.
    #[default]
    RoundRobin,

    /// Targets are picked uniformly at random.
    Random,

    /// Targets are picked in proportion to their configured weight.
    Weighted,

    /// The target with the fewest in-flight requests is picked.
    LeastConn,

    /// A hash of the client IP picks the target, giving a crude form
    /// of stickiness.
    IpHash,
}

/// Request match rules attached to a route.
///
/// These are evaluated by the proxy after the path pattern matches.
/// This crate only carries them as data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MatchRules {
    pub conditions: Vec<MatchCondition>,

    #[serde(default)]
    pub match_logic: MatchLogic,
}

/// A single request predicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MatchCondition {
    /// What part of the request to inspect.
    #[serde(rename = "type")]
    pub kind: ConditionKind,

    /// The header or query parameter name, e.g. `X-User-Type`. Unused
    /// for host conditions.
    #[serde(default)]
    pub key: String,

    pub operator: ConditionOp,

    /// The comparison operand. Unused for the existence operators.
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Header,
    Query,
    Host,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    Equals,
    Contains,
    Regex,
    Exists,
    #[serde(rename = "not-exists")]
    NotExists,
}

/// How multiple conditions combine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchLogic {
    #[default]
    And,
    Or,
}

/// A canary traffic split: divert `weight` percent of matching traffic
/// to a secondary target pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CanarySplit {
    /// Percentage of traffic diverted, 0 to 100. A weight of 0 means
    /// no canary, and the block is omitted from the wire.
    #[serde(default)]
    pub weight: u32,

    #[serde(default)]
    pub targets: Vec<TargetAddr>,
}

/// Sticky routing of a client to a consistent backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionAffinity {
    #[serde(rename = "type")]
    pub kind: AffinityKind,

    /// The cookie used for [AffinityKind::Cookie] stickiness.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cookie_name: String,
}

/// How clients are pinned to a backend.
///
/// [AffinityKind::None] exists for the editor's benefit and never
/// appears on the wire: an inactive affinity block is omitted from the
/// document instead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AffinityKind {
    #[default]
    None,

    /// Pin by client IP address. Older registries wrote this as
    /// `client_ip`.
    #[serde(alias = "client_ip")]
    Ip,

    /// Pin by a proxy-issued cookie.
    Cookie,
}

/// Upstream timeout and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Resilience {
    #[serde(default = "Resilience::default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub max_retries: u32,

    /// HTTP status codes that count as retryable failures. Empty means
    /// only transport errors are retried.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retry_on: Vec<u16>,
}

impl Resilience {
    /// The proxy's built-in upstream timeout.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    const fn default_timeout_ms() -> u64 {
        Self::DEFAULT_TIMEOUT_MS
    }
}

impl Default for Resilience {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            max_retries: 0,
            retry_on: Vec::new(),
        }
    }
}

/// Circuit breaker thresholds for a route's target pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CircuitBreaker {
    /// Consecutive failures that trip the breaker.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,

    /// Consecutive successes that reset it.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,

    /// How long the breaker stays open before probing again.
    #[serde(default = "default_breaker_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_error_threshold() -> u32 {
    5
}

const fn default_success_threshold() -> u32 {
    2
}

const fn default_breaker_timeout_ms() -> u64 {
    30_000
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self {
            error_threshold: default_error_threshold(),
            success_threshold: default_success_threshold(),
            timeout_ms: default_breaker_timeout_ms(),
        }
    }
}

/// Token-bucket rate limiting applied per route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RateLimit {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    #[serde(default = "default_burst")]
    pub burst: u32,
}

const fn default_requests_per_second() -> f64 {
    100.0
}

const fn default_burst() -> u32 {
    150
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// Request authentication for a route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthPolicy {
    #[serde(rename = "type")]
    pub kind: AuthKind,

    /// Accepted credentials, keyed by credential id with a display
    /// label as the value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,
}

/// The authentication scheme for a route.
///
/// Like [AffinityKind::None], the [AuthKind::None] variant is
/// editor-only: an unauthenticated route simply has no `auth` block.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    #[default]
    None,
    ApiKey,
    Basic,
}

/// Response caching for a route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CachePolicy {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

const fn default_cache_ttl() -> u64 {
    60
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Header rewriting applied to requests and responses on a route.
///
/// When this block is present, all four tables are present too, even
/// when empty. The add tables keep their entries in insertion order;
/// see [OrderedMap] for the exact update semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeaderRewrite {
    #[serde(default)]
    pub add_request: OrderedMap,

    #[serde(default)]
    pub remove_request: Vec<String>,

    #[serde(default)]
    pub add_response: OrderedMap,

    #[serde(default)]
    pub remove_response: Vec<String>,
}

/// Active health checking of a route's target pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HealthCheck {
    /// The path probed on each target.
    #[serde(default = "default_health_path")]
    pub path: String,

    /// Seconds between probes.
    #[serde(default = "default_health_interval")]
    pub interval: u64,

    /// Probe timeout in seconds.
    #[serde(default = "default_health_timeout")]
    pub timeout: u64,

    /// Consecutive successes before an unhealthy target is readmitted.
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: u32,

    /// Consecutive failures before a target is ejected.
    #[serde(default = "default_unhealthy_threshold")]
    pub unhealthy_threshold: u32,
}

fn default_health_path() -> String {
    "/health".to_string()
}

const fn default_health_interval() -> u64 {
    10
}

const fn default_health_timeout() -> u64 {
    2
}

const fn default_healthy_threshold() -> u32 {
    2
}

const fn default_unhealthy_threshold() -> u32 {
    3
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            interval: default_health_interval(),
            timeout: default_health_timeout(),
            healthy_threshold: default_healthy_threshold(),
            unhealthy_threshold: default_unhealthy_threshold(),
        }
    }
}
