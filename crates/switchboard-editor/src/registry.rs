//! The route registry client.
//!
//! The registry is the admin API of the proxy itself. It exposes
//! exactly two operations on the rule set: fetch the whole list, and
//! replace the whole list. There is no patch or merge; every save,
//! edit, or delete recomputes the full list client-side and resubmits
//! it wholesale.

use serde::Deserialize;
use switchboard_api::PersistedRoute;

use crate::error::TransportError;

/// The registry's full-list fetch/replace surface.
///
/// Because [replace_all](Registry::replace_all) swaps the entire rule
/// set, two sessions editing different routes can race: whichever
/// writes second resubmits a list snapshotted before the first write
/// landed, silently undoing it. The registry offers no version token
/// or compare-and-swap to detect this; callers accept the lost-update
/// risk.
#[allow(async_fn_in_trait)]
pub trait Registry {
    /// Fetch the currently active rule set.
    async fn fetch_all(&self) -> Result<Vec<PersistedRoute>, TransportError>;

    /// Atomically replace the entire rule set.
    async fn replace_all(&self, routes: &[PersistedRoute]) -> Result<(), TransportError>;
}

/// A [Registry] backed by the proxy's admin HTTP API.
///
/// Requests carry a bearer token. No client-side timeout is applied
/// beyond what the transport itself enforces.
pub struct HttpRegistry {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRegistry {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn config_url(&self) -> String {
        format!(
            "{base}/api/v1/config",
            base = self.base_url.trim_end_matches('/')
        )
    }
}

/// The config endpoint returns the active rule set alongside other
/// runtime state (static config, listener info) that this client
/// doesn't care about.
#[derive(Deserialize)]
struct ConfigResponse {
    #[serde(default)]
    active_routes: Vec<PersistedRoute>,
}

impl Registry for HttpRegistry {
    async fn fetch_all(&self) -> Result<Vec<PersistedRoute>, TransportError> {
        let response = self
            .client
            .get(self.config_url())
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = check_status(response)?;
        let body: ConfigResponse = response.json().await?;

        tracing::debug!(count = body.active_routes.len(), "fetched active routes");
        Ok(body.active_routes)
    }

    async fn replace_all(&self, routes: &[PersistedRoute]) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.config_url())
            .bearer_auth(&self.token)
            .json(&routes)
            .send()
            .await?;
        check_status(response)?;

        tracing::debug!(count = routes.len(), "replaced active routes");
        Ok(())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_url_normalizes_trailing_slash() {
        let registry = HttpRegistry::new("http://gateway:9090/", "token");
        assert_eq!(registry.config_url(), "http://gateway:9090/api/v1/config");
    }

    #[test]
    fn test_config_response_tolerates_extra_fields() {
        let body: ConfigResponse = serde_json::from_value(serde_json::json!({
            "static_config": {"proxy_addr": ":8080"},
            "active_routes": [{"path": "/api", "targets": ["http://a:8080"]}],
        }))
        .unwrap();
        assert_eq!(body.active_routes.len(), 1);
    }
}
