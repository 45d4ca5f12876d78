//! The editing session.
//!
//! An [EditorSession] owns the fetched rule list for the lifetime of
//! one editing surface. Saves are optimistic: the local list is
//! updated first, the full replacement is submitted, and a transport
//! failure rolls the list back to its pre-save snapshot so the surface
//! keeps showing what the registry actually holds.

use switchboard_api::PersistedRoute;

use crate::draft::RouteDraft;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// A single-operator editing session over one registry.
///
/// One session, one surface, one draft at a time: nothing here is
/// shared or synchronized, and a session must not be used from two
/// tasks at once.
pub struct EditorSession<R> {
    registry: R,
    routes: Vec<PersistedRoute>,
    saving: bool,
}

impl<R: Registry> EditorSession<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            routes: Vec::new(),
            saving: false,
        }
    }

    /// Fetch the active rule set, replacing the local list.
    ///
    /// Also clears the in-flight guard: a commit whose future was
    /// dropped mid-request (surface torn down) leaves the guard set,
    /// and remounting the surface starts with a fresh fetch.
    pub async fn load(&mut self) -> Result<()> {
        self.routes = self.registry.fetch_all().await?;
        self.saving = false;
        Ok(())
    }

    /// The rule list as of the last fetch or successful save.
    pub fn routes(&self) -> &[PersistedRoute] {
        &self.routes
    }

    /// Open a draft for the route at `path`, or a fresh draft if no
    /// such route exists.
    pub fn open(&self, path: &str) -> RouteDraft {
        match self.routes.iter().find(|r| r.path == path) {
            Some(route) => RouteDraft::hydrate(route),
            None => RouteDraft::new(),
        }
    }

    /// Compile `draft` and write it to the registry.
    ///
    /// The draft is upserted into the list by `path`: an existing
    /// route is replaced in place, a new one is appended, and the
    /// whole list is resubmitted. Validation failures and an already
    /// in-flight save abort before any network traffic.
    pub async fn commit(&mut self, draft: &RouteDraft) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInFlight);
        }
        let route = draft.compile()?;

        let snapshot = self.routes.clone();
        match self.routes.iter_mut().find(|r| r.path == route.path) {
            Some(slot) => *slot = route,
            None => self.routes.push(route),
        }

        self.replace_or_roll_back(snapshot).await
    }

    /// Remove the route at `path` and resubmit the remaining list.
    ///
    /// Deleting a path that isn't present still resubmits; the
    /// registry treats the list as authoritative either way.
    pub async fn delete(&mut self, path: &str) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInFlight);
        }

        let snapshot = self.routes.clone();
        self.routes.retain(|r| r.path != path);

        self.replace_or_roll_back(snapshot).await
    }

    async fn replace_or_roll_back(&mut self, snapshot: Vec<PersistedRoute>) -> Result<()> {
        self.saving = true;
        let result = self.registry.replace_all(&self.routes).await;
        self.saving = false;

        if let Err(err) = result {
            tracing::debug!(%err, "registry write failed, rolling back");
            self.routes = snapshot;
            return Err(err.into());
        }
        Ok(())
    }
}
