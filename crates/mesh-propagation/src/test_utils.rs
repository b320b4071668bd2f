//! In-memory adapters for tests.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use shared_types::{Clock, Site, SiteId, Timestamp};

use crate::domain::entities::PropagationFailure;
use crate::domain::errors::PropagationError;
use crate::ports::outbound::{FailureStore, SiteDirectory};

/// A site entry with placeholder credentials.
pub fn make_site(site_id: &str) -> Site {
    Site {
        site_id: site_id.into(),
        base_url: format!("https://{site_id}.example.com"),
        api_key: "ck_test".to_string(),
        api_secret: "cs_test".to_string(),
        active: true,
    }
}

/// Directory over a fixed site list.
pub struct StaticSiteDirectory {
    sites: Vec<Site>,
}

impl StaticSiteDirectory {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }
}

impl SiteDirectory for StaticSiteDirectory {
    fn active_sites(&self) -> Vec<Site> {
        self.sites.iter().filter(|s| s.active).cloned().collect()
    }

    fn site(&self, site_id: &SiteId) -> Option<Site> {
        self.sites.iter().find(|s| &s.site_id == site_id).cloned()
    }
}

/// Dead-letter store held in a HashMap.
#[derive(Default)]
pub struct InMemoryFailureStore {
    rows: RwLock<HashMap<Uuid, PropagationFailure>>,
}

impl InMemoryFailureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailureStore for InMemoryFailureStore {
    fn append(&self, failure: &PropagationFailure) -> Result<(), PropagationError> {
        self.rows.write().insert(failure.id, failure.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<PropagationFailure>, PropagationError> {
        let mut rows: Vec<PropagationFailure> = self.rows.read().values().cloned().collect();
        rows.sort_by_key(|f| f.created_at);
        Ok(rows)
    }

    fn get(&self, id: &Uuid) -> Result<Option<PropagationFailure>, PropagationError> {
        Ok(self.rows.read().get(id).cloned())
    }

    fn remove(&self, id: &Uuid) -> Result<(), PropagationError> {
        self.rows.write().remove(id);
        Ok(())
    }
}

/// Clock pinned to a constant.
pub struct TestClock(pub Timestamp);

impl Clock for TestClock {
    fn now_ms(&self) -> Timestamp {
        self.0
    }
}
