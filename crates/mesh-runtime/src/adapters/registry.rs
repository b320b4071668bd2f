//! Site registry adapter.
//!
//! The engine consumes the registry through read-only directory ports; in
//! this runtime the registry is the configured site list.

use shared_types::{Site, SiteId};

/// Directory over the configured site list.
#[derive(Clone, Default)]
pub struct ConfigSiteDirectory {
    sites: Vec<Site>,
}

impl ConfigSiteDirectory {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    fn find(&self, site_id: &SiteId) -> Option<Site> {
        self.sites.iter().find(|s| &s.site_id == site_id).cloned()
    }

    fn actives(&self) -> Vec<Site> {
        self.sites.iter().filter(|s| s.active).cloned().collect()
    }
}

impl mesh_propagation::SiteDirectory for ConfigSiteDirectory {
    fn active_sites(&self) -> Vec<Site> {
        self.actives()
    }

    fn site(&self, site_id: &SiteId) -> Option<Site> {
        self.find(site_id)
    }
}

impl mesh_reconcile::SiteDirectory for ConfigSiteDirectory {
    fn active_sites(&self) -> Vec<Site> {
        self.actives()
    }

    fn site(&self, site_id: &SiteId) -> Option<Site> {
        self.find(site_id)
    }
}
