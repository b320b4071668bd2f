//! # Reconciliation Service
//!
//! Orchestrates refresh-then-resync for one site or for all active sites.
//! Resync pushes route through the propagation dispatcher, so the normal
//! retry, backoff, and dead-letter policy applies to them unchanged.

use async_trait::async_trait;
use tracing::{info, warn};

use shared_types::SiteId;

use crate::domain::entities::{ReconcileReport, RefreshOutcome};
use crate::domain::errors::ReconcileError;
use crate::ports::inbound::ReconcileApi;
use crate::ports::outbound::{MappingIndex, MappingRefresher, SiteDirectory, StockResync};

/// The reconciliation driver.
pub struct ReconcileService<R, I, P, D>
where
    R: MappingRefresher,
    I: MappingIndex,
    P: StockResync,
    D: SiteDirectory,
{
    refresher: R,
    index: I,
    resync: P,
    directory: D,
}

impl<R, I, P, D> ReconcileService<R, I, P, D>
where
    R: MappingRefresher,
    I: MappingIndex,
    P: StockResync,
    D: SiteDirectory,
{
    pub fn new(refresher: R, index: I, resync: P, directory: D) -> Self {
        Self {
            refresher,
            index,
            resync,
            directory,
        }
    }

    async fn reconcile_site(
        &self,
        site_id: &SiteId,
        push_stock: bool,
    ) -> Result<ReconcileReport, ReconcileError> {
        let site = self
            .directory
            .site(site_id)
            .ok_or_else(|| ReconcileError::UnknownSite(site_id.clone()))?;

        let RefreshOutcome {
            mapped,
            conflicts,
            errors,
        } = self.refresher.refresh(&site).await?;

        let mut report = ReconcileReport {
            site_id: site_id.clone(),
            mapped,
            conflicts,
            refresh_errors: errors,
            pushed: 0,
            push_errors: 0,
        };

        if push_stock {
            for sku in self.index.mapped_skus(site_id)? {
                match self.resync.push_current(site_id, &sku) {
                    Ok(()) => report.pushed += 1,
                    Err(e) => {
                        warn!(site = %site_id, sku = %sku, error = %e, "resync push not enqueued");
                        report.push_errors += 1;
                    }
                }
            }
        }

        info!(
            site = %site_id,
            mapped = report.mapped,
            pushed = report.pushed,
            push_errors = report.push_errors,
            "reconciliation complete"
        );
        Ok(report)
    }
}

#[async_trait]
impl<R, I, P, D> ReconcileApi for ReconcileService<R, I, P, D>
where
    R: MappingRefresher,
    I: MappingIndex,
    P: StockResync,
    D: SiteDirectory,
{
    async fn reconcile(
        &self,
        site_id: &SiteId,
        push_stock: bool,
    ) -> Result<ReconcileReport, ReconcileError> {
        self.reconcile_site(site_id, push_stock).await
    }

    async fn reconcile_all(&self, push_stock: bool) -> Vec<ReconcileReport> {
        let mut reports = Vec::new();
        for site in self.directory.active_sites() {
            match self.reconcile_site(&site.site_id, push_stock).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(site = %site.site_id, error = %e, "site reconciliation failed");
                    let mut report = ReconcileReport::empty(site.site_id.clone());
                    report.refresh_errors.push(e.to_string());
                    reports.push(report);
                }
            }
        }
        reports
    }
}
