//! # Ledger Service
//!
//! The application service for the stock ledger: an idempotent event
//! journal and the per-SKU transactional stock mutator, generic over the
//! storage and clock ports.
//!
//! ## Mutation Path
//!
//! 1. Enter the SKU's critical section (bounded wait).
//! 2. Check the journal for the event's 4-tuple key; a hit is a replay and
//!    commits nothing.
//! 3. Compute the candidate on-hand and clamp at zero when backorders are
//!    disallowed for the product.
//! 4. Commit the ledger row and the stock row in one atomic batch.
//!
//! The journal check and the stock write happen inside the same critical
//! section, and the rows land in the same batch, so a crash can never
//! leave a recorded event whose delta was not applied.
//!
//! ## Thread Safety
//!
//! The service is `Send + Sync` and is shared across async tasks via
//! `Arc`. Mutations on distinct SKUs proceed in parallel; the lock table
//! is the only cross-request synchronization.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_types::{Clock, EventKind, LineItem, NormalizedEvent, SiteId, Sku};

use crate::domain::entities::{LedgerEntry, Product, StockRecord};
use crate::domain::errors::LedgerError;
use crate::domain::locks::SkuLockTable;
use crate::domain::value_objects::{LedgerConfig, LineResult, MutationOutcome};
use crate::keys;
use crate::ports::inbound::{StockMutationApi, StockQueryApi};
use crate::ports::outbound::{BatchOperation, KeyValueStore};

/// The stock ledger service.
pub struct LedgerService<KV, C>
where
    KV: KeyValueStore,
    C: Clock,
{
    store: KV,
    clock: C,
    locks: SkuLockTable,
    config: LedgerConfig,
}

impl<KV, C> LedgerService<KV, C>
where
    KV: KeyValueStore,
    C: Clock,
{
    pub fn new(store: KV, clock: C, config: LedgerConfig) -> Self {
        Self {
            store,
            clock,
            locks: SkuLockTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.config.lock_timeout_ms)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, LedgerError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| LedgerError::Corrupt {
                    key: String::from_utf8_lossy(key).into_owned(),
                    message: e.to_string(),
                }),
        }
    }

    fn encode<T: Serialize>(value: &T) -> Vec<u8> {
        // Row types serialize infallibly; they contain no non-string map keys.
        serde_json::to_vec(value).expect("row serialization cannot fail")
    }

    /// The mutation body. Runs inside the SKU's critical section.
    fn mutate_locked(&self, event: &NormalizedEvent) -> Result<MutationOutcome, LedgerError> {
        let event_key = keys::event(&event.key());

        if self.store.exists(&event_key)? {
            let current = self
                .get_json::<StockRecord>(&keys::stock(&event.sku))?
                .map(|s| s.on_hand)
                .unwrap_or(0);
            debug!(
                key = %event.key(),
                sku = %event.sku,
                "duplicate event replayed, no-op"
            );
            return Ok(MutationOutcome {
                applied: false,
                new_on_hand: current,
                ledger_id: None,
            });
        }

        let now = self.clock.now_ms();
        let delta = event.delta();

        let (product, product_created) = match self.get_json::<Product>(&keys::product(&event.sku))?
        {
            Some(p) => (p, false),
            None => (
                Product::bare(event.sku.clone(), self.config.default_backorders, now),
                true,
            ),
        };

        let mut stock = self
            .get_json::<StockRecord>(&keys::stock(&event.sku))?
            .unwrap_or_else(|| StockRecord::empty(event.sku.clone(), now));

        let mut candidate = stock.on_hand + delta;
        if candidate < 0 && !product.backorders {
            warn!(
                sku = %event.sku,
                from = stock.on_hand,
                to = candidate,
                "stock floor hit, clamping to 0"
            );
            candidate = 0;
        }

        stock.on_hand = candidate;
        stock.updated_at = now;

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            site_id: event.site_id.clone(),
            order_id: event.order_id.clone(),
            line_item_id: event.line_item_id.clone(),
            sku: event.sku.clone(),
            delta,
            kind: event.kind,
            created_at: now,
        };

        let mut batch = vec![
            BatchOperation::put(event_key, Self::encode(&entry)),
            BatchOperation::put(keys::stock(&event.sku), Self::encode(&stock)),
        ];
        if product_created {
            batch.push(BatchOperation::put(
                keys::product(&event.sku),
                Self::encode(&product),
            ));
        }
        self.store.atomic_batch_write(batch)?;

        info!(
            sku = %event.sku,
            delta,
            new_on_hand = candidate,
            site = %event.site_id,
            order = %event.order_id,
            "stock updated"
        );

        Ok(MutationOutcome {
            applied: true,
            new_on_hand: candidate,
            ledger_id: Some(entry.id),
        })
    }
}

impl<KV, C> StockMutationApi for LedgerService<KV, C>
where
    KV: KeyValueStore,
    C: Clock,
{
    fn apply_event(&self, event: &NormalizedEvent) -> Result<MutationOutcome, LedgerError> {
        let timeout = self.lock_timeout();
        self.locks
            .with_lock(&event.sku, timeout, || self.mutate_locked(event))
            .ok_or_else(|| LedgerError::LockTimeout {
                sku: event.sku.clone(),
                waited_ms: self.config.lock_timeout_ms,
            })?
    }

    fn apply_order(
        &self,
        site_id: &SiteId,
        order_id: &str,
        lines: &[LineItem],
        kind: EventKind,
    ) -> Result<Vec<LineResult>, LedgerError> {
        let mut results = Vec::with_capacity(lines.len());
        for line in lines {
            let event = NormalizedEvent {
                site_id: site_id.clone(),
                order_id: order_id.to_string(),
                line_item_id: line.line_item_id.clone(),
                sku: line.sku.clone(),
                kind,
                quantity: line.quantity,
            };
            let outcome = self.apply_event(&event)?;
            results.push(LineResult {
                sku: line.sku.clone(),
                applied: outcome.applied,
                new_on_hand: outcome.new_on_hand,
            });
        }
        Ok(results)
    }

    fn upsert_product(&self, sku: &Sku, name: &str) -> Result<(), LedgerError> {
        let timeout = self.lock_timeout();
        self.locks
            .with_lock(sku, timeout, || {
                let now = self.clock.now_ms();
                let product = match self.get_json::<Product>(&keys::product(sku))? {
                    Some(mut existing) => {
                        existing.name = name.to_string();
                        existing.updated_at = now;
                        existing
                    }
                    None => {
                        let mut p = Product::bare(sku.clone(), self.config.default_backorders, now);
                        p.name = name.to_string();
                        p
                    }
                };

                let mut batch = vec![BatchOperation::put(
                    keys::product(sku),
                    Self::encode(&product),
                )];
                if !self.store.exists(&keys::stock(sku))? {
                    batch.push(BatchOperation::put(
                        keys::stock(sku),
                        Self::encode(&StockRecord::empty(sku.clone(), now)),
                    ));
                }
                self.store.atomic_batch_write(batch)?;
                Ok(())
            })
            .ok_or_else(|| LedgerError::LockTimeout {
                sku: sku.clone(),
                waited_ms: self.config.lock_timeout_ms,
            })?
    }
}

impl<KV, C> StockQueryApi for LedgerService<KV, C>
where
    KV: KeyValueStore,
    C: Clock,
{
    fn on_hand(&self, sku: &Sku) -> Result<Option<i64>, LedgerError> {
        Ok(self
            .get_json::<StockRecord>(&keys::stock(sku))?
            .map(|s| s.on_hand))
    }

    fn stock(&self, sku: &Sku) -> Result<Option<StockRecord>, LedgerError> {
        self.get_json(&keys::stock(sku))
    }

    fn all_stock(&self) -> Result<Vec<StockRecord>, LedgerError> {
        let rows = self.store.prefix_scan(keys::STOCK_PREFIX)?;
        let mut records = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            let record: StockRecord =
                serde_json::from_slice(&value).map_err(|e| LedgerError::Corrupt {
                    key: String::from_utf8_lossy(&key).into_owned(),
                    message: e.to_string(),
                })?;
            records.push(record);
        }
        Ok(records)
    }

    fn product(&self, sku: &Sku) -> Result<Option<Product>, LedgerError> {
        self.get_json(&keys::product(sku))
    }

    fn contains_event(&self, key: &shared_types::EventKey) -> Result<bool, LedgerError> {
        Ok(self.store.exists(&keys::event(key))?)
    }

    fn entries_for_sku(&self, sku: &Sku) -> Result<Vec<LedgerEntry>, LedgerError> {
        let rows = self.store.prefix_scan(keys::EVENT_PREFIX)?;
        let mut entries = Vec::new();
        for (key, value) in rows {
            let entry: LedgerEntry =
                serde_json::from_slice(&value).map_err(|e| LedgerError::Corrupt {
                    key: String::from_utf8_lossy(&key).into_owned(),
                    message: e.to_string(),
                })?;
            if &entry.sku == sku {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
