//! Storage key encoding for the ledger tables.
//!
//! Keys are namespaced by a short table prefix. Fields inside a composite
//! key are joined with an ASCII unit separator (0x1F) so that ids
//! containing `:` or `/` cannot collide across tuple boundaries: the
//! event key IS the idempotency constraint, so its encoding must be
//! injective.

use shared_types::{EventKey, Sku};

/// Field separator inside composite keys.
const SEP: u8 = 0x1F;

pub const PRODUCT_PREFIX: &[u8] = b"product:";
pub const STOCK_PREFIX: &[u8] = b"stock:";
pub const EVENT_PREFIX: &[u8] = b"event:";

pub fn product(sku: &Sku) -> Vec<u8> {
    let mut key = Vec::with_capacity(PRODUCT_PREFIX.len() + sku.as_str().len());
    key.extend_from_slice(PRODUCT_PREFIX);
    key.extend_from_slice(sku.as_str().as_bytes());
    key
}

pub fn stock(sku: &Sku) -> Vec<u8> {
    let mut key = Vec::with_capacity(STOCK_PREFIX.len() + sku.as_str().len());
    key.extend_from_slice(STOCK_PREFIX);
    key.extend_from_slice(sku.as_str().as_bytes());
    key
}

pub fn event(event_key: &EventKey) -> Vec<u8> {
    let mut key = Vec::with_capacity(
        EVENT_PREFIX.len()
            + event_key.site_id.as_str().len()
            + event_key.order_id.len()
            + event_key.line_item_id.len()
            + 16,
    );
    key.extend_from_slice(EVENT_PREFIX);
    key.extend_from_slice(event_key.site_id.as_str().as_bytes());
    key.push(SEP);
    key.extend_from_slice(event_key.order_id.as_bytes());
    key.push(SEP);
    key.extend_from_slice(event_key.line_item_id.as_bytes());
    key.push(SEP);
    key.extend_from_slice(event_key.kind.as_str().as_bytes());
    key
}
