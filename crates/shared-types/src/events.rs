//! # Inbound Event Types
//!
//! The normalized stock-affecting event delivered by the webhook-ingest
//! collaborator, and the idempotency key derived from it. Events arrive
//! already signature-verified; the engine does not re-check authenticity.

use serde::{Deserialize, Serialize};

use crate::entities::{SiteId, Sku};

/// Kind of a stock-affecting event.
///
/// The kind participates in the idempotency key: a refund for an order line
/// is a distinct logical event from the decrement that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An order was paid; quantities are subtracted from on-hand.
    Decrement,
    /// An order line was refunded; quantities are returned to on-hand.
    Refund,
    /// An order was cancelled; quantities are returned to on-hand.
    Cancel,
}

impl EventKind {
    /// Sign applied to the event quantity to obtain the ledger delta.
    pub fn sign(self) -> i64 {
        match self {
            EventKind::Decrement => -1,
            EventKind::Refund | EventKind::Cancel => 1,
        }
    }

    /// Stable token used in storage keys and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Decrement => "decrement",
            EventKind::Refund => "refund",
            EventKind::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The idempotency key: one logical stock-affecting event.
///
/// The 4-tuple (site, order, line item, kind) is unique in the ledger; a
/// second insert with the same key is a replay, not a new event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub site_id: SiteId,
    pub order_id: String,
    pub line_item_id: String,
    pub kind: EventKind,
}

impl EventKey {
    pub fn new(
        site_id: impl Into<SiteId>,
        order_id: impl Into<String>,
        line_item_id: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            order_id: order_id.into(),
            line_item_id: line_item_id.into(),
            kind,
        }
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.site_id, self.order_id, self.line_item_id, self.kind
        )
    }
}

/// A normalized stock-affecting event for a single order line.
///
/// `quantity` is the unsigned count from the storefront payload; the signed
/// ledger delta is `kind.sign() * quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub site_id: SiteId,
    pub order_id: String,
    pub line_item_id: String,
    pub sku: Sku,
    pub kind: EventKind,
    pub quantity: u32,
}

impl NormalizedEvent {
    /// The idempotency key for this event.
    pub fn key(&self) -> EventKey {
        EventKey {
            site_id: self.site_id.clone(),
            order_id: self.order_id.clone(),
            line_item_id: self.line_item_id.clone(),
            kind: self.kind,
        }
    }

    /// Signed delta applied to on-hand stock.
    pub fn delta(&self) -> i64 {
        self.kind.sign() * i64::from(self.quantity)
    }
}

/// One order line inside a bulk order payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_item_id: String,
    pub sku: Sku,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_signs() {
        assert_eq!(EventKind::Decrement.sign(), -1);
        assert_eq!(EventKind::Refund.sign(), 1);
        assert_eq!(EventKind::Cancel.sign(), 1);
    }

    #[test]
    fn test_event_delta_uses_sign() {
        let event = NormalizedEvent {
            site_id: "shop1".into(),
            order_id: "1001".to_string(),
            line_item_id: "1".to_string(),
            sku: "WIDGET-A".into(),
            kind: EventKind::Decrement,
            quantity: 2,
        };
        assert_eq!(event.delta(), -2);

        let refund = NormalizedEvent {
            kind: EventKind::Refund,
            ..event
        };
        assert_eq!(refund.delta(), 2);
    }

    #[test]
    fn test_key_distinguishes_kinds() {
        let decrement = EventKey::new("shop1", "1001", "1", EventKind::Decrement);
        let refund = EventKey::new("shop1", "1001", "1", EventKind::Refund);
        assert_ne!(decrement, refund);
    }

    #[test]
    fn test_kind_serde_token() {
        let json = serde_json::to_string(&EventKind::Decrement).unwrap();
        assert_eq!(json, "\"decrement\"");
    }
}
