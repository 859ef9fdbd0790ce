//! Sale lifecycle models

use serde::{Deserialize, Serialize};

/// Lifecycle state of a sale.
///
/// `Completed` is the only state a sale is created in; `Cancelled` and
/// `Refunded` are terminal. No transition leads back to `Completed` through
/// the guarded operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            "refunded" => Some(SaleStatus::Refunded),
            _ => None,
        }
    }

    /// Whether the guarded transitions (cancel, refund) may leave this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SaleStatus::Completed)
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receipt photo placeholder returned in sale payloads.
///
/// The binary payload itself is never inlined in JSON responses; only the
/// content type and an existence flag are exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptInfo {
    pub content_type: String,
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            SaleStatus::Completed,
            SaleStatus::Cancelled,
            SaleStatus::Refunded,
        ] {
            assert_eq!(SaleStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(SaleStatus::parse("pending"), None);
        assert_eq!(SaleStatus::parse("Completed"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SaleStatus::Completed.is_terminal());
        assert!(SaleStatus::Cancelled.is_terminal());
        assert!(SaleStatus::Refunded.is_terminal());
    }
}
