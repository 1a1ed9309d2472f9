//! Billing models: transactions, plans, catalog, coupons
//!
//! Amounts are integer minor units (cents) with an ISO 4217 currency code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "usd".to_string()
}

/// Payment or refund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,

    /// Negative for refunds
    pub amount_cents: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Payment status (succeeded, pending, failed, refunded)
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Recurring membership plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub id: String,

    pub name: String,

    pub price_cents: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Billing interval (month, year, week)
    pub interval: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub member_count: usize,
}

/// Product sold at the front desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,

    pub name: String,

    pub price_cents: i64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Units in stock; absent for untracked items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,

    #[serde(default)]
    pub active: bool,
}

/// Discount code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,

    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_off: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_off_cents: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// How long the discount applies (once, repeating, forever)
    pub duration: String,

    #[serde(default)]
    pub times_redeemed: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redemptions: Option<u32>,

    #[serde(default)]
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_currency_defaults_to_usd() {
        let json = r#"{
            "id": "txn_1",
            "amountCents": 4999,
            "status": "succeeded",
            "createdAt": "2024-05-01T09:30:00Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.currency, "usd");
        assert_eq!(txn.amount_cents, 4999);
    }

    #[test]
    fn test_coupon_percent_off() {
        let json = r#"{"id": "c1", "code": "SUMMER", "percentOff": 15.0, "duration": "once", "valid": true}"#;
        let coupon: Coupon = serde_json::from_str(json).unwrap();
        assert_eq!(coupon.percent_off, Some(15.0));
        assert_eq!(coupon.times_redeemed, 0);
        assert!(coupon.valid);
    }
}
