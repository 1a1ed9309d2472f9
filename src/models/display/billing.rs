//! Billing display models

use serde::Serialize;
use tabled::Tabled;

use super::common::{status_label, truncate_string, yes_no};
use crate::client::models::{CatalogItem, Coupon, MembershipPlan, Transaction};
use crate::output::formatters::{format_money, format_timestamp_local, or_dash};

/// Transaction display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TransactionDisplay {
    #[tabled(rename = "TXN ID")]
    pub id: String,

    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "MEMBER")]
    pub member: String,

    #[tabled(rename = "AMOUNT")]
    pub amount: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<Transaction> for TransactionDisplay {
    fn from(txn: Transaction) -> Self {
        Self {
            id: txn.id,
            date: format_timestamp_local(Some(txn.created_at)),
            member: txn
                .member_name
                .or(txn.member_id)
                .unwrap_or_else(|| "-".to_string()),
            amount: format_money(txn.amount_cents, &txn.currency),
            status: status_label(&txn.status),
            description: truncate_string(txn.description.as_deref().unwrap_or("-"), 40),
        }
    }
}

/// Membership plan display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MembershipDisplay {
    #[tabled(rename = "PLAN ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "ACTIVE")]
    pub active: String,

    #[tabled(rename = "MEMBERS")]
    pub members: usize,
}

impl From<MembershipPlan> for MembershipDisplay {
    fn from(plan: MembershipPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            price: format!(
                "{} / {}",
                format_money(plan.price_cents, &plan.currency),
                plan.interval
            ),
            active: yes_no(plan.active),
            members: plan.member_count,
        }
    }
}

/// Catalog item display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CatalogDisplay {
    #[tabled(rename = "ITEM ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "CATEGORY")]
    pub category: String,

    #[tabled(rename = "PRICE")]
    pub price: String,

    /// Units in stock, `-` when untracked
    #[tabled(rename = "STOCK")]
    pub stock: String,
}

impl From<CatalogItem> for CatalogDisplay {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category.unwrap_or_else(|| "-".to_string()),
            price: format_money(item.price_cents, &item.currency),
            stock: or_dash(item.stock),
        }
    }
}

/// Coupon display model.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CouponDisplay {
    #[tabled(rename = "CODE")]
    pub code: String,

    #[tabled(rename = "DISCOUNT")]
    pub discount: String,

    #[tabled(rename = "DURATION")]
    pub duration: String,

    #[tabled(rename = "REDEEMED")]
    pub redeemed: String,

    #[tabled(rename = "VALID")]
    pub valid: String,
}

impl From<Coupon> for CouponDisplay {
    fn from(coupon: Coupon) -> Self {
        let discount = match (coupon.percent_off, coupon.amount_off_cents) {
            (Some(pct), _) => format!("{}% off", pct),
            (None, Some(cents)) => format!(
                "{} off",
                format_money(cents, coupon.currency.as_deref().unwrap_or("usd"))
            ),
            (None, None) => "-".to_string(),
        };
        let redeemed = match coupon.max_redemptions {
            Some(max) => format!("{}/{}", coupon.times_redeemed, max),
            None => coupon.times_redeemed.to_string(),
        };

        Self {
            code: coupon.code,
            discount,
            duration: coupon.duration,
            redeemed,
            valid: yes_no(coupon.valid),
        }
    }
}
