//! Billing command implementations (read-only)

use crate::cache::EntityKind;
use crate::cli::args::{GlobalOptions, ListArgs};
use crate::cli::handlers::run_list_command;
use crate::client::{CatalogItem, Coupon, MembershipPlan, Transaction};
use crate::error::Result;
use crate::models::{CatalogDisplay, CouponDisplay, MembershipDisplay, TransactionDisplay};

pub async fn memberships(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<MembershipPlan, MembershipDisplay, _>(
        opts,
        list,
        EntityKind::Memberships,
        |ctx| ctx.caches.memberships(ctx.api.clone(), ctx.scope()),
    )
    .await
}

pub async fn transactions(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<Transaction, TransactionDisplay, _>(
        opts,
        list,
        EntityKind::Transactions,
        |ctx| ctx.caches.transactions(ctx.api.clone(), ctx.scope()),
    )
    .await
}

pub async fn catalog(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<CatalogItem, CatalogDisplay, _>(opts, list, EntityKind::Catalog, |ctx| {
        ctx.caches.catalog(ctx.api.clone(), ctx.scope())
    })
    .await
}

pub async fn coupons(opts: &GlobalOptions, list: &ListArgs) -> Result<()> {
    run_list_command::<Coupon, CouponDisplay, _>(opts, list, EntityKind::Coupons, |ctx| {
        ctx.caches.coupons(ctx.api.clone(), ctx.scope())
    })
    .await
}
