//! Per-entity cache wiring
//!
//! One slot per entity type, shared by every handle mounted for it.

use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

use super::fetcher::fetcher_fn;
use super::handle::EntityHandle;
use super::slot::{EntitySlot, SlotSnapshot};
use super::{EntityKind, ScopeId};
use crate::client::{
    CatalogItem, Coupon, DashboardStats, DojoApi, Event, GymClass, Member, MembershipPlan, Tag,
    Transaction,
};
use crate::config::CacheSettings;
use crate::error::Result;

/// Writes that leave cached collections out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    MemberCreated,
    ClassCreated,
}

impl Mutation {
    /// Entity types whose cached values no longer reflect the platform.
    pub fn dirties(self) -> &'static [EntityKind] {
        match self {
            Mutation::MemberCreated => &[EntityKind::Members, EntityKind::DashboardStats],
            Mutation::ClassCreated => &[
                EntityKind::Classes,
                EntityKind::Events,
                EntityKind::DashboardStats,
            ],
        }
    }
}

/// The entity cache for one process.
pub struct EntityCaches {
    members: Arc<EntitySlot<Vec<Member>>>,
    dashboard_stats: Arc<EntitySlot<DashboardStats>>,
    transactions: Arc<EntitySlot<Vec<Transaction>>>,
    catalog: Arc<EntitySlot<Vec<CatalogItem>>>,
    classes: Arc<EntitySlot<Vec<GymClass>>>,
    memberships: Arc<EntitySlot<Vec<MembershipPlan>>>,
    coupons: Arc<EntitySlot<Vec<Coupon>>>,
    tags: Arc<EntitySlot<Vec<Tag>>>,
    events: Arc<EntitySlot<Vec<Event>>>,
}

impl Default for EntityCaches {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}

impl EntityCaches {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            members: slot(settings, EntityKind::Members),
            dashboard_stats: slot(settings, EntityKind::DashboardStats),
            transactions: slot(settings, EntityKind::Transactions),
            catalog: slot(settings, EntityKind::Catalog),
            classes: slot(settings, EntityKind::Classes),
            memberships: slot(settings, EntityKind::Memberships),
            coupons: slot(settings, EntityKind::Coupons),
            tags: slot(settings, EntityKind::Tags),
            events: slot(settings, EntityKind::Events),
        }
    }

    pub fn members(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<Member>> {
        mount(&self.members, api, scope, |api, org| async move {
            api.list_members(org.as_str()).await
        })
    }

    pub fn dashboard_stats(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<DashboardStats> {
        mount(&self.dashboard_stats, api, scope, |api, org| async move {
            api.dashboard_stats(org.as_str()).await
        })
    }

    pub fn transactions(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<Transaction>> {
        mount(&self.transactions, api, scope, |api, org| async move {
            api.list_transactions(org.as_str()).await
        })
    }

    pub fn catalog(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<CatalogItem>> {
        mount(&self.catalog, api, scope, |api, org| async move {
            api.list_catalog(org.as_str()).await
        })
    }

    pub fn classes(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<GymClass>> {
        mount(&self.classes, api, scope, |api, org| async move {
            api.list_classes(org.as_str()).await
        })
    }

    pub fn memberships(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<MembershipPlan>> {
        mount(&self.memberships, api, scope, |api, org| async move {
            api.list_memberships(org.as_str()).await
        })
    }

    pub fn coupons(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<Coupon>> {
        mount(&self.coupons, api, scope, |api, org| async move {
            api.list_coupons(org.as_str()).await
        })
    }

    pub fn tags(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<Tag>> {
        mount(&self.tags, api, scope, |api, org| async move {
            api.list_tags(org.as_str()).await
        })
    }

    pub fn events(
        &self,
        api: Arc<dyn DojoApi>,
        scope: watch::Receiver<Option<ScopeId>>,
    ) -> EntityHandle<Vec<Event>> {
        mount(&self.events, api, scope, |api, org| async move {
            api.list_events(org.as_str()).await
        })
    }

    /// Drop the entry for `kind` and revalidate its mounted handles.
    ///
    /// Returns the number of handles notified.
    pub fn invalidate(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Members => self.members.invalidate(),
            EntityKind::DashboardStats => self.dashboard_stats.invalidate(),
            EntityKind::Transactions => self.transactions.invalidate(),
            EntityKind::Catalog => self.catalog.invalidate(),
            EntityKind::Classes => self.classes.invalidate(),
            EntityKind::Memberships => self.memberships.invalidate(),
            EntityKind::Coupons => self.coupons.invalidate(),
            EntityKind::Tags => self.tags.invalidate(),
            EntityKind::Events => self.events.invalidate(),
        }
    }

    /// Invalidate every entity type touched by `mutation`.
    pub fn invalidate_after(&self, mutation: Mutation) -> usize {
        debug!("Invalidating caches after {:?}", mutation);
        mutation
            .dirties()
            .iter()
            .map(|kind| self.invalidate(*kind))
            .sum()
    }

    pub fn snapshot(&self) -> Vec<SlotSnapshot> {
        vec![
            self.members.snapshot(),
            self.dashboard_stats.snapshot(),
            self.transactions.snapshot(),
            self.catalog.snapshot(),
            self.classes.snapshot(),
            self.memberships.snapshot(),
            self.coupons.snapshot(),
            self.tags.snapshot(),
            self.events.snapshot(),
        ]
    }
}

fn slot<T>(settings: &CacheSettings, kind: EntityKind) -> Arc<EntitySlot<T>>
where
    T: Clone + Send + Sync + 'static,
{
    EntitySlot::new(kind, settings.ttl_for(kind), settings.fetch_timeout())
}

fn mount<T, F, Fut>(
    slot: &Arc<EntitySlot<T>>,
    api: Arc<dyn DojoApi>,
    scope: watch::Receiver<Option<ScopeId>>,
    load: F,
) -> EntityHandle<T>
where
    T: Clone + Default + Send + Sync + 'static,
    F: Fn(Arc<dyn DojoApi>, ScopeId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let fetcher = fetcher_fn(move |org: ScopeId| load(api.clone(), org));
    EntityHandle::mount(slot.clone(), scope, Arc::new(fetcher))
}
