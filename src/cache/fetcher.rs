//! Upstream loaders for cached entities

use std::future::Future;

use async_trait::async_trait;

use super::ScopeId;
use crate::error::Result;

/// Loads the collection for one organization.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    async fn fetch(&self, scope: &ScopeId) -> Result<T>;
}

/// [`Fetcher`] backed by a closure.
pub struct FnFetcher<F> {
    f: F,
}

/// Wrap a closure returning a future as a [`Fetcher`].
pub fn fetcher_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

#[async_trait]
impl<T, F, Fut> Fetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(ScopeId) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
{
    async fn fetch(&self, scope: &ScopeId) -> Result<T> {
        (self.f)(scope.clone()).await
    }
}
