//! Deployer identity resolution.
//!
//! The account id and region are not known until build time and may require a
//! call to the provider, so they sit behind an async trait. [`CachedResolver`]
//! guarantees at most one underlying resolution per build; every consumer of
//! account-scoped values goes through deferred placeholders instead of
//! reading identity directly.

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::core::types::DeployerIdentity;

/// Source of the deployer's account identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self) -> Result<DeployerIdentity, String>;
}

/// Fixed identity, for tests and offline builds.
pub struct StaticResolver {
    identity: DeployerIdentity,
}

impl StaticResolver {
    pub fn new(account_id: &str, region: &str) -> Self {
        StaticResolver {
            identity: DeployerIdentity {
                account_id: account_id.to_string(),
                region: region.to_string(),
            },
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve(&self) -> Result<DeployerIdentity, String> {
        Ok(self.identity.clone())
    }
}

/// Reads identity from ambient environment variables.
///
/// `AWS_ACCOUNT_ID` is required; region comes from `AWS_REGION`, falling back
/// to `AWS_DEFAULT_REGION`.
pub struct EnvResolver;

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl IdentityResolver for EnvResolver {
    async fn resolve(&self) -> Result<DeployerIdentity, String> {
        let account_id = non_empty_env("AWS_ACCOUNT_ID")
            .ok_or_else(|| "AWS_ACCOUNT_ID is not set".to_string())?;
        let region = non_empty_env("AWS_REGION")
            .or_else(|| non_empty_env("AWS_DEFAULT_REGION"))
            .ok_or_else(|| "neither AWS_REGION nor AWS_DEFAULT_REGION is set".to_string())?;
        Ok(DeployerIdentity { account_id, region })
    }
}

/// Memoizes the first successful resolution of the wrapped resolver.
pub struct CachedResolver<R: IdentityResolver> {
    inner: R,
    cell: OnceCell<DeployerIdentity>,
}

impl<R: IdentityResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        CachedResolver {
            inner,
            cell: OnceCell::new(),
        }
    }
}

#[async_trait]
impl<R: IdentityResolver> IdentityResolver for CachedResolver<R> {
    async fn resolve(&self) -> Result<DeployerIdentity, String> {
        self.cell
            .get_or_try_init(|| async { self.inner.resolve().await })
            .await
            .cloned()
    }
}
