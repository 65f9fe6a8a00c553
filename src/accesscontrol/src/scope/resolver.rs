/// Scope attribute resolver registry with a TTL resolution cache
///
/// Resolvers turn attribute scopes such as `dashboards:name:Sales` into the
/// concrete scopes they stand for, e.g. `dashboards:uid:abc`. They are
/// registered per scope prefix during startup and looked up per organization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::scope_prefix;
use crate::error::{AccessControlError, BoxError, Result};
use crate::types::OrgId;

/// Default resolution cache TTL (30 seconds)
pub const DEFAULT_RESOLUTION_TTL: Duration = Duration::from_secs(30);

/// Cache inserts between two sweeps of expired entries
const PRUNE_INTERVAL: usize = 1024;

/// Resolves a scope into the concrete scopes it maps to
#[async_trait]
pub trait ScopeAttributeResolver: Send + Sync {
    async fn resolve(&self, org_id: OrgId, scope: &str) -> std::result::Result<Vec<String>, BoxError>;
}

/// Adapts a synchronous closure into a [`ScopeAttributeResolver`]
///
/// ```
/// use accesscontrol::scope::ScopeAttributeResolverFunc;
///
/// let resolver = ScopeAttributeResolverFunc::new(|_org_id, scope| {
///     Ok(vec![scope.replace(":name:", ":uid:")])
/// });
/// # let _ = resolver;
/// ```
pub struct ScopeAttributeResolverFunc<F>(pub F);

impl<F> ScopeAttributeResolverFunc<F>
where
    F: Fn(OrgId, &str) -> std::result::Result<Vec<String>, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> ScopeAttributeResolver for ScopeAttributeResolverFunc<F>
where
    F: Fn(OrgId, &str) -> std::result::Result<Vec<String>, BoxError> + Send + Sync,
{
    async fn resolve(&self, org_id: OrgId, scope: &str) -> std::result::Result<Vec<String>, BoxError> {
        (self.0)(org_id, scope)
    }
}

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Returns the value if not expired
    fn get(&self) -> Option<&T> {
        if self.is_expired() {
            None
        } else {
            Some(&self.value)
        }
    }
}

/// Statistics about the resolution cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of expired entries encountered
    pub expirations: usize,
    /// Total number of entries in cache
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Registry of scope attribute resolvers keyed by scope prefix
///
/// Lookups happen on every evaluation that falls back to resolution while
/// registrations happen at startup, so both the registry and the cache are
/// sharded concurrent maps. Map guards are never held across an `.await`.
pub struct ScopeResolvers {
    /// prefix -> resolver
    attribute_resolvers: DashMap<String, Arc<dyn ScopeAttributeResolver>>,
    /// (org, scope) -> resolved scopes
    cache: DashMap<(OrgId, String), CacheEntry<Vec<String>>>,
    cache_enabled: bool,
    ttl: Duration,
    stats: DashMap<&'static str, usize>,
    inserts: AtomicUsize,
}

impl ScopeResolvers {
    /// Creates an empty registry with the default cache TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_RESOLUTION_TTL)
    }

    /// Creates an empty registry caching resolutions for `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            attribute_resolvers: DashMap::new(),
            cache: DashMap::new(),
            cache_enabled: true,
            ttl,
            stats: DashMap::new(),
            inserts: AtomicUsize::new(0),
        }
    }

    /// Creates an empty registry that calls the resolver on every lookup
    pub fn without_cache() -> Self {
        Self {
            cache_enabled: false,
            ..Self::new()
        }
    }

    /// Registers a resolver for a scope prefix, replacing any previous one
    ///
    /// Meant for startup. A lookup already running against the replaced
    /// resolver may still cache its result for one TTL; call
    /// [`clear_cache`](Self::clear_cache) after replacing at runtime.
    pub fn add_scope_attribute_resolver(
        &self,
        prefix: impl Into<String>,
        resolver: Arc<dyn ScopeAttributeResolver>,
    ) {
        let prefix = prefix.into();
        debug!(prefix = %prefix, "Adding scope attribute resolver");

        if self.attribute_resolvers.insert(prefix.clone(), resolver).is_some() {
            // Cached results may come from the replaced resolver
            self.cache.retain(|(_, scope), _| scope_prefix(scope) != prefix);
        }
    }

    /// Whether a resolver is registered for the prefix
    pub fn has_resolver(&self, prefix: &str) -> bool {
        self.attribute_resolvers.contains_key(prefix)
    }

    /// Number of registered resolvers
    pub fn len(&self) -> usize {
        self.attribute_resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_resolvers.is_empty()
    }

    /// Returns the mutator an evaluator uses to resolve its scopes in `org_id`
    pub fn get_scope_attribute_mutator(self: &Arc<Self>, org_id: OrgId) -> ScopeAttributeMutator {
        ScopeAttributeMutator {
            resolvers: Arc::clone(self),
            org_id,
        }
    }

    /// Resolves a scope with the resolver registered for its prefix
    ///
    /// # Errors
    ///
    /// - [`AccessControlError::ResolverNotFound`] if no resolver handles the prefix
    /// - [`AccessControlError::Cancelled`] if `ctx` is cancelled first
    /// - [`AccessControlError::Resolution`] if the resolver fails
    pub async fn resolve(&self, ctx: &CancellationToken, org_id: OrgId, scope: &str) -> Result<Vec<String>> {
        if ctx.is_cancelled() {
            return Err(AccessControlError::Cancelled);
        }

        let key = (org_id, scope.to_string());
        if let Some(scopes) = self.cached(&key) {
            debug!(scope, to = ?scopes, "Used cached resolution");
            return Ok(scopes);
        }

        let resolver = match self.attribute_resolvers.get(&scope_prefix(scope)) {
            Some(entry) => Arc::clone(entry.value()),
            None => return Err(AccessControlError::ResolverNotFound),
        };

        let scopes = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(AccessControlError::Cancelled),
            result = resolver.resolve(org_id, scope) => result.map_err(|source| AccessControlError::Resolution {
                scope: scope.to_string(),
                source,
            })?,
        };

        if self.cache_enabled {
            self.cache.insert(key, CacheEntry::new(scopes.clone(), self.ttl));
            if (self.inserts.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_INTERVAL == 0 {
                self.cleanup_expired();
            }
        }

        debug!(scope, to = ?scopes, "Resolved scope");
        Ok(scopes)
    }

    fn cached(&self, key: &(OrgId, String)) -> Option<Vec<String>> {
        if !self.cache_enabled {
            return None;
        }

        // The read guard must be gone before the entry can be removed
        let lookup = self.cache.get(key).map(|entry| entry.get().cloned());

        match lookup {
            Some(Some(scopes)) => {
                self.increment_stat("hits");
                Some(scopes)
            }
            Some(None) => {
                self.cache.remove_if(key, |_, entry| entry.is_expired());
                self.increment_stat("expirations");
                self.increment_stat("misses");
                None
            }
            None => {
                self.increment_stat("misses");
                None
            }
        }
    }

    /// Clears the resolution cache
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.stats.clear();
    }

    /// Removes expired entries from the resolution cache
    pub fn cleanup_expired(&self) {
        self.cache.retain(|_, entry| !entry.is_expired());
    }

    /// Returns resolution cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self.cache.len(),
        }
    }

    /// Returns the resolution cache TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ScopeResolvers {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves scopes for a single organization
///
/// Handed to [`Evaluator::mutate_scopes`](crate::evaluator::Evaluator::mutate_scopes)
/// so evaluators never see the registry itself.
#[derive(Clone)]
pub struct ScopeAttributeMutator {
    resolvers: Arc<ScopeResolvers>,
    org_id: OrgId,
}

impl ScopeAttributeMutator {
    /// Organization this mutator resolves in
    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Resolves one scope into the scopes it maps to
    pub async fn mutate(&self, ctx: &CancellationToken, scope: &str) -> Result<Vec<String>> {
        self.resolvers.resolve(ctx, self.org_id, scope).await
    }
}

impl std::fmt::Debug for ScopeAttributeMutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeAttributeMutator")
            .field("org_id", &self.org_id)
            .field("resolvers", &self.resolvers.len())
            .finish()
    }
}
