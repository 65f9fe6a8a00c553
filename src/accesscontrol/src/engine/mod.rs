//! Access control engine
//!
//! Decides whether a signed-in user satisfies an [`Evaluator`], first against
//! the granted scopes as they are and then, if that fails, after resolving the
//! evaluator's scopes through the registered scope attribute resolvers.

pub mod checker;
pub mod metrics;

pub use checker::ResourceChecker;
pub use metrics::AccessControlMetrics;

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::Registry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AccessControlConfig;
use crate::error::{AccessControlError, Result};
use crate::evaluator::Evaluator;
use crate::scope::{ScopeAttributeResolver, ScopeResolvers};
use crate::types::SignedInUser;

/// In-process access control evaluator
///
/// # Architecture
///
/// ```text
/// evaluate: permissions ─→ Evaluator::evaluate ──────────────────────→ allow
///                               │ deny
///                               ↓
///                     Evaluator::mutate_scopes ←── ScopeResolvers ───→ allow / deny
///
/// checker:  permissions[action] ─→ ResourceChecker ─→ check(resource)*
/// ```
///
/// Shared across request handlers behind an `Arc`.
pub struct AccessControl {
    /// Scope attribute resolvers, shared with every mutator handed out
    resolvers: Arc<ScopeResolvers>,

    /// Evaluation metrics (Prometheus)
    metrics: Option<AccessControlMetrics>,

    config: AccessControlConfig,
}

impl std::fmt::Debug for AccessControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControl")
            .field("config", &self.config)
            .field("metrics_enabled", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AccessControl {
    /// Create an engine with an empty resolver registry
    ///
    /// Metrics, when enabled, are registered in `registry`.
    pub fn new(config: AccessControlConfig, registry: &Registry) -> Result<Self> {
        config.validate()?;

        let resolvers = if config.resolution_cache_enabled {
            ScopeResolvers::with_ttl(config.resolution_cache_ttl)
        } else {
            ScopeResolvers::without_cache()
        };

        Self::with_resolvers(config, Arc::new(resolvers), registry)
    }

    /// Create an engine around an existing resolver registry
    ///
    /// The registry keeps its own cache settings; `resolution_cache_enabled`
    /// and `resolution_cache_ttl` only apply to registries built by [`new`](Self::new).
    pub fn with_resolvers(
        config: AccessControlConfig,
        resolvers: Arc<ScopeResolvers>,
        registry: &Registry,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = if config.enable_metrics {
            Some(AccessControlMetrics::new(registry)?)
        } else {
            None
        };

        info!(
            "AccessControl initialized with enabled={}, metrics={}, resolution_cache={}",
            config.enabled, config.enable_metrics, config.resolution_cache_enabled
        );

        Ok(Self {
            resolvers,
            metrics,
            config,
        })
    }

    /// Decide whether `user` satisfies `evaluator`
    ///
    /// # Pipeline
    ///
    /// 1. Initialize a never-loaded permission set to empty (kept on `user`)
    /// 2. Deny if nothing is granted in the user's current organization
    /// 3. Evaluate against the granted scopes as they are
    /// 4. Otherwise resolve the evaluator's scopes and evaluate again
    ///
    /// A missing resolver denies. Other resolution failures, cancellation
    /// included, are returned as errors and should be treated as a deny by
    /// the caller.
    pub async fn evaluate(
        &self,
        ctx: &CancellationToken,
        user: &mut SignedInUser,
        evaluator: &dyn Evaluator,
    ) -> Result<bool> {
        let _timer = self.metrics.as_ref().map(AccessControlMetrics::start_evaluation);

        let permissions = user.permissions.get_or_insert_with(HashMap::new);

        let org_permissions = match permissions.get(&user.org_id) {
            Some(org_permissions) => org_permissions,
            None => {
                warn!(
                    user_id = user.user_id,
                    org_id = user.org_id,
                    login = %user.login,
                    "no permissions set for user"
                );
                return Ok(false);
            }
        };

        // Unresolved first, so wildcard grants still match resources that no longer exist
        if evaluator.evaluate(org_permissions) {
            debug!(user_id = user.user_id, %evaluator, "allowed without scope resolution");
            return Ok(true);
        }

        let mutator = self.resolvers.get_scope_attribute_mutator(user.org_id);
        let resolved = match evaluator.mutate_scopes(ctx, &mutator).await {
            Ok(resolved) => resolved,
            Err(AccessControlError::ResolverNotFound) => {
                debug!(user_id = user.user_id, %evaluator, "no resolver for requirement, denying");
                return Ok(false);
            }
            Err(err) => {
                warn!(user_id = user.user_id, %evaluator, error = %err, "scope resolution failed");
                return Err(err);
            }
        };

        let allowed = resolved.evaluate(org_permissions);
        debug!(user_id = user.user_id, evaluator = %resolved, allowed, "evaluated resolved requirement");
        Ok(allowed)
    }

    /// Build a checker answering whether `user` holds `action` on resources
    ///
    /// Without any grant for `action` the checker denies every resource.
    pub fn checker(&self, user: &SignedInUser, action: &str) -> ResourceChecker {
        match user.org_permissions().and_then(|p| p.get(action)) {
            Some(scopes) => ResourceChecker::new(scopes.iter().cloned()),
            None => ResourceChecker::deny_all(),
        }
    }

    /// Register a resolver for a scope prefix such as `dashboards:name:`
    pub fn register_scope_attribute_resolver(
        &self,
        prefix: impl Into<String>,
        resolver: Arc<dyn ScopeAttributeResolver>,
    ) {
        self.resolvers.add_scope_attribute_resolver(prefix, resolver);
    }

    /// Scope attribute resolver registry
    pub fn resolvers(&self) -> &Arc<ScopeResolvers> {
        &self.resolvers
    }

    /// Evaluation metrics, if enabled
    pub fn metrics(&self) -> Option<&AccessControlMetrics> {
        self.metrics.as_ref()
    }

    /// Whether access control is turned off in the configuration
    ///
    /// `evaluate` and `checker` still answer from the user's permissions;
    /// skipping them is up to the caller.
    pub fn is_disabled(&self) -> bool {
        !self.config.enabled
    }

    pub fn config(&self) -> &AccessControlConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_creation() {
        let registry = Registry::new();
        let engine = AccessControl::new(AccessControlConfig::default(), &registry).unwrap();

        assert!(engine.metrics().is_some());
        assert!(engine.resolvers().is_empty());
    }

    #[test]
    fn test_engine_without_metrics() {
        let registry = Registry::new();
        let config = AccessControlConfig {
            enable_metrics: false,
            ..Default::default()
        };

        let engine = AccessControl::new(config, &registry).unwrap();
        assert!(engine.metrics().is_none());
        assert!(registry.gather().is_empty());
    }

    #[test]
    fn test_is_disabled_follows_config() {
        let engine = AccessControl::new(AccessControlConfig::default(), &Registry::new()).unwrap();
        assert!(!engine.is_disabled());

        let config = AccessControlConfig {
            enabled: false,
            ..Default::default()
        };
        let engine = AccessControl::new(config, &Registry::new()).unwrap();
        assert!(engine.is_disabled());
    }

    #[test]
    fn test_with_resolvers_validates_config() {
        let config = AccessControlConfig {
            resolution_cache_ttl: std::time::Duration::ZERO,
            ..Default::default()
        };
        let resolvers = Arc::new(ScopeResolvers::without_cache());

        let err = AccessControl::with_resolvers(config, resolvers, &Registry::new()).unwrap_err();
        assert!(matches!(err, AccessControlError::InvalidConfig(_)));
    }

    #[test]
    fn test_with_resolvers_keeps_registry_cache_settings() {
        let config = AccessControlConfig {
            resolution_cache_ttl: std::time::Duration::from_secs(120),
            ..Default::default()
        };
        let resolvers = Arc::new(ScopeResolvers::with_ttl(std::time::Duration::from_secs(5)));

        let engine = AccessControl::with_resolvers(config, resolvers, &Registry::new()).unwrap();
        assert_eq!(engine.resolvers().ttl(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn test_checker_without_grants_denies_all() {
        let registry = Registry::new();
        let engine = AccessControl::new(AccessControlConfig::default(), &registry).unwrap();

        let user = SignedInUser::new(1, 1, "alice");
        assert!(engine.checker(&user, "dashboards:read").denies_all());

        let user = user.with_permissions(1, "folders:read", ["folders:*"]);
        assert!(engine.checker(&user, "dashboards:read").denies_all());
        assert!(!engine.checker(&user, "folders:read").denies_all());
    }
}
