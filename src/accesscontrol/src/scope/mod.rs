/// Scope helpers and the scope attribute resolver registry
///
/// # Examples
///
/// ```
/// use accesscontrol::scope::{scope_prefix, wildcards_from_scopes, scope_matches};
///
/// assert_eq!(scope_prefix("dashboards:uid:abc"), "dashboards:uid:");
/// assert_eq!(
///     wildcards_from_scopes(&["dashboards:uid:abc"]),
///     vec!["*", "dashboards:*", "dashboards:uid:*"],
/// );
/// assert!(scope_matches("dashboards:uid:*", "dashboards:uid:abc"));
/// ```

mod types;
mod resolver;

#[cfg(test)]
mod tests;

pub use types::{
    build_scope, is_valid_scope, scope_all, scope_matches, scope_prefix, wildcards_from_prefixes,
    wildcards_from_scopes, Wildcards, SCOPE_ALL,
};
pub use resolver::{
    CacheStats, ScopeAttributeMutator, ScopeAttributeResolver, ScopeAttributeResolverFunc,
    ScopeResolvers, DEFAULT_RESOLUTION_TTL,
};
