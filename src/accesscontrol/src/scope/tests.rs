/// Test suite for scope helpers and the resolver registry
///
/// Tests cover:
/// - Prefix extraction
/// - Wildcard derivation
/// - Wildcard matching
/// - Concurrent registry access

use super::*;
use proptest::prelude::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Prefix Tests
// ============================================================================

#[test]
fn test_scope_prefix() {
    assert_eq!(scope_prefix("dashboards:uid:abc"), "dashboards:uid:");
    assert_eq!(scope_prefix("folders:name:ops"), "folders:name:");
    assert_eq!(scope_prefix("dashboards:*"), "dashboards:");
    assert_eq!(scope_prefix("*"), "");
    assert_eq!(scope_prefix(""), "");
}

#[test]
fn test_scope_prefix_keeps_kind_and_attribute_only() {
    assert_eq!(scope_prefix("datasources:uid:a:b:c"), "datasources:uid:");
}

// ============================================================================
// Wildcard Tests
// ============================================================================

#[test]
fn test_wildcards_from_prefixes() {
    assert_eq!(
        wildcards_from_prefixes(&["dashboards:uid:"]),
        vec!["*", "dashboards:*", "dashboards:uid:*"]
    );
}

#[test]
fn test_wildcards_from_multiple_scopes() {
    let wildcards = wildcards_from_scopes(&["dashboards:uid:abc", "folders:uid:f1"]);
    assert_eq!(
        wildcards,
        vec!["*", "dashboards:*", "dashboards:uid:*", "folders:*", "folders:uid:*"]
    );
}

#[test]
fn test_wildcards_from_no_scopes() {
    let scopes: [&str; 0] = [];
    assert_eq!(wildcards_from_scopes(&scopes), vec!["*"]);
}

#[test]
fn test_build_scope() {
    assert_eq!(build_scope(&["dashboards", "uid", "abc"]), "dashboards:uid:abc");
    assert_eq!(scope_all("folders"), "folders:*");
}

// ============================================================================
// Matching Tests
// ============================================================================

#[test]
fn test_exact_matching() {
    assert!(scope_matches("dashboards:uid:abc", "dashboards:uid:abc"));
    assert!(!scope_matches("dashboards:uid:abc", "dashboards:uid:xyz"));
}

#[test]
fn test_wildcard_matching() {
    assert!(scope_matches("*", "dashboards:uid:abc"));
    assert!(scope_matches("dashboards:*", "dashboards:uid:abc"));
    assert!(scope_matches("dashboards:uid:*", "dashboards:uid:abc"));
    assert!(!scope_matches("folders:*", "dashboards:uid:abc"));
}

#[test]
fn test_invalid_granted_scopes_never_match() {
    assert!(!scope_matches("", ""));
    assert!(!scope_matches("dashboards:*:abc", "dashboards:uid:abc"));
    assert!(!scope_matches("dash?oards:uid:*", "dashboards:uid:abc"));
}

#[test]
fn test_is_valid_scope() {
    assert!(is_valid_scope("dashboards:uid:*"));
    assert!(is_valid_scope("dashboards:uid:abc"));
    assert!(!is_valid_scope("*:uid:abc"));
    assert!(!is_valid_scope(""));
}

// ============================================================================
// Registry Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_resolution() {
    let resolvers = Arc::new(ScopeResolvers::new());
    resolvers.add_scope_attribute_resolver(
        "dashboards:name:",
        Arc::new(ScopeAttributeResolverFunc::new(|_, scope| {
            Ok(vec![scope.replace(":name:", ":uid:")])
        })),
    );

    let mut handles = vec![];
    for i in 0..10 {
        let mutator = resolvers.get_scope_attribute_mutator(1);
        handles.push(tokio::spawn(async move {
            let ctx = CancellationToken::new();
            mutator.mutate(&ctx, &format!("dashboards:name:d{}", i)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let scopes = handle.await.unwrap().unwrap();
        assert_eq!(scopes, vec![format!("dashboards:uid:d{}", i)]);
    }

    assert_eq!(resolvers.stats().entries, 10);
}

#[test]
fn test_mutator_is_bound_to_org() {
    let resolvers = Arc::new(ScopeResolvers::new());
    let mutator = resolvers.get_scope_attribute_mutator(7);
    assert_eq!(mutator.org_id(), 7);
    assert!(!resolvers.has_resolver("dashboards:uid:"));
    assert!(resolvers.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_wildcards_cover_their_scope(kind in "[a-z]{1,8}", attr in "[a-z]{1,4}", value in "[a-z0-9]{1,8}") {
        let scope = build_scope(&[&kind, &attr, &value]);
        for wildcard in wildcards_from_scopes(&[scope.as_str()]) {
            prop_assert!(scope_matches(&wildcard, &scope));
        }
    }

    #[test]
    fn prop_prefix_is_a_prefix(kind in "[a-z]{1,8}", attr in "[a-z]{1,4}", value in "[a-z0-9:]{1,12}") {
        let scope = build_scope(&[&kind, &attr, &value]);
        let prefix = scope_prefix(&scope);
        prop_assert!(scope.starts_with(&prefix));
        prop_assert_eq!(prefix, format!("{}:{}:", kind, attr));
    }
}
