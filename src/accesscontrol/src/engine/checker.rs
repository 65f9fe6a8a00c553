//! Memoized per-action resource checks

use std::collections::HashSet;

use crate::scope::wildcards_from_scopes;
use crate::types::Resource;

/// Answers "is the action granted on this resource?" for a stream of resources
///
/// Built once per action by [`AccessControl::checker`](super::AccessControl::checker)
/// and owned by the caller for the duration of a request. Whether the grants
/// contain a wildcard is computed from the first resource checked and reused
/// for every later one, so all resources passed to one checker are expected
/// to be of the same kind.
#[derive(Debug, Clone)]
pub struct ResourceChecker {
    /// Granted scopes; `None` denies everything
    lookup: Option<HashSet<String>>,
    has_wildcard: Option<bool>,
}

impl ResourceChecker {
    pub(crate) fn deny_all() -> Self {
        Self {
            lookup: None,
            has_wildcard: None,
        }
    }

    pub(crate) fn new<I>(scopes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            lookup: Some(scopes.into_iter().collect()),
            has_wildcard: None,
        }
    }

    /// Checks a single resource
    pub fn check<R: Resource + ?Sized>(&mut self, resource: &R) -> bool {
        let lookup = match &self.lookup {
            Some(lookup) => lookup,
            None => return false,
        };

        let scopes = resource.scopes();
        let has_wildcard = *self.has_wildcard.get_or_insert_with(|| {
            wildcards_from_scopes(&scopes)
                .iter()
                .any(|wildcard| lookup.contains(wildcard))
        });

        if has_wildcard {
            return true;
        }

        scopes.iter().any(|scope| lookup.contains(scope))
    }

    /// Keeps the resources the action is granted on, in order
    pub fn filter<R, I>(&mut self, resources: I) -> Vec<R>
    where
        R: Resource,
        I: IntoIterator<Item = R>,
    {
        resources.into_iter().filter(|r| self.check(r)).collect()
    }

    /// Whether this checker denies every resource without looking at it
    pub fn denies_all(&self) -> bool {
        self.lookup.is_none()
    }
}
