/// Scope string helpers
///
/// Scopes are colon-separated strings of the form `<kind>:<attribute>:<value>`,
/// for example `dashboards:uid:abc`. A scope ending in `*` is a wildcard and
/// covers every scope that starts with the part before the `*`.

/// Match-all scope
pub const SCOPE_ALL: &str = "*";

/// Number of leading segments that make up a scope prefix (kind and attribute)
const MAX_PREFIX_PARTS: usize = 2;

/// Wildcard scopes covering a set of prefixes
pub type Wildcards = Vec<String>;

/// Returns the prefix of a scope, used to pick a resolver
///
/// Keeps at most the kind and attribute segments and ends with `:`.
///
/// ```
/// use accesscontrol::scope::scope_prefix;
///
/// assert_eq!(scope_prefix("dashboards:uid:abc"), "dashboards:uid:");
/// assert_eq!(scope_prefix("dashboards:*"), "dashboards:");
/// ```
pub fn scope_prefix(scope: &str) -> String {
    let mut parts: Vec<&str> = scope.split(':').collect();

    if parts.len() > MAX_PREFIX_PARTS + 1 {
        parts.truncate(MAX_PREFIX_PARTS);
        parts.push("");
    }

    // Drop the value segment
    if let Some(last) = parts.last_mut() {
        *last = "";
    }

    parts.join(":")
}

/// Returns every wildcard that covers any of the given prefixes
///
/// `dashboards:uid:` yields `*`, `dashboards:*` and `dashboards:uid:*`.
pub fn wildcards_from_prefixes<S: AsRef<str>>(prefixes: &[S]) -> Wildcards {
    let mut wildcards = vec![SCOPE_ALL.to_string()];
    let mut current = String::new();

    for prefix in prefixes {
        for part in prefix.as_ref().split(':').filter(|p| !p.is_empty()) {
            current.push_str(part);
            current.push(':');
            wildcards.push(format!("{}*", current));
        }
        current.clear();
    }

    wildcards
}

/// Returns every wildcard that covers any of the given scopes
pub fn wildcards_from_scopes<S: AsRef<str>>(scopes: &[S]) -> Wildcards {
    let prefixes: Vec<String> = scopes.iter().map(|s| scope_prefix(s.as_ref())).collect();
    wildcards_from_prefixes(&prefixes)
}

/// Joins scope segments with `:`
pub fn build_scope(parts: &[&str]) -> String {
    parts.join(":")
}

/// Wildcard covering every scope of a kind, e.g. `dashboards:*`
pub fn scope_all(kind: &str) -> String {
    build_scope(&[kind, SCOPE_ALL])
}

/// Checks that wildcard characters only appear as the last character
pub fn is_valid_scope(scope: &str) -> bool {
    match scope.char_indices().last() {
        Some((idx, _)) => !scope[..idx].contains(&['*', '?'][..]),
        None => false,
    }
}

/// Checks whether a granted scope covers a target scope
///
/// A granted scope ending in `*` covers every target starting with the part
/// before the `*`. Anything else must match exactly. Invalid granted scopes
/// never match.
pub fn scope_matches(granted: &str, target: &str) -> bool {
    if !is_valid_scope(granted) {
        return false;
    }

    match granted.strip_suffix('*') {
        Some(prefix) => target.starts_with(prefix),
        None => granted == target,
    }
}
