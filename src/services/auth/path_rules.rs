/*
 * Responsibility
 * - decide whether a request path needs authentication at all
 *
 * Matching semantics (one policy, applied everywhere): a pattern ending
 * in '*' matches any path sharing its literal prefix; any other pattern
 * is compared exactly, with a single trailing '/' being insignificant on
 * either side. There is no general globbing.
 */

/// `true` when `path` must be authenticated given the exclusion patterns.
///
/// Fails closed: a missing path or an empty exclusion list always
/// requires authentication. Pure; no side effects.
pub fn requires_auth(path: Option<&str>, excluded_patterns: &[String]) -> bool {
    let Some(path) = path else {
        return true;
    };
    if excluded_patterns.is_empty() {
        return true;
    }

    for pattern in excluded_patterns {
        if let Some(prefix) = pattern.strip_suffix('*') {
            if path.starts_with(prefix) {
                return false;
            }
        } else if path.trim_end_matches('/') == pattern.trim_end_matches('/') {
            return false;
        }
    }

    true
}
