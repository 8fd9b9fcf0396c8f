//! Origin allowlisting and CORS response headers
//!
//! An empty allowlist admits any caller: the request's own origin is
//! reflected, falling back to `*` for origin-less callers. A non-empty
//! allowlist requires an exact member match; everything else is rejected
//! before any upstream traffic.

use actix_web::HttpResponseBuilder;

pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Resolve the origin value to echo back, or `None` when the request must be
/// rejected.
pub fn resolve_origin(origin: Option<&str>, allowlist: &[String]) -> Option<String> {
    if allowlist.is_empty() {
        return Some(origin.unwrap_or("*").to_string());
    }
    match origin {
        Some(origin) if allowlist.iter().any(|allowed| allowed == origin) => {
            Some(origin.to_string())
        }
        _ => None,
    }
}

pub fn apply(builder: &mut HttpResponseBuilder, origin: &str) {
    builder.insert_header(("Access-Control-Allow-Origin", origin));
    builder.insert_header(("Access-Control-Allow-Methods", "POST,OPTIONS,GET"));
    builder.insert_header(("Access-Control-Allow-Headers", "Content-Type,Authorization"));
    builder.insert_header(("Access-Control-Max-Age", "86400"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins() {
        assert!(parse_allowed_origins(None).is_empty());
        assert!(parse_allowed_origins(Some("")).is_empty());
        assert!(parse_allowed_origins(Some("  ,  ")).is_empty());
        assert_eq!(
            parse_allowed_origins(Some("https://a.test, https://b.test")),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
    }

    #[test]
    fn test_empty_allowlist_reflects_origin() {
        let resolved = resolve_origin(Some("https://foo.test"), &[]);
        assert_eq!(resolved.as_deref(), Some("https://foo.test"));
    }

    #[test]
    fn test_empty_allowlist_wildcards_missing_origin() {
        assert_eq!(resolve_origin(None, &[]).as_deref(), Some("*"));
    }

    #[test]
    fn test_allowlist_exact_member() {
        let allowlist = vec!["https://a.test".to_string()];
        assert_eq!(
            resolve_origin(Some("https://a.test"), &allowlist).as_deref(),
            Some("https://a.test")
        );
        assert_eq!(resolve_origin(Some("https://b.test"), &allowlist), None);
        assert_eq!(resolve_origin(None, &allowlist), None);
    }
}
