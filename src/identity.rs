//! Caller identity normalization.
//!
//! The upstream proxy forwards the authenticated user in a `UserName`
//! header whose value may be a bare username, a `DOMAIN\username` pair,
//! or a `username@domain` UPN. Downstream the stored procedure only wants
//! the bare username.

/// Default identity used when the header is absent.
pub const ANONYMOUS_USER: &str = "Anonymous";

/// Extracts the bare username from a raw identity string.
///
/// Rules, in order:
/// - contains `\`: the segment after the last `\` (`DOMAIN\bob` → `bob`)
/// - contains `@`: the segment before the first `@` (`bob@corp.com` → `bob`)
/// - otherwise the value passes through unchanged
///
/// No character-set validation is performed; empty segments pass through
/// as empty strings.
pub fn normalize_user_name(raw: &str) -> &str {
    if let Some(idx) = raw.rfind('\\') {
        &raw[idx + 1..]
    } else if let Some(idx) = raw.find('@') {
        &raw[..idx]
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_windows_domain_prefix() {
        assert_eq!(normalize_user_name("DOMAIN\\bob"), "bob");
    }

    #[test]
    fn uses_last_backslash_segment() {
        assert_eq!(normalize_user_name("CORP\\EU\\alice"), "alice");
    }

    #[test]
    fn strips_upn_domain_suffix() {
        assert_eq!(normalize_user_name("bob@corp.com"), "bob");
    }

    #[test]
    fn uses_first_at_sign() {
        assert_eq!(normalize_user_name("bob@corp@com"), "bob");
    }

    #[test]
    fn bare_username_passes_through() {
        assert_eq!(normalize_user_name("bob"), "bob");
    }

    #[test]
    fn backslash_takes_precedence_over_at_sign() {
        assert_eq!(normalize_user_name("DOMAIN\\bob@corp.com"), "bob@corp.com");
    }

    #[test]
    fn empty_segments_pass_through() {
        assert_eq!(normalize_user_name("DOMAIN\\"), "");
        assert_eq!(normalize_user_name("@corp.com"), "");
        assert_eq!(normalize_user_name(""), "");
    }
}
