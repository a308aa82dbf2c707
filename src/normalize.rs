//! Identifier canonicalisation.
//!
//! The server upper-cases unquoted identifiers and keeps the exact text of
//! quoted ones. Names coming back from `DESCRIBE` (sink lists, resource names)
//! are always in that canonical form, so anything compared against them goes
//! through [`canonical_name`] first.

/// Canonical server spelling of an identifier.
///
/// ```rust
/// use ksql_link::normalize::canonical_name;
///
/// assert_eq!(canonical_name("pageviews"), "PAGEVIEWS");
/// assert_eq!(canonical_name("`PageViews`"), "PageViews");
/// ```
pub fn canonical_name(name: &str) -> String {
    let trimmed = name.trim();
    match strip_quotes(trimmed) {
        Some(quoted) => quoted.to_string(),
        None => trimmed.to_uppercase(),
    }
}

/// Identifier text that the server reads back as `canonical`.
///
/// Plain upper-case identifiers are written as-is; anything else is quoted
/// with backticks so the server does not upper-case it.
///
/// ```rust
/// use ksql_link::normalize::{canonical_name, quote_identifier};
///
/// assert_eq!(quote_identifier("PAGEVIEWS"), "PAGEVIEWS");
/// assert_eq!(quote_identifier(&canonical_name("`mixedCase`")), "`mixedCase`");
/// ```
pub fn quote_identifier(canonical: &str) -> String {
    let mut chars = canonical.chars();
    let plain = match chars.next() {
        Some(first) => {
            (first.is_ascii_uppercase() || first == '_')
                && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    };
    if plain {
        canonical.to_string()
    } else {
        format!("`{}`", canonical.replace('`', "``"))
    }
}

fn strip_quotes(name: &str) -> Option<&str> {
    ['`', '"'].into_iter().find_map(|quote| {
        name.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
