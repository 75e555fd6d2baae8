//! URL slug derivation.

use deunicode::deunicode;

/// Derive a URL-safe slug from free text.
///
/// Transliterates to ASCII ("Café" becomes "Cafe"), lower-cases, keeps
/// letters, digits and `_`, collapses runs of whitespace and `-` into a
/// single `-`, drops everything else and trims leading/trailing `-` and `_`.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for ch in ascii.chars().map(|c| c.to_ascii_lowercase()) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch.is_ascii_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
