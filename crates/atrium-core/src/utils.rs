//! Small shared utilities

/// Normalize a label into a sort/url-safe slug
///
/// Lowercases, maps runs of non-alphanumeric characters to a single '-'
/// and trims leading/trailing dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// First character of a label for alphabetic index navigation
///
/// Returns the lowercased first ascii letter or digit, or None when the
/// label starts with anything else (routed to the "other" bucket).
pub fn index_char(label: &str) -> Option<char> {
    label
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric())
}
