//! Kubernetes-safe naming.
//!
//! Chart, namespace and resource names must be valid DNS-1123 labels.

/// Maximum length of a DNS-1123 label.
pub const MAX_NAME_LEN: usize = 63;

/// Sanitizes a name into a DNS-1123 label.
///
/// Lower-cases the input, replaces every character outside `[a-z0-9-]` with
/// `-`, collapses runs of `-`, trims leading and trailing `-`, and truncates
/// to [`MAX_NAME_LEN`]. The result may be empty if the input has no
/// alphanumeric characters.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars().flat_map(char::to_lowercase) {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '-'
        };
        if mapped == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(mapped);
    }

    out.truncate(MAX_NAME_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    out
}
