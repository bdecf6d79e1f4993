//! Linux-safe file name components.

/// Longest sanitized component; leaves room for the timestamp prefix, an id
/// hash and the `.mp4.part` suffix under NAME_MAX (255).
pub const MAX_COMPONENT_BYTES: usize = 200;

/// Sanitizes one path component for use in a Linux file name.
///
/// - Replaces NUL, `/`, `\`, control characters and whitespace with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Truncates to `MAX_COMPONENT_BYTES` on a char boundary
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let c = if unsafe_char { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(MAX_COMPONENT_BYTES);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    // Truncation may expose a trailing dot or underscore again.
    trimmed[..take].trim_end_matches(|c| c == '.' || c == '_').to_string()
}
