use bindery_core::EPUB_EXTENSION;

const FALLBACK_STEM: &str = "book";

/// Archive filename for a dropped folder: `{sanitized_root}.epub`.
///
/// The extension is stripped case-insensitively before sanitising, every
/// character outside `[A-Za-z0-9._-]` becomes `_`, and surrounding
/// underscores are trimmed. An empty result falls back to `book`.
pub fn bundle_filename(root_name: &str) -> String {
    let stem = strip_extension(root_name.trim());
    let sanitized: String = stem
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect();
    let trimmed = sanitized.trim_matches('_');
    let stem = if trimmed.is_empty() {
        FALLBACK_STEM
    } else {
        trimmed
    };
    format!("{stem}.{EPUB_EXTENSION}")
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(EPUB_EXTENSION) => stem,
        _ => name,
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
