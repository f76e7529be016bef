//! Member name sanitization for extraction targets
//!
//! Archive member names come from whatever system created the archive. Names
//! that the host filesystem cannot represent are rewritten before writing.

/// Mode for sanitizing filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeMode {
    /// Replace forbidden characters with full-width equivalents
    FullWidth,
    /// Replace forbidden characters with underscores
    Underscore,
}

/// Windows reserved filenames
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const FORBIDDEN_CHARS: &[(char, char)] = &[
    ('\\', '＼'),
    ('/', '／'),
    (':', '：'),
    ('*', '＊'),
    ('?', '？'),
    ('"', '＂'),
    ('<', '＜'),
    ('>', '＞'),
    ('|', '｜'),
];

/// Rewrite a single path component so every supported host accepts it
pub fn sanitize_filename(name: &str, mode: SanitizeMode) -> String {
    let mut result = String::with_capacity(name.len());

    for c in name.chars() {
        match FORBIDDEN_CHARS.iter().find(|(f, _)| *f == c) {
            Some((_, wide)) => match mode {
                SanitizeMode::FullWidth => result.push(*wide),
                SanitizeMode::Underscore => result.push('_'),
            },
            None if c.is_control() => result.push('_'),
            None => result.push(c),
        }
    }

    if is_reserved(&result) {
        result.insert(0, '_');
    }

    while result.ends_with('.') || result.ends_with(' ') {
        result.pop();
    }

    if result.is_empty() {
        result.push_str("_unnamed");
    }

    result
}

/// Check whether a component can be written unchanged
pub fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_control() || FORBIDDEN_CHARS.iter().any(|(f, _)| *f == c))
        && !is_reserved(name)
        && !name.ends_with('.')
        && !name.ends_with(' ')
}

fn is_reserved(name: &str) -> bool {
    let upper = name.to_uppercase();
    let base = upper.split('.').next().unwrap_or("");
    RESERVED_NAMES.contains(&base)
}
