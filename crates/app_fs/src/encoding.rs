//! Character encoding detection for archive member names
//!
//! ZIP archives produced by older tools store names in the creator's code page
//! rather than UTF-8. The hint picks the preferred legacy family when the
//! detector cannot tell them apart.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Hint for encoding detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingHint {
    /// Prefer Japanese encodings (Shift_JIS)
    Japanese,
    /// Prefer Chinese Simplified (GBK/GB18030)
    ChineseSimplified,
    /// Prefer Chinese Traditional (Big5)
    ChineseTraditional,
    /// Prefer Korean (EUC-KR)
    Korean,
    /// Let the detector decide
    #[default]
    Auto,
}

impl EncodingHint {
    fn tld_and_fallback(self) -> Option<(&'static [u8], &'static Encoding)> {
        match self {
            EncodingHint::Japanese => Some((b"jp", encoding_rs::SHIFT_JIS)),
            EncodingHint::ChineseSimplified => Some((b"cn", encoding_rs::GBK)),
            EncodingHint::ChineseTraditional => Some((b"tw", encoding_rs::BIG5)),
            EncodingHint::Korean => Some((b"kr", encoding_rs::EUC_KR)),
            EncodingHint::Auto => None,
        }
    }
}

/// Detect the most likely encoding of a byte sequence
pub fn detect_encoding(bytes: &[u8], hint: EncodingHint) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return encoding_rs::UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    match hint.tld_and_fallback() {
        Some((tld, fallback)) => {
            // Short names rarely carry enough signal; windows-1252 is the
            // detector's "no idea" answer.
            let detected = detector.guess(Some(tld), true);
            if detected == encoding_rs::WINDOWS_1252 {
                fallback
            } else {
                detected
            }
        }
        None => detector.guess(None, true),
    }
}

/// Decode bytes to a UTF-8 string
///
/// Returns the decoded string and whether replacement characters were needed.
pub fn decode_bytes(bytes: &[u8], hint: EncodingHint) -> (String, bool) {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return (s.to_string(), false);
    }

    let encoding = detect_encoding(bytes, hint);
    let (result, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Lossy member name decode");
    }
    (result.into_owned(), had_errors)
}

/// Get the system default encoding hint based on locale
#[cfg(not(windows))]
pub fn system_encoding_hint() -> EncodingHint {
    std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .map(|lang| hint_from_locale(&lang))
        .unwrap_or(EncodingHint::Auto)
}

#[cfg(windows)]
pub fn system_encoding_hint() -> EncodingHint {
    std::env::var("LANG")
        .map(|lang| hint_from_locale(&lang))
        .unwrap_or(EncodingHint::Auto)
}

fn hint_from_locale(lang: &str) -> EncodingHint {
    let lang = lang.to_lowercase();
    if lang.starts_with("ja") {
        EncodingHint::Japanese
    } else if lang.starts_with("zh_cn") || lang.starts_with("zh-cn") {
        EncodingHint::ChineseSimplified
    } else if lang.starts_with("zh_tw") || lang.starts_with("zh-tw") || lang.starts_with("zh_hk") {
        EncodingHint::ChineseTraditional
    } else if lang.starts_with("ko") {
        EncodingHint::Korean
    } else {
        EncodingHint::Auto
    }
}
