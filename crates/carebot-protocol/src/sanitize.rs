//! Cleaning inbound text and phone numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Collapse whitespace, strip HTML tags, and cap the length at `max_len`
/// characters (plus a trailing `...` when cut).
pub fn sanitize_message(message: &str, max_len: usize) -> String {
    let collapsed = WHITESPACE_RE.replace_all(message.trim(), " ");
    let stripped = HTML_TAG_RE.replace_all(&collapsed, "");

    if stripped.chars().count() > max_len {
        let mut cut: String = stripped.chars().take(max_len).collect();
        cut.push_str("...");
        cut
    } else {
        stripped.into_owned()
    }
}

/// Strip the `whatsapp:` prefix and anything but digits and `+`.
pub fn clean_phone_number(phone_number: &str) -> String {
    phone_number
        .replace(WHATSAPP_PREFIX, "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Like [`clean_phone_number`], then coerce bare US numbers to E.164.
pub fn sanitize_phone_number(phone_number: &str) -> String {
    let clean = clean_phone_number(phone_number);
    if clean.starts_with('+') {
        return clean;
    }
    match clean.len() {
        10 => format!("+1{}", clean),
        11 if clean.starts_with('1') => format!("+{}", clean),
        _ => clean,
    }
}

/// Stable pseudonym for logs: first 8 hex chars of SHA-256.
pub fn anonymize_phone_number(phone_number: &str) -> String {
    let digest = Sha256::digest(phone_number.as_bytes());
    hex::encode(digest)[..8].to_string()
}

/// Ensure the `whatsapp:` channel prefix Twilio expects.
pub fn whatsapp_address(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_message() {
        assert_eq!(
            sanitize_message("  I have\n\n a <b>bad</b>   cough ", 1000),
            "I have a bad cough"
        );
        assert_eq!(sanitize_message("", 1000), "");
        assert_eq!(sanitize_message("abcdef", 4), "abcd...");
        assert_eq!(sanitize_message("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn test_phone_numbers() {
        assert_eq!(clean_phone_number("whatsapp:+1 (555) 010-2000"), "+15550102000");
        assert_eq!(sanitize_phone_number("5550102000"), "+15550102000");
        assert_eq!(sanitize_phone_number("15550102000"), "+15550102000");
        assert_eq!(sanitize_phone_number("whatsapp:+447700900123"), "+447700900123");
        assert_eq!(sanitize_phone_number("12345"), "12345");
    }

    #[test]
    fn test_anonymize_is_stable() {
        let a = anonymize_phone_number("+15550102000");
        assert_eq!(a.len(), 8);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, anonymize_phone_number("+15550102000"));
        assert_ne!(a, anonymize_phone_number("+15550102001"));
    }

    #[test]
    fn test_whatsapp_address() {
        assert_eq!(whatsapp_address("+1555"), "whatsapp:+1555");
        assert_eq!(whatsapp_address("whatsapp:+1555"), "whatsapp:+1555");
    }
}
