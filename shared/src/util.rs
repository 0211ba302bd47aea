use chrono::{SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Current UTC time as an ISO-8601 string with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a 24-hex document identifier.
///
/// Layout (12 bytes):
///   - 4 bytes: seconds since the Unix epoch (big endian, sortable by creation)
///   - 8 bytes: random
pub fn new_id() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 12];
    let secs = Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    rand::thread_rng().fill_bytes(&mut bytes[4..]);
    hex::encode(bytes)
}

/// True when `id` is a well-formed 24-hex identifier
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Basic `local@domain.tld` shape check
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_valid() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 24);
        assert!(is_valid_id(&a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_valid_id_rejects_malformed() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-an-id"));
        assert!(!is_valid_id("65f0c0ffee65f0c0ffee65fz"));
        assert!(!is_valid_id("65f0c0ffee65f0c0ffee65f"));
        assert!(is_valid_id("65f0c0ffee65f0c0ffee65f0"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("citizen@example.org"));
        assert!(is_valid_email("  a.b+c@mail.city.gov.in "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn test_now_iso_format() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
