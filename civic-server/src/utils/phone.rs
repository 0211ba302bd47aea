//! Phone number normalization
//!
//! Pure helpers: canonical E.164-like form for outbound messaging, digit-only
//! storage form, and the fixed list of legacy formats used to match a phone
//! against user records.

/// Keep digits and `+`
fn clean(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect()
}

/// Digits only
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Canonical E.164-like form
///
/// - an explicit `+` prefix is kept as is
/// - one leading trunk `0` is dropped
/// - a bare 10-digit number gets `+<country_code>`
/// - a 12-digit number already starting with the country code gets `+`
///
/// Anything else is returned cleaned but otherwise untouched. Empty input
/// yields an empty string.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let cleaned = clean(raw.trim());
    if cleaned.starts_with('+') {
        return cleaned;
    }
    let cleaned = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    if cleaned.len() == 10 {
        return format!("+{country_code}{cleaned}");
    }
    if cleaned.len() == 10 + country_code.len() && cleaned.starts_with(country_code) {
        return format!("+{cleaned}");
    }
    cleaned.to_string()
}

/// Formats a stored phone may take for the same subscriber
///
/// Raw digits, last-10-digit suffix, each with and without `+`, and the
/// suffix with the country code prefixed. Order is stable, no duplicates.
pub fn phone_variants(raw: &str, country_code: &str) -> Vec<String> {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return Vec::new();
    }

    let mut candidates = vec![digits.clone(), format!("+{digits}")];
    if digits.len() >= 10 {
        let last10 = &digits[digits.len() - 10..];
        candidates.push(last10.to_string());
        candidates.push(format!("+{last10}"));
        candidates.push(format!("{country_code}{last10}"));
        candidates.push(format!("+{country_code}{last10}"));
    }
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        candidates.push(trimmed.to_string());
    }

    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// True when two stored phones refer to the same subscriber
pub fn phones_match(a: &str, b: &str, country_code: &str) -> bool {
    let b_variants = phone_variants(b, country_code);
    phone_variants(a, country_code)
        .iter()
        .any(|v| b_variants.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_ten_digits() {
        assert_eq!(normalize_phone("9876543210", "91"), "+919876543210");
        assert_eq!(normalize_phone("98765 43210", "91"), "+919876543210");
    }

    #[test]
    fn test_normalize_keeps_plus() {
        assert_eq!(normalize_phone("+1 (415) 555-0100", "91"), "+14155550100");
    }

    #[test]
    fn test_normalize_trunk_zero() {
        assert_eq!(normalize_phone("09876543210", "91"), "+919876543210");
    }

    #[test]
    fn test_normalize_with_country_code() {
        assert_eq!(normalize_phone("919876543210", "91"), "+919876543210");
    }

    #[test]
    fn test_normalize_other_lengths_untouched() {
        assert_eq!(normalize_phone("12345", "91"), "12345");
        assert_eq!(normalize_phone("", "91"), "");
    }

    #[test]
    fn test_variants() {
        let v = phone_variants("+91 98765-43210", "91");
        assert!(v.contains(&"919876543210".to_string()));
        assert!(v.contains(&"+919876543210".to_string()));
        assert!(v.contains(&"9876543210".to_string()));
        assert!(v.contains(&"+9876543210".to_string()));
        let mut dedup = v.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), v.len());
    }

    #[test]
    fn test_variants_empty() {
        assert!(phone_variants("n/a", "91").is_empty());
    }

    #[test]
    fn test_phones_match() {
        assert!(phones_match("9876543210", "+91 98765 43210", "91"));
        assert!(phones_match("919876543210", "9876543210", "91"));
        assert!(!phones_match("9876543210", "9876543211", "91"));
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+91 (98765) 43-210"), "919876543210");
    }
}
