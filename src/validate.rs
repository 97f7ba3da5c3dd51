use lazy_static::lazy_static;
use regex::Regex;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Approximate decoded size of a base64 payload. A data-URL prefix
/// (`data:image/png;base64,`) is not counted.
pub fn base64_decoded_len(payload: &str) -> usize {
    let data = payload
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    (data.len() * 3).div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x"));
    }

    #[test]
    fn base64_len_ignores_data_url_prefix() {
        let raw = "QUJDRA=="; // "ABCD"
        let with_prefix = format!("data:image/png;base64,{raw}");
        assert_eq!(base64_decoded_len(raw), base64_decoded_len(&with_prefix));
        assert_eq!(base64_decoded_len(raw), 6);
    }
}
