//! Aadhaar number extraction from recognized text

use once_cell::sync::Lazy;
use regex::Regex;

use crate::id_number::IdNumber;

/// Three 4-digit groups separated by single spaces, word boundaries both ends
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]{4} [0-9]{4} [0-9]{4}\b").expect("invalid id number pattern")
});

/// All non-overlapping pattern matches in document order
pub fn find_candidates(text: &str) -> Vec<IdNumber> {
    ID_PATTERN
        .find_iter(text)
        .filter_map(|m| IdNumber::parse(m.as_str()))
        .collect()
}

/// Extract the Aadhaar number from full-page text.
///
/// When the text holds several matches the last one in document order wins.
/// `None` means "not found", which is a normal outcome.
pub fn extract_id_number(text: &str) -> Option<IdNumber> {
    let mut candidates = find_candidates(text);
    if candidates.len() > 1 {
        log::debug!(
            "[Extract] {} candidates, keeping the last one",
            candidates.len()
        );
    }
    candidates.pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match() {
        assert_eq!(extract_id_number(""), None);
        assert_eq!(extract_id_number("Name: John Doe\nDOB: 01/01/1990"), None);
        assert_eq!(extract_id_number("1234-5678-9012"), None);
        assert_eq!(extract_id_number("123456789012"), None);
        assert_eq!(extract_id_number("1234 5678  9012"), None);
    }

    #[test]
    fn test_single_match() {
        let text = "Name: John Doe\nAadhaar: 1234 5678 9012\nDOB: ...";
        assert_eq!(extract_id_number(text).unwrap().as_str(), "1234 5678 9012");
    }

    #[test]
    fn test_last_match_wins() {
        let text = "VID 1111 2222 3333\nAadhaar 4444 5555 6666\nfooter";
        assert_eq!(extract_id_number(text).unwrap().as_str(), "4444 5555 6666");

        let reversed = "Aadhaar 4444 5555 6666\nVID 1111 2222 3333";
        assert_eq!(extract_id_number(reversed).unwrap().as_str(), "1111 2222 3333");
    }

    #[test]
    fn test_word_boundaries() {
        // a fourth group glued on breaks the trailing boundary
        assert_eq!(extract_id_number("1234 5678 90123"), None);
        assert_eq!(extract_id_number("x1234 5678 9012"), None);
        assert_eq!(
            extract_id_number("(1234 5678 9012)").unwrap().as_str(),
            "1234 5678 9012"
        );
    }

    #[test]
    fn test_non_overlapping_scan() {
        // "1234 5678 9012" is consumed, " 3456" alone is not a match
        let found = find_candidates("1234 5678 9012 3456");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_str(), "1234 5678 9012");
    }
}
