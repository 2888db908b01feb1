//! Aadhaar number value type

use once_cell::sync::Lazy;
use regex::Regex;

static CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4} [0-9]{4} [0-9]{4}$").expect("invalid canonical id pattern"));

/// A 12-digit Aadhaar number in canonical `dddd dddd dddd` form.
///
/// Only produced by [`IdNumber::parse`] or the extractor, so slicing by
/// character offset is always in bounds. No checksum is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdNumber(String);

impl IdNumber {
    /// Accept exactly the canonical form
    pub fn parse(s: &str) -> Option<Self> {
        CANONICAL.is_match(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 12 digits without separators
    pub fn digits(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn groups(&self) -> [&str; 3] {
        [&self.0[0..4], &self.0[5..9], &self.0[10..14]]
    }

    /// First nine digits, separators removed
    pub fn prefix_probe(&self) -> String {
        self.digits()[..9].to_string()
    }

    /// Characters 5..9 of the canonical form, i.e. the second group
    pub fn tail_probe(&self) -> &str {
        &self.0[5..9]
    }

    /// Every separator-free token a word could hold when OCR splits or merges
    /// the groups: the whole number, the prefix probe, adjacent pairs and
    /// single groups. Longest first, no duplicates.
    pub fn fragments(&self) -> Vec<String> {
        let [a, b, c] = self.groups();
        let mut out: Vec<String> = Vec::with_capacity(7);
        for candidate in [
            self.digits(),
            self.prefix_probe(),
            format!("{a}{b}"),
            format!("{b}{c}"),
            a.to_string(),
            b.to_string(),
            c.to_string(),
        ] {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }

    /// Audit-safe form, only the last group visible
    pub fn masked(&self) -> String {
        format!("XXXX XXXX {}", &self.0[10..14])
    }
}

impl std::fmt::Display for IdNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
