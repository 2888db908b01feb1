//! Aadhaar number localisation over recognized words.
//!
//! OCR word segmentation rarely reproduces the printed `dddd dddd dddd` as a
//! single token, so the locator compares each word (whitespace stripped)
//! against probe strings derived from the number. Missing the region is an
//! expected outcome, not an error.

use aadhaar_ocr::{RecognizedWord, Rect};

use crate::id_number::IdNumber;

/// Rectangle of the first word, in engine order, whose stripped text equals
/// the prefix probe or the tail probe.
pub fn locate(id: &IdNumber, words: &[RecognizedWord]) -> Option<Rect> {
    let prefix = id.prefix_probe();
    let tail = id.tail_probe();

    let hit = words.iter().find(|word| {
        let text = word.stripped_text();
        text == prefix || text == tail
    })?;

    log::debug!("[Locate] probe hit at {}", hit.rect);
    Some(hit.rect)
}

/// Rectangles of every word holding a fragment of the number
/// (see [`IdNumber::fragments`]), in engine order without duplicates.
pub fn locate_all(id: &IdNumber, words: &[RecognizedWord]) -> Vec<Rect> {
    let fragments = id.fragments();
    let mut rects: Vec<Rect> = Vec::new();

    for word in words {
        let text = word.stripped_text();
        if text.is_empty() || !fragments.contains(&text) {
            continue;
        }
        if !rects.contains(&word.rect) {
            log::debug!("[Locate] fragment hit at {}", word.rect);
            rects.push(word.rect);
        }
    }

    rects
}
