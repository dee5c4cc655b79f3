// ABOUTME: GTIN barcode validation (EAN-8, UPC-A, EAN-13, GTIN-14) with GS1 check digits
// ABOUTME: Finds valid barcodes in free text such as OCR output or model replies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use regex::Regex;

/// Barcode lengths accepted, most specific first
const GTIN_LENGTHS: [usize; 4] = [13, 12, 14, 8];

/// True when `code` is all digits, a GTIN length, and its GS1 check digit matches
#[must_use]
pub fn is_valid(code: &str) -> bool {
    if !GTIN_LENGTHS.contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    let Some((&check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == check
}

/// Strip separators and validate a user-supplied barcode
#[must_use]
pub fn normalize(code: &str) -> Option<String> {
    let digits: String = code
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    is_valid(&digits).then_some(digits)
}

fn digit_run_regex() -> Option<&'static Regex> {
    static DIGIT_RUN_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    DIGIT_RUN_REGEX
        .get_or_init(|| Regex::new(r"\d(?:[ \-]?\d){7,13}").ok())
        .as_ref()
}

/// First check-digit-valid barcode printed in `text`
///
/// Digit groups separated by single spaces or dashes are joined, as barcodes
/// are commonly printed in blocks ("5 449000 000996").
#[must_use]
pub fn find_in_text(text: &str) -> Option<String> {
    let re = digit_run_regex()?;
    re.find_iter(text).find_map(|m| {
        let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
        if is_valid(&digits) {
            return Some(digits);
        }
        // A run may swallow neighbouring numbers; try the GTIN-sized windows
        GTIN_LENGTHS
            .iter()
            .filter(|&&len| digits.len() > len)
            .find_map(|&len| {
                (0..=digits.len() - len)
                    .map(|start| &digits[start..start + len])
                    .find(|window| is_valid(window))
                    .map(ToOwned::to_owned)
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digits() {
        assert!(is_valid("5449000000996"));
        assert!(is_valid("3017620422003"));
        assert!(is_valid("96385074"));
        assert!(is_valid("036000291452"));
        assert!(!is_valid("5449000000997"));
        assert!(!is_valid("54490000009"));
        assert!(!is_valid("544900000099a"));
    }

    #[test]
    fn test_find_in_text() {
        assert_eq!(
            find_in_text("Barcode: 5 449000 000996\nBest before 2026").as_deref(),
            Some("5449000000996")
        );
        assert_eq!(find_in_text("Energy 180 kJ, 42 kcal"), None);
        assert_eq!(find_in_text("NONE"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" 3017620-422003 ").as_deref(), Some("3017620422003"));
        assert_eq!(normalize("1234"), None);
    }
}
