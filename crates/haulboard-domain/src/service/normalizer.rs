//! Free-text normalization for customer names, destinations and postcodes
//!
//! Every function returns `None` instead of an empty string.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Consignment;

static NON_KEY_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Z0-9 ]").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static GIR_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bGIR\s*0AA\b").expect("valid regex"));

/// Outward code (1-2 letters, digit, optional alphanumeric) + inward code (digit, 2 letters)
static UK_POSTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{1,2}[0-9][A-Z0-9]?)\s*([0-9][A-Z]{2})\b").expect("valid regex")
});

/// Whole-word canonical forms applied after character cleanup
const VOCABULARY: &[(&str, &str)] = &[
    ("LIMITED", "LTD"),
    ("COMPANY", "CO"),
    ("INCORPORATED", "INC"),
    ("CORPORATION", "CORP"),
    ("BROTHERS", "BROS"),
];

/// Trim and uppercase a postcode. Shape is not validated.
pub fn normalize_postcode(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Normalize a customer name into a matching key
pub fn normalize_customer(value: &str) -> Option<String> {
    normalize_key(value)
}

/// Normalize a destination into a grouping key
pub fn normalize_destination(value: &str) -> Option<String> {
    normalize_key(value)
}

fn normalize_key(value: &str) -> Option<String> {
    let upper = value.to_uppercase();
    let cleaned = NON_KEY_CHARS.replace_all(&upper, " ");
    let collapsed = WHITESPACE_RUN.replace_all(cleaned.trim(), " ");

    let key = collapsed
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            VOCABULARY
                .iter()
                .find(|(from, _)| *from == word)
                .map(|(_, to)| *to)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ");

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Find a UK-style postcode anywhere in `value`, returned as "OUTWARD INWARD"
pub fn extract_postcode(value: &str) -> Option<String> {
    let normalized = normalize_postcode(value)?;

    if GIR_POSTCODE.is_match(&normalized) {
        return Some("GIR 0AA".to_string());
    }

    UK_POSTCODE
        .captures(&normalized)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

/// Fill missing customer/destination keys from the raw text.
///
/// Keys that are already set are left alone.
pub fn resolve_consignment_keys(consignment: &mut Consignment) {
    if consignment.customer_key.is_none() {
        consignment.customer_key = normalize_customer(&consignment.customer_name);
    }
    if consignment.destination_key.is_none() {
        consignment.destination_key = normalize_destination(&consignment.destination);
    }
}
