//! Deduplication keys for claims.
//!
//! Both fingerprints are strict equality checks over a normalized form: they
//! absorb casing, surrounding whitespace, punctuation in the street line and
//! spacing in the postal code, and nothing else.

use crate::hash::hash;

const DELIMITER: &str = "|";

/// The person + address tuple a fingerprint is computed from.
#[derive(Debug, Clone, Copy)]
pub struct AddressParts<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub address1: &'a str,
    pub city: &'a str,
    pub region: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
}

/// Identity of one applicant at one address.
pub fn address_fingerprint(parts: &AddressParts<'_>) -> String {
    let key = [
        normalize(parts.first_name),
        normalize(parts.last_name),
        normalize_street(parts.address1),
        normalize(parts.city),
        normalize(parts.region),
        normalize_postal_code(parts.postal_code),
        normalize_country(parts.country),
    ]
    .join(DELIMITER);
    hash(&key)
}

/// Identity of the address alone, shared by everyone claiming there.
pub fn location_fingerprint(parts: &AddressParts<'_>) -> String {
    let key = [
        normalize_street(parts.address1),
        normalize(parts.city),
        normalize(parts.region),
        normalize_postal_code(parts.postal_code),
        normalize_country(parts.country),
    ]
    .join(DELIMITER);
    hash(&key)
}

/// Stand-in fingerprint for a pre-created claim whose address is not known yet.
pub fn placeholder_fingerprint(claim_token: &str) -> String {
    hash(&format!("claim-token:{claim_token}"))
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_street(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_postal_code(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn normalize_country(value: &str) -> String {
    value.trim().to_uppercase()
}
