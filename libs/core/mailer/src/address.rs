//! Recipient addressing
//!
//! Addresses arrive from configuration as semicolon-separated strings, with
//! an optional second string carrying display names in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single sender or recipient address.
///
/// Equality is structural over both fields. A missing display name is the
/// empty string, never a separate state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub email_address: String,
    pub name: String,
}

impl Address {
    pub fn new(email_address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.email_address)
        } else {
            write!(f, "{} <{}>", self.name, self.email_address)
        }
    }
}

/// Split a semicolon-separated address string into [`Address`]es, pairing
/// element *i* of `addresses` with element *i* of `names`.
///
/// A string without a `;` produces a single address from the trimmed whole
/// strings. When the name list is shorter than the address list the missing
/// names become empty strings; extra names are ignored. Every value is
/// trimmed of surrounding whitespace.
///
/// Blank address entries are preserved here; senders filter them at
/// dispatch, so an effectively empty recipient list is a caller-visible
/// condition rather than a parser error.
pub fn parse_address_list(addresses: &str, names: Option<&str>) -> Vec<Address> {
    if !addresses.contains(';') {
        return vec![Address::new(
            addresses.trim(),
            names.unwrap_or_default().trim(),
        )];
    }

    let name_split: Vec<&str> = names.map(|n| n.split(';').collect()).unwrap_or_default();

    addresses
        .split(';')
        .enumerate()
        .map(|(i, address)| {
            let name = name_split.get(i).copied().unwrap_or_default();
            Address::new(address.trim(), name.trim())
        })
        .collect()
}
