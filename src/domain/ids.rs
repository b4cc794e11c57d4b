//! Domain identifier types with validation
//!
//! Newtype wrappers for the keys that tie pharmacy, claim and revert records
//! together. Each type rejects empty (or whitespace-only) identifiers so that a
//! constructed id is always usable as a join key.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " from a string")]
            ///
            /// Surrounding whitespace is trimmed.
            ///
            /// # Returns
            ///
            /// Returns `Err` if the identifier is empty after trimming
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                if trimmed.len() == id.len() {
                    Ok(Self(id))
                } else {
                    Ok(Self(trimmed.to_string()))
                }
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Pharmacy identifier (the NPI in upstream feeds)
    ///
    /// # Examples
    ///
    /// ```
    /// use rxledger::domain::ids::PharmacyId;
    /// use std::str::FromStr;
    ///
    /// let id = PharmacyId::from_str("1234567890").unwrap();
    /// assert_eq!(id.as_str(), "1234567890");
    /// ```
    PharmacyId,
    "Pharmacy ID"
);

string_id!(
    /// Claim identifier, unique within a load batch
    ClaimId,
    "Claim ID"
);

string_id!(
    /// Revert (rollback) identifier
    RevertId,
    "Revert ID"
);

string_id!(
    /// Drug product identifier (the NDC in upstream feeds)
    DrugProductId,
    "Drug product ID"
);
