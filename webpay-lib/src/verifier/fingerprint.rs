//! SHA-256 signing-certificate fingerprints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::errors::ManifestKind;
use crate::WebPayError;

/// SHA-256 digest of an app signing certificate.
///
/// Wire form is 32 colon-separated hex pairs, e.g. `"79:5C:8E:..."`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Fingerprint of a DER-encoded signing certificate.
    pub fn of_certificate(certificate: &[u8]) -> Self {
        Self(Sha256::digest(certificate).into())
    }

    /// Parse the colon-separated hex form. Either hex case is accepted.
    pub fn from_colon_hex(value: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        let mut parts = value.split(':');
        for slot in bytes.iter_mut() {
            let part = parts.next()?;
            if part.len() != 2 {
                return None;
            }
            let decoded = hex::decode(part).ok()?;
            *slot = decoded[0];
        }
        if parts.next().is_some() {
            return None;
        }
        Some(Self(bytes))
    }

    /// Uppercase colon-separated hex form.
    pub fn to_colon_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_colon_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_colon_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = WebPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_colon_hex(s).ok_or_else(|| {
            WebPayError::parse(
                ManifestKind::WebApp,
                format!("{s:?} is not 32 colon-separated hex bytes"),
            )
        })
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_colon_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
