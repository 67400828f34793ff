//! Actor identities.
//!
//! A principal is an opaque byte string of at most 29 bytes. Its textual form
//! is the lower-case base32 encoding (no padding) of a big-endian CRC32 of the
//! bytes followed by the bytes themselves, split into groups of five
//! characters joined by `-`.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of a principal in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const CHECKSUM_LEN: usize = 4;
const GROUP_LEN: usize = 5;

/// Errors raised when parsing a principal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// Byte representation exceeds the maximum length
    #[error("principal is {0} bytes long, maximum is 29")]
    TooLong(usize),

    /// Text is not valid base32
    #[error("invalid base32 in principal text: {0}")]
    InvalidBase32(String),

    /// Decoded text is shorter than the checksum
    #[error("principal text too short")]
    TooShort,

    /// Checksum does not match the payload
    #[error("principal checksum mismatch")]
    ChecksumMismatch,

    /// Text decodes but is not in canonical grouping
    #[error("principal text is not canonical, expected {expected}")]
    NotCanonical {
        /// Canonical form of the same principal
        expected: String,
    },
}

/// An actor identity on the registry's call surface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal {
    len: u8,
    bytes: [u8; MAX_PRINCIPAL_LEN],
}

impl Principal {
    /// The management principal (empty byte string).
    #[must_use]
    pub const fn management() -> Self {
        Self {
            len: 0,
            bytes: [0; MAX_PRINCIPAL_LEN],
        }
    }

    /// The anonymous principal (`[0x04]`).
    #[must_use]
    pub const fn anonymous() -> Self {
        let mut bytes = [0; MAX_PRINCIPAL_LEN];
        bytes[0] = 0x04;
        Self { len: 1, bytes }
    }

    /// Build a principal from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::TooLong`] if `slice` exceeds 29 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, PrincipalError> {
        if slice.len() > MAX_PRINCIPAL_LEN {
            return Err(PrincipalError::TooLong(slice.len()));
        }
        let mut bytes = [0; MAX_PRINCIPAL_LEN];
        bytes[..slice.len()].copy_from_slice(slice);
        Ok(Self {
            len: slice.len() as u8,
            bytes,
        })
    }

    /// Parse the textual representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid base32, carries a wrong
    /// checksum, or is not in canonical grouping.
    pub fn from_text(text: impl AsRef<str>) -> Result<Self, PrincipalError> {
        let text = text.as_ref();
        let compact: String = text
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let decoded = BASE32_NOPAD
            .decode(compact.as_bytes())
            .map_err(|e| PrincipalError::InvalidBase32(e.to_string()))?;
        if decoded.len() < CHECKSUM_LEN {
            return Err(PrincipalError::TooShort);
        }

        let (checksum, payload) = decoded.split_at(CHECKSUM_LEN);
        if checksum != crc32fast::hash(payload).to_be_bytes() {
            return Err(PrincipalError::ChecksumMismatch);
        }

        let principal = Self::try_from_slice(payload)?;
        let expected = principal.to_text();
        if expected != text {
            return Err(PrincipalError::NotCanonical { expected });
        }

        Ok(principal)
    }

    /// Render the textual representation.
    #[must_use]
    pub fn to_text(&self) -> String {
        let payload = self.as_slice();
        let mut raw = Vec::with_capacity(CHECKSUM_LEN + payload.len());
        raw.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
        raw.extend_from_slice(payload);

        let encoded = BASE32_NOPAD.encode(&raw).to_ascii_lowercase();
        encoded
            .as_bytes()
            .chunks(GROUP_LEN)
            .map(|chunk| String::from_utf8_lossy(chunk))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Raw bytes of the principal.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Whether this is the anonymous principal.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        *self == Self::anonymous()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(&text).map_err(serde::de::Error::custom)
    }
}
