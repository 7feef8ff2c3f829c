use crate::{CodecError, Result};
use std::fmt;
use std::str::FromStr;

/// Width of the chaddr field in the BOOTP header
pub const CHADDR_LEN: usize = 16;

/// Client hardware address, 0 to 16 raw bytes
///
/// The textual form is an uppercase hex string without separators, e.g.
/// `E81BFDE12F00` for an Ethernet address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HardwareAddress(Vec<u8>);

impl HardwareAddress {
    /// Create a hardware address from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > CHADDR_LEN {
            return Err(CodecError::InvalidHardwareAddress(format!(
                "{} bytes, chaddr holds at most {}",
                bytes.len(),
                CHADDR_LEN
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Generate `len` random bytes (clamped to the chaddr width)
    pub fn random(len: usize) -> Self {
        Self((0..len.min(CHADDR_LEN)).map(|_| rand::random::<u8>()).collect())
    }

    /// Parse a hex string, optionally separated by `:` or `-`
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .bytes()
            .filter(|b| *b != b':' && *b != b'-')
            .collect();

        if digits.len() % 2 != 0 {
            return Err(CodecError::InvalidHardwareAddress(s.to_string()));
        }

        let mut bytes = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks_exact(2) {
            let pair =
                std::str::from_utf8(pair).map_err(|_| CodecError::InvalidHardwareAddress(s.to_string()))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| CodecError::InvalidHardwareAddress(s.to_string()))?;
            bytes.push(byte);
        }

        if bytes.len() > CHADDR_LEN {
            return Err(CodecError::InvalidHardwareAddress(s.to_string()));
        }

        Ok(Self(bytes))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of address bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length address
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex string without separators
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }

    /// Write the address into the 16-byte chaddr field, zero-padded
    pub(crate) fn to_field(&self) -> [u8; CHADDR_LEN] {
        let mut field = [0u8; CHADDR_LEN];
        field[..self.0.len()].copy_from_slice(&self.0);
        field
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for HardwareAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}
