use thiserror::Error;

/// Errors raised while encoding or decoding DHCP packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Fewer bytes than the fixed part being read requires
    #[error("malformed packet: {len} bytes, expected at least {expected}")]
    Truncated { len: usize, expected: usize },

    /// An option TLV runs past the end of the buffer
    #[error("malformed packet: option {code} at offset {offset} needs {needed} bytes, {available} left")]
    TruncatedOption {
        code: u8,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Hardware address length does not fit the 16-byte chaddr field
    #[error("malformed packet: hlen {0} exceeds the 16-byte chaddr field")]
    InvalidHardwareLength(u8),

    /// Option values are length-prefixed by a single byte
    #[error("value too large: option {code} is {len} bytes, maximum is 255")]
    OptionTooLarge { code: u8, len: usize },

    #[error("value too large: hardware address is {len} bytes but hlen is {hlen}")]
    HardwareAddressTooLarge { len: usize, hlen: u8 },

    /// A constructed chaddr must fill exactly `hlen` bytes
    #[error("hardware address is {len} bytes but hlen is {hlen}")]
    HardwareAddressLengthMismatch { len: usize, hlen: u8 },

    #[error("option code 255 is reserved for the end marker")]
    ReservedOptionCode,

    #[error("invalid hardware address: {0:?}")]
    InvalidHardwareAddress(String),
}

impl CodecError {
    /// True for errors caused by a short or inconsistent received buffer
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::TruncatedOption { .. } | Self::InvalidHardwareLength(_)
        )
    }

    /// True for errors caused by a field that cannot be represented on the wire
    pub fn is_too_large(&self) -> bool {
        matches!(
            self,
            Self::OptionTooLarge { .. } | Self::HardwareAddressTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(CodecError::Truncated { len: 10, expected: 240 }.is_malformed());
        assert!(CodecError::InvalidHardwareLength(17).is_malformed());
        assert!(!CodecError::ReservedOptionCode.is_malformed());

        let err = CodecError::OptionTooLarge { code: 12, len: 300 };
        assert!(err.is_too_large());
        assert!(!err.is_malformed());

        let err = CodecError::HardwareAddressLengthMismatch { len: 2, hlen: 6 };
        assert!(!err.is_too_large());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_error_messages() {
        let err = CodecError::Truncated { len: 100, expected: 240 };
        assert_eq!(
            err.to_string(),
            "malformed packet: 100 bytes, expected at least 240"
        );

        let err = CodecError::HardwareAddressTooLarge { len: 8, hlen: 6 };
        assert_eq!(
            err.to_string(),
            "value too large: hardware address is 8 bytes but hlen is 6"
        );
    }
}
