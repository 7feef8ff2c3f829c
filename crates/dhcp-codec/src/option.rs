use crate::{CodecError, MessageType, Result};
use std::net::Ipv4Addr;
use tracing::debug;

/// DHCP magic cookie (RFC 2131 section 3)
pub const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Largest value a single-byte length prefix can describe
pub const MAX_OPTION_LEN: usize = 255;

/// Well-known option codes (RFC 2132)
pub mod code {
    pub const PAD: u8 = 0x00;
    pub const SUBNET_MASK: u8 = 0x01;
    pub const GATEWAY_ADDRESS: u8 = 0x03;
    pub const DNS_SERVER: u8 = 0x06;
    pub const HOSTNAME: u8 = 0x0c;
    pub const DOMAIN: u8 = 0x0f;
    pub const REQUEST_IP: u8 = 0x32;
    pub const LEASE_TIME: u8 = 0x33;
    pub const MESSAGE_TYPE: u8 = 0x35;
    pub const SERVER_IP: u8 = 0x36;
    pub const PARAMETERS: u8 = 0x37;
    pub const RENEW: u8 = 0x3a;
    pub const REBIND: u8 = 0x3b;
    pub const CLASS_ID: u8 = 0x3c;
    pub const CLIENT_ID: u8 = 0x3d;
    pub const RESERVED: u8 = 0xfb;
    pub const END: u8 = 0xff;

    /// Display name of an option code, if it is one of the constants above
    pub fn name(code: u8) -> Option<&'static str> {
        let name = match code {
            PAD => "pad",
            SUBNET_MASK => "subnet mask",
            GATEWAY_ADDRESS => "router",
            DNS_SERVER => "dns server",
            HOSTNAME => "hostname",
            DOMAIN => "domain name",
            REQUEST_IP => "requested ip",
            LEASE_TIME => "lease time",
            MESSAGE_TYPE => "message type",
            SERVER_IP => "server identifier",
            PARAMETERS => "parameter request list",
            RENEW => "renewal time",
            REBIND => "rebinding time",
            CLASS_ID => "vendor class id",
            CLIENT_ID => "client id",
            RESERVED => "reserved",
            END => "end",
            _ => return None,
        };
        Some(name)
    }
}

/// The options section of a DHCP packet
///
/// Entries keep insertion order, and re-setting a code replaces its value in
/// place. That order is what `to_bytes` emits, but peers must not rely on
/// any option ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionTable {
    entries: Vec<(u8, Vec<u8>)>,
}

impl OptionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or overwrite the value for `code`
    ///
    /// Code 255 and values longer than 255 bytes cannot be encoded and are
    /// rejected here, so a table never holds an entry `to_bytes` can't write.
    pub fn set(&mut self, code: u8, value: impl Into<Vec<u8>>) -> Result<()> {
        let value = value.into();
        if code == code::END {
            return Err(CodecError::ReservedOptionCode);
        }
        if value.len() > MAX_OPTION_LEN {
            return Err(CodecError::OptionTooLarge {
                code,
                len: value.len(),
            });
        }

        self.insert_unchecked(code, value);
        Ok(())
    }

    /// Value stored for `code`, if any
    pub fn get(&self, code: u8) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, v)| v.as_slice())
    }

    /// Remove `code` and return its value
    pub fn remove(&mut self, code: u8) -> Option<Vec<u8>> {
        let index = self.entries.iter().position(|(c, _)| *c == code)?;
        Some(self.entries.remove(index).1)
    }

    /// True if `code` has a value
    pub fn contains(&self, code: u8) -> bool {
        self.get(code).is_some()
    }

    /// Number of stored options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no option is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options as `(code, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> {
        self.entries.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Message type option, when present and one byte long
    pub fn message_type(&self) -> Option<MessageType> {
        match self.get(code::MESSAGE_TYPE)? {
            [value] => MessageType::from_u8(*value),
            _ => None,
        }
    }

    /// Set the message type option
    pub fn set_message_type(&mut self, mt: MessageType) {
        self.insert_unchecked(code::MESSAGE_TYPE, vec![mt.to_u8()]);
    }

    /// Address-valued option, when present and exactly four bytes long
    pub fn ipv4(&self, code: u8) -> Option<Ipv4Addr> {
        let value: [u8; 4] = self.get(code)?.try_into().ok()?;
        Some(Ipv4Addr::from(value))
    }

    /// Store an address-valued option
    pub fn set_ipv4(&mut self, code: u8, addr: Ipv4Addr) -> Result<()> {
        self.set(code, addr.octets().to_vec())
    }

    // Only for values known to be short and codes known not to be END.
    fn insert_unchecked(&mut self, code: u8, value: Vec<u8>) {
        debug_assert!(code != code::END && value.len() <= MAX_OPTION_LEN);
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((code, value)),
        }
    }

    /// Serialize as magic cookie, TLV entries, end marker
    pub fn to_bytes(&self) -> Vec<u8> {
        let body: usize = self.entries.iter().map(|(_, v)| 2 + v.len()).sum();
        let mut bytes = Vec::with_capacity(MAGIC_COOKIE.len() + body + 1);

        bytes.extend_from_slice(&MAGIC_COOKIE);
        for (code, value) in &self.entries {
            bytes.push(*code);
            bytes.push(value.len() as u8);
            bytes.extend_from_slice(value);
        }
        bytes.push(code::END);

        bytes
    }

    /// Parse a cookie-prefixed TLV stream
    ///
    /// The cookie is skipped without being checked. Parsing stops at the end
    /// marker or at the end of the buffer; a TLV cut short by the buffer end
    /// is an error.
    ///
    /// Code 0 is read as an ordinary `[code][len][value]` entry, not as the
    /// one-byte pad of RFC 2132. A pad byte placed before the end marker
    /// therefore swallows the following byte as its length.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MAGIC_COOKIE.len() {
            return Err(CodecError::Truncated {
                len: data.len(),
                expected: MAGIC_COOKIE.len(),
            });
        }

        let mut table = Self::new();
        let mut i = MAGIC_COOKIE.len();
        while i < data.len() {
            let option_code = data[i];
            if option_code == code::END {
                break;
            }

            if i + 1 >= data.len() {
                return Err(CodecError::TruncatedOption {
                    code: option_code,
                    offset: i,
                    needed: 2,
                    available: data.len() - i,
                });
            }

            let option_len = data[i + 1] as usize;
            let start = i + 2;
            if start + option_len > data.len() {
                return Err(CodecError::TruncatedOption {
                    code: option_code,
                    offset: i,
                    needed: 2 + option_len,
                    available: data.len() - i,
                });
            }

            if table.contains(option_code) {
                debug!("Option {} repeated at offset {}, keeping the last value", option_code, i);
            }
            table.insert_unchecked(option_code, data[start..start + option_len].to_vec());

            i = start + option_len;
        }

        Ok(table)
    }
}
