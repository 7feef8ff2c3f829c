use crate::hwaddr::CHADDR_LEN;
use crate::option::{code, MAGIC_COOKIE};
use crate::{CodecError, HardwareAddress, MessageType, OptionTable, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

pub const BOOTREQUEST: u8 = 1;
pub const BOOTREPLY: u8 = 2;

/// Hardware type for 10Mb Ethernet (RFC 1700)
pub const HTYPE_ETHERNET: u8 = 1;

pub const SNAME_LEN: usize = 64;
pub const FILE_LEN: usize = 128;

/// Bytes before the magic cookie
pub const FIXED_LEN: usize = 236;
/// Fixed header including the magic cookie
pub const HEADER_LEN: usize = FIXED_LEN + MAGIC_COOKIE.len();

/// Vendor class identifier sent by the message factories
pub const VENDOR_CLASS_ID: &[u8] = b"MSFT 5.0";

const CHADDR_OFFSET: usize = 28;
const SNAME_OFFSET: usize = CHADDR_OFFSET + CHADDR_LEN;
const FILE_OFFSET: usize = SNAME_OFFSET + SNAME_LEN;

/// Byte order used for the 16-bit `secs` and `flags` fields
///
/// RFC 2131 mandates network order. `Host` writes the machine's native
/// order and only exists for byte-for-byte comparison with encoders that
/// do so.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordOrder {
    #[default]
    Network,
    Host,
}

impl WordOrder {
    fn encode(self, value: u16) -> [u8; 2] {
        match self {
            Self::Network => value.to_be_bytes(),
            Self::Host => value.to_ne_bytes(),
        }
    }

    fn decode(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Network => u16::from_be_bytes(bytes),
            Self::Host => u16::from_ne_bytes(bytes),
        }
    }
}

/// Construction parameters for a [`Packet`], every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketConfig {
    pub op: Option<u8>,
    pub htype: Option<u8>,
    pub hlen: Option<u8>,
    pub hops: Option<u8>,
    pub xid: Option<u32>,
    pub secs: Option<u16>,
    pub flags: Option<u16>,
    pub ciaddr: Option<Ipv4Addr>,
    pub yiaddr: Option<Ipv4Addr>,
    pub siaddr: Option<Ipv4Addr>,
    pub giaddr: Option<Ipv4Addr>,
    /// Hex string, e.g. `E81BFDE12F00`
    pub chaddr: Option<String>,
    pub sname: Option<String>,
    pub file: Option<String>,
}

/// DHCP packet structure as defined in RFC 2131
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub op: u8,                    // Message op code / message type
    pub htype: u8,                 // Hardware address type
    pub hlen: u8,                  // Hardware address length
    pub hops: u8,                  // Client sets to zero
    pub xid: u32,                  // Transaction ID, big-endian on the wire
    pub secs: u16,                 // Seconds elapsed
    pub flags: u16,                // Flags
    pub ciaddr: Ipv4Addr,          // Client IP address
    pub yiaddr: Ipv4Addr,          // 'Your' (client) IP address
    pub siaddr: Ipv4Addr,          // Server IP address
    pub giaddr: Ipv4Addr,          // Gateway IP address
    pub chaddr: HardwareAddress,   // Client hardware address
    pub sname: String,             // Server host name
    pub file: String,              // Boot file name
    pub options: OptionTable,
}

impl Packet {
    /// Build a packet from `config`, filling unset fields with defaults
    ///
    /// `xid` and `chaddr` are random when not given. A given `chaddr` must be
    /// exactly `hlen` bytes long. Callers that match replies against requests
    /// should pass `xid` explicitly or read it back from the returned packet.
    pub fn new(config: &PacketConfig) -> Result<Self> {
        let hlen = config.hlen.unwrap_or(6);
        if hlen as usize > CHADDR_LEN {
            return Err(CodecError::InvalidHardwareLength(hlen));
        }

        let chaddr = match &config.chaddr {
            Some(hex) => HardwareAddress::from_hex(hex)?,
            None => HardwareAddress::random(hlen as usize),
        };
        if chaddr.len() > hlen as usize {
            return Err(CodecError::HardwareAddressTooLarge {
                len: chaddr.len(),
                hlen,
            });
        }
        if chaddr.len() < hlen as usize {
            return Err(CodecError::HardwareAddressLengthMismatch {
                len: chaddr.len(),
                hlen,
            });
        }

        Ok(Self {
            op: config.op.unwrap_or(BOOTREQUEST),
            htype: config.htype.unwrap_or(HTYPE_ETHERNET),
            hlen,
            hops: config.hops.unwrap_or(0),
            xid: config.xid.unwrap_or_else(rand::random),
            secs: config.secs.unwrap_or(0),
            flags: config.flags.unwrap_or(0),
            ciaddr: config.ciaddr.unwrap_or(Ipv4Addr::UNSPECIFIED),
            yiaddr: config.yiaddr.unwrap_or(Ipv4Addr::UNSPECIFIED),
            siaddr: config.siaddr.unwrap_or(Ipv4Addr::UNSPECIFIED),
            giaddr: config.giaddr.unwrap_or(Ipv4Addr::UNSPECIFIED),
            chaddr,
            sname: config.sname.clone().unwrap_or_default(),
            file: config.file.clone().unwrap_or_default(),
            options: OptionTable::new(),
        })
    }

    /// Build a DHCPDISCOVER carrying the vendor class id
    pub fn discover(config: &PacketConfig) -> Result<Self> {
        Self::with_message_type(config, MessageType::Discover)
    }

    /// Build a DHCPREQUEST carrying the vendor class id
    pub fn request(config: &PacketConfig) -> Result<Self> {
        Self::with_message_type(config, MessageType::Request)
    }

    /// Build a DHCPDECLINE carrying the vendor class id
    pub fn decline(config: &PacketConfig) -> Result<Self> {
        Self::with_message_type(config, MessageType::Decline)
    }

    /// Build a DHCPRELEASE carrying the vendor class id
    pub fn release(config: &PacketConfig) -> Result<Self> {
        Self::with_message_type(config, MessageType::Release)
    }

    fn with_message_type(config: &PacketConfig, mt: MessageType) -> Result<Self> {
        let mut packet = Self::new(config)?;
        packet.options.set_message_type(mt);
        packet.options.set(code::CLASS_ID, VENDOR_CLASS_ID)?;
        Ok(packet)
    }

    /// The transaction id as its four wire bytes
    pub fn xid_bytes(&self) -> [u8; 4] {
        self.xid.to_be_bytes()
    }

    /// True if this packet is a server reply in the same transaction as `request`
    pub fn is_reply_to(&self, request: &Packet) -> bool {
        self.op == BOOTREPLY && self.xid == request.xid
    }

    /// Get the message type from the options
    pub fn message_type(&self) -> Option<MessageType> {
        self.options.message_type()
    }

    /// Raw value of option `code`, if present
    pub fn option(&self, code: u8) -> Option<&[u8]> {
        self.options.get(code)
    }

    /// Store or overwrite option `code`
    pub fn set_option(&mut self, code: u8, value: impl Into<Vec<u8>>) -> Result<()> {
        self.options.set(code, value)
    }

    /// Serialize the packet with `secs` and `flags` in network order
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(WordOrder::Network)
    }

    /// Serialize the packet with `secs` and `flags` in the given order
    pub fn to_bytes_with(&self, order: WordOrder) -> Result<Vec<u8>> {
        if self.hlen as usize > CHADDR_LEN {
            return Err(CodecError::InvalidHardwareLength(self.hlen));
        }
        if self.chaddr.len() > self.hlen as usize {
            return Err(CodecError::HardwareAddressTooLarge {
                len: self.chaddr.len(),
                hlen: self.hlen,
            });
        }

        let options = self.options.to_bytes();
        let mut bytes = Vec::with_capacity(FIXED_LEN + options.len());
        bytes.resize(FIXED_LEN, 0);

        bytes[0] = self.op;
        bytes[1] = self.htype;
        bytes[2] = self.hlen;
        bytes[3] = self.hops;

        bytes[4..8].copy_from_slice(&self.xid.to_be_bytes());
        bytes[8..10].copy_from_slice(&order.encode(self.secs));
        bytes[10..12].copy_from_slice(&order.encode(self.flags));

        bytes[12..16].copy_from_slice(&self.ciaddr.octets());
        bytes[16..20].copy_from_slice(&self.yiaddr.octets());
        bytes[20..24].copy_from_slice(&self.siaddr.octets());
        bytes[24..28].copy_from_slice(&self.giaddr.octets());

        bytes[CHADDR_OFFSET..SNAME_OFFSET].copy_from_slice(&self.chaddr.to_field());
        write_str_field(&mut bytes[SNAME_OFFSET..FILE_OFFSET], &self.sname);
        write_str_field(&mut bytes[FILE_OFFSET..FIXED_LEN], &self.file);

        // Magic cookie, options and end marker
        bytes.extend_from_slice(&options);

        Ok(bytes)
    }

    /// Parse a packet received with `secs` and `flags` in network order
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(data, WordOrder::Network)
    }

    /// Parse a packet whose `secs` and `flags` use the given order
    pub fn parse_with(data: &[u8], order: WordOrder) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::Truncated {
                len: data.len(),
                expected: HEADER_LEN,
            });
        }

        let hlen = data[2];
        if hlen as usize > CHADDR_LEN {
            return Err(CodecError::InvalidHardwareLength(hlen));
        }
        let chaddr = HardwareAddress::from_bytes(&data[CHADDR_OFFSET..CHADDR_OFFSET + hlen as usize])?;

        let options = OptionTable::parse(&data[FIXED_LEN..])?;

        Ok(Self {
            op: data[0],
            htype: data[1],
            hlen,
            hops: data[3],
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            secs: order.decode([data[8], data[9]]),
            flags: order.decode([data[10], data[11]]),
            ciaddr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            yiaddr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            siaddr: Ipv4Addr::new(data[20], data[21], data[22], data[23]),
            giaddr: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
            chaddr,
            sname: read_str_field(&data[SNAME_OFFSET..FILE_OFFSET]),
            file: read_str_field(&data[FILE_OFFSET..FIXED_LEN]),
            options,
        })
    }
}

/// Copy `value` into a NUL-padded field, truncating to the field width
fn write_str_field(field: &mut [u8], value: &str) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value.as_bytes()[..len]);
}

fn read_str_field(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
