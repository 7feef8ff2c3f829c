//! DHCP packet encoding and decoding
//!
//! This library maps between a typed DHCP message and its exact on-wire
//! layout (RFC 2131/2132): the fixed BOOTP header, the magic cookie and the
//! TLV option list. It performs no I/O and carries no client or server
//! logic, so it can back any DHCP implementation.

pub mod dump;
pub mod error;
pub mod hwaddr;
pub mod message_type;
pub mod option;
pub mod packet;

pub use error::{CodecError, Result};
pub use hwaddr::HardwareAddress;
pub use message_type::MessageType;
pub use option::{code, OptionTable, MAGIC_COOKIE};
pub use packet::{Packet, PacketConfig, WordOrder};
