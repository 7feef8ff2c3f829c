//! Human-readable rendering of packets for logs
//!
//! The output is meant for people and may change between versions.

use crate::option::code;
use crate::{MessageType, OptionTable, Packet};
use std::fmt;
use std::net::Ipv4Addr;

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            crate::packet::BOOTREQUEST => "BOOTREQUEST",
            crate::packet::BOOTREPLY => "BOOTREPLY",
            _ => "unknown",
        };
        writeln!(f, "op:     {} ({})", self.op, op)?;
        writeln!(f, "htype:  {}", self.htype)?;
        writeln!(f, "hlen:   {}", self.hlen)?;
        writeln!(f, "hops:   {}", self.hops)?;
        writeln!(f, "xid:    {:#010x}", self.xid)?;
        writeln!(f, "secs:   {}", self.secs)?;
        writeln!(f, "flags:  {:#06x}", self.flags)?;
        writeln!(f, "ciaddr: {}", self.ciaddr)?;
        writeln!(f, "yiaddr: {}", self.yiaddr)?;
        writeln!(f, "siaddr: {}", self.siaddr)?;
        writeln!(f, "giaddr: {}", self.giaddr)?;
        writeln!(f, "chaddr: {}", self.chaddr)?;
        writeln!(f, "sname:  {:?}", self.sname)?;
        writeln!(f, "file:   {:?}", self.file)?;
        write!(f, "{}", self.options)
    }
}

impl fmt::Display for OptionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "options: {}", self.len())?;
        for (option_code, value) in self.iter() {
            match code::name(option_code) {
                Some(name) => write!(f, "  {:3} {:<22}", option_code, name)?,
                None => write!(f, "  {:3} {:<22}", option_code, format!("option {}", option_code))?,
            }
            write!(f, " {}", hex(value))?;
            if let Some(decoded) = decode(option_code, value) {
                write!(f, " ({})", decoded)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn hex(value: &[u8]) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    value
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode(option_code: u8, value: &[u8]) -> Option<String> {
    match option_code {
        code::MESSAGE_TYPE => match value {
            [mt] => MessageType::from_u8(*mt).map(|mt| mt.to_string()),
            _ => None,
        },
        code::SUBNET_MASK
        | code::GATEWAY_ADDRESS
        | code::DNS_SERVER
        | code::REQUEST_IP
        | code::SERVER_IP => addresses(value),
        code::LEASE_TIME | code::RENEW | code::REBIND => {
            let secs: [u8; 4] = value.try_into().ok()?;
            Some(format!("{}s", u32::from_be_bytes(secs)))
        }
        code::HOSTNAME | code::DOMAIN | code::CLASS_ID => {
            std::str::from_utf8(value).ok().map(|s| format!("{:?}", s))
        }
        _ => None,
    }
}

fn addresses(value: &[u8]) -> Option<String> {
    if value.is_empty() || value.len() % 4 != 0 {
        return None;
    }
    let list: Vec<String> = value
        .chunks_exact(4)
        .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]).to_string())
        .collect();
    Some(list.join(", "))
}
