use std::fmt;

/// Value of the DHCP message type option (53), RFC 2132 section 9.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Discover = 1,
    Offer = 2,
    Request = 3,
    Decline = 4,
    Ack = 5,
    Nak = 6,
    Release = 7,
    Inform = 8,
}

impl MessageType {
    /// Convert to the option value
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse an option value, `None` if unknown
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Discover),
            2 => Some(Self::Offer),
            3 => Some(Self::Request),
            4 => Some(Self::Decline),
            5 => Some(Self::Ack),
            6 => Some(Self::Nak),
            7 => Some(Self::Release),
            8 => Some(Self::Inform),
            _ => None,
        }
    }

    /// Protocol name as written in RFC 2131 (DHCPDISCOVER without the prefix)
    pub fn name(self) -> &'static str {
        match self {
            Self::Discover => "DISCOVER",
            Self::Offer => "OFFER",
            Self::Request => "REQUEST",
            Self::Decline => "DECLINE",
            Self::Ack => "ACK",
            Self::Nak => "NAK",
            Self::Release => "RELEASE",
            Self::Inform => "INFORM",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(value)
    }
}

impl From<MessageType> for u8 {
    fn from(mt: MessageType) -> Self {
        mt.to_u8()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_values() {
        assert_eq!(MessageType::Discover.to_u8(), 1);
        assert_eq!(MessageType::Offer.to_u8(), 2);
        assert_eq!(MessageType::Request.to_u8(), 3);
        assert_eq!(MessageType::Decline.to_u8(), 4);
        assert_eq!(MessageType::Ack.to_u8(), 5);
        assert_eq!(MessageType::Nak.to_u8(), 6);
        assert_eq!(MessageType::Release.to_u8(), 7);
        assert_eq!(MessageType::Inform.to_u8(), 8);
    }

    #[test]
    fn test_message_type_try_from() {
        assert_eq!(MessageType::try_from(5), Ok(MessageType::Ack));
        assert_eq!(MessageType::try_from(0), Err(0));
        assert_eq!(MessageType::try_from(9), Err(9));
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::Nak.to_string(), "NAK");
        assert_eq!(u8::from(MessageType::Release), 7);
    }
}
