use dhcp_codec::{PacketConfig, WordOrder};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Client configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Local address the client socket binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Where DISCOVER, REQUEST and RELEASE are sent
    #[serde(default = "default_server_address")]
    pub server_address: SocketAddr,

    /// Byte order of the secs and flags fields
    #[serde(default)]
    pub word_order: WordOrder,

    /// Release the lease once it has been acknowledged
    #[serde(default = "default_release")]
    pub release: bool,

    /// Header fields for outgoing packets
    #[serde(default)]
    pub packet: PacketConfig,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 68))
}

fn default_server_address() -> SocketAddr {
    SocketAddr::from(([255, 255, 255, 255], 67))
}

fn default_release() -> bool {
    true
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            server_address: default_server_address(),
            word_order: WordOrder::default(),
            release: default_release(),
            packet: PacketConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.bind_address.port(), 68);
        assert_eq!(
            config.server_address,
            "255.255.255.255:67".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.word_order, WordOrder::Network);
        assert!(config.release);
        assert_eq!(config.packet, PacketConfig::default());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.bind_address, default_bind_address());
        assert!(config.release);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
bind_address: 127.0.0.1:6868
server_address: 192.168.1.1:67
word_order: host
release: false
packet:
  chaddr: E81BFDE12F00
  xid: 42
  giaddr: 10.0.0.1
"#;
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bind_address.port(), 6868);
        assert_eq!(config.server_address.port(), 67);
        assert_eq!(config.word_order, WordOrder::Host);
        assert!(!config.release);
        assert_eq!(config.packet.chaddr.as_deref(), Some("E81BFDE12F00"));
        assert_eq!(config.packet.xid, Some(42));
        assert_eq!(config.packet.giaddr, Some(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(ClientConfig::from_file("/nonexistent/dhcp-client.yaml").is_err());
    }
}
