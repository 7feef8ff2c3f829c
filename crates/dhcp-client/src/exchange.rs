use crate::transport::{Transport, TransportError};
use dhcp_codec::{code, CodecError, MessageType, OptionTable, Packet, PacketConfig};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("server {server} refused {address} (NAK)")]
    Refused { server: Ipv4Addr, address: Ipv4Addr },

    #[error("offer from {0} carries no address")]
    EmptyOffer(SocketAddr),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Configuration granted by the server's ACK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub address: Ipv4Addr,
    pub server: Ipv4Addr,
    pub subnet_mask: Option<Ipv4Addr>,
    pub routers: Vec<Ipv4Addr>,
    pub dns_servers: Vec<Ipv4Addr>,
    pub domain: Option<String>,
    pub lease_time: Option<u32>,
}

impl Lease {
    fn from_ack(ack: &Packet, server: Ipv4Addr) -> Self {
        let options = &ack.options;
        Self {
            address: ack.yiaddr,
            server,
            subnet_mask: options.ipv4(code::SUBNET_MASK),
            routers: address_list(options, code::GATEWAY_ADDRESS),
            dns_servers: address_list(options, code::DNS_SERVER),
            domain: options
                .get(code::DOMAIN)
                .map(|d| String::from_utf8_lossy(d).into_owned()),
            lease_time: options
                .get(code::LEASE_TIME)
                .and_then(|v| <[u8; 4]>::try_from(v).ok())
                .map(u32::from_be_bytes),
        }
    }
}

impl fmt::Display for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.address, self.server)?;
        if let Some(mask) = self.subnet_mask {
            write!(f, ", mask {}", mask)?;
        }
        if !self.routers.is_empty() {
            write!(f, ", routers {:?}", self.routers)?;
        }
        if !self.dns_servers.is_empty() {
            write!(f, ", dns {:?}", self.dns_servers)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, ", domain {}", domain)?;
        }
        if let Some(secs) = self.lease_time {
            write!(f, ", {}s", secs)?;
        }
        Ok(())
    }
}

fn address_list(options: &OptionTable, code: u8) -> Vec<Ipv4Addr> {
    options
        .get(code)
        .map(|value| {
            value
                .chunks_exact(4)
                .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]))
                .collect()
        })
        .unwrap_or_default()
}

/// One DISCOVER, OFFER, REQUEST, ACK and optional RELEASE sequence
///
/// Replies are matched to the outstanding request by xid. There is no
/// retransmission: if the server never answers, `run` waits forever.
pub struct Exchange {
    transport: Transport,
    packet: PacketConfig,
    release: bool,
    dump: bool,
}

impl Exchange {
    pub fn new(transport: Transport, packet: PacketConfig) -> Self {
        Self {
            transport,
            packet,
            release: true,
            dump: false,
        }
    }

    pub fn with_release(mut self, release: bool) -> Self {
        self.release = release;
        self
    }

    /// Log every packet sent and received in full
    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    pub async fn run(&self) -> Result<Lease, ExchangeError> {
        let mut config = self.packet.clone();

        let discover = Packet::discover(&config)?;
        // Keep the same identity for the rest of the exchange
        config.xid = Some(discover.xid);
        config.chaddr = Some(discover.chaddr.to_hex());

        self.send(&discover).await?;
        let (offer, from) = self.wait_for(&discover, &[MessageType::Offer]).await?;
        if offer.yiaddr.is_unspecified() {
            return Err(ExchangeError::EmptyOffer(from));
        }

        let server = offer
            .options
            .ipv4(code::SERVER_IP)
            .unwrap_or_else(|| source_ip(from, offer.siaddr));
        info!("Offered {} by {}", offer.yiaddr, server);

        let mut request = Packet::request(&config)?;
        request.options.set_ipv4(code::REQUEST_IP, offer.yiaddr)?;
        request.options.set_ipv4(code::SERVER_IP, server)?;

        self.send(&request).await?;
        let (ack, _) = self
            .wait_for(&request, &[MessageType::Ack, MessageType::Nak])
            .await?;
        if ack.message_type() == Some(MessageType::Nak) {
            return Err(ExchangeError::Refused {
                server,
                address: offer.yiaddr,
            });
        }

        let lease = Lease::from_ack(&ack, server);
        info!("Lease acknowledged: {}", lease);

        if self.release {
            let release_config = PacketConfig {
                xid: None,
                ciaddr: Some(lease.address),
                ..config
            };
            let mut release = Packet::release(&release_config)?;
            release.options.set_ipv4(code::SERVER_IP, server)?;
            self.send(&release).await?;
            info!("Released {}", lease.address);
        }

        Ok(lease)
    }

    async fn send(&self, packet: &Packet) -> Result<(), ExchangeError> {
        let mt = packet
            .message_type()
            .map(|mt| mt.name())
            .unwrap_or("BOOTP");
        info!("Sending {} xid={:#010x} chaddr={}", mt, packet.xid, packet.chaddr);
        if self.dump {
            info!("\n{}", packet);
        }
        self.transport.send(packet).await?;
        Ok(())
    }

    /// Receive until a reply to `request` of an accepted type arrives
    async fn wait_for(
        &self,
        request: &Packet,
        accepted: &[MessageType],
    ) -> Result<(Packet, SocketAddr), ExchangeError> {
        loop {
            let (packet, from) = match self.transport.recv().await {
                Ok(received) => received,
                Err(err @ TransportError::Malformed { .. }) => {
                    warn!("{}", err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if !packet.is_reply_to(request) {
                debug!(
                    "Ignoring packet from {} with xid {:#010x} (waiting for {:#010x})",
                    from, packet.xid, request.xid
                );
                continue;
            }

            match packet.message_type() {
                Some(mt) if accepted.contains(&mt) => {
                    info!("Received {} from {}", mt, from);
                    if self.dump {
                        info!("\n{}", packet);
                    }
                    return Ok((packet, from));
                }
                other => {
                    debug!("Ignoring {:?} reply from {}", other, from);
                }
            }
        }
    }
}

fn source_ip(from: SocketAddr, fallback: Ipv4Addr) -> Ipv4Addr {
    match from.ip() {
        IpAddr::V4(ip) => ip,
        IpAddr::V6(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use dhcp_codec::WordOrder;

    async fn client_for(server: SocketAddr) -> Transport {
        Transport::bind("127.0.0.1:0".parse().unwrap(), server, WordOrder::Network)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_exchange() {
        let mut server = spawn_fake_server(Behaviour::Grant).await;
        let config = PacketConfig {
            chaddr: Some("E81BFDE12F00".to_string()),
            xid: Some(0x0BADCAFE),
            ..Default::default()
        };

        let exchange = Exchange::new(client_for(server.addr).await, config);
        let lease = exchange.run().await.unwrap();

        assert_eq!(lease.address, OFFERED_IP);
        assert_eq!(lease.server, SERVER_ID);
        assert_eq!(lease.subnet_mask, Some(Ipv4Addr::new(255, 255, 255, 0)));
        assert_eq!(lease.routers, vec![Ipv4Addr::new(192, 168, 1, 1)]);
        assert_eq!(
            lease.dns_servers,
            vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)]
        );
        assert_eq!(lease.domain.as_deref(), Some("test.local"));
        assert_eq!(lease.lease_time, Some(86400));

        let discover = server.seen.recv().await.unwrap();
        assert_eq!(discover.message_type(), Some(MessageType::Discover));
        assert_eq!(discover.xid, 0x0BADCAFE);
        assert_eq!(discover.chaddr.to_hex(), "E81BFDE12F00");

        let request = server.seen.recv().await.unwrap();
        assert_eq!(request.message_type(), Some(MessageType::Request));
        assert_eq!(request.xid, 0x0BADCAFE);
        assert_eq!(request.options.ipv4(code::REQUEST_IP), Some(OFFERED_IP));
        assert_eq!(request.options.ipv4(code::SERVER_IP), Some(SERVER_ID));

        let release = server.seen.recv().await.unwrap();
        assert_eq!(release.message_type(), Some(MessageType::Release));
        assert_eq!(release.ciaddr, OFFERED_IP);
        assert_eq!(release.chaddr.to_hex(), "E81BFDE12F00");
        assert_eq!(release.option(code::CLASS_ID), Some(&b"MSFT 5.0"[..]));
    }

    #[tokio::test]
    async fn test_exchange_skips_noise() {
        let mut server = spawn_fake_server(Behaviour::Noisy).await;

        let exchange = Exchange::new(client_for(server.addr).await, PacketConfig::default())
            .with_release(false);
        let lease = exchange.run().await.unwrap();
        assert_eq!(lease.address, OFFERED_IP);

        let discover = server.seen.recv().await.unwrap();
        let request = server.seen.recv().await.unwrap();
        assert_eq!(request.xid, discover.xid);
        assert_eq!(request.chaddr, discover.chaddr);
    }

    #[tokio::test]
    async fn test_exchange_refused() {
        let server = spawn_fake_server(Behaviour::Refuse).await;

        let exchange = Exchange::new(client_for(server.addr).await, PacketConfig::default());
        match exchange.run().await {
            Err(ExchangeError::Refused { server, address }) => {
                assert_eq!(server, SERVER_ID);
                assert_eq!(address, OFFERED_IP);
            }
            other => panic!("expected NAK, got {:?}", other),
        }
    }

    #[test]
    fn test_lease_from_minimal_ack() {
        let mut ack = Packet::new(&PacketConfig {
            yiaddr: Some(OFFERED_IP),
            ..Default::default()
        })
        .unwrap();
        ack.options.set_message_type(MessageType::Ack);
        ack.set_option(code::LEASE_TIME, vec![0, 0]).unwrap();

        let lease = Lease::from_ack(&ack, SERVER_ID);
        assert_eq!(lease.address, OFFERED_IP);
        assert_eq!(lease.subnet_mask, None);
        assert!(lease.routers.is_empty());
        assert_eq!(lease.lease_time, None);
        assert_eq!(lease.to_string(), "192.168.1.50 from 192.168.1.1");
    }
}
