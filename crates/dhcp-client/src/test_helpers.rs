use dhcp_codec::packet::BOOTREPLY;
use dhcp_codec::{code, MessageType, Packet, PacketConfig};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

pub const OFFERED_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 50);
pub const SERVER_ID: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Offer and acknowledge
    Grant,
    /// Offer, then NAK the request
    Refuse,
    /// Like `Grant`, but precede each reply with garbage and a stranger's reply
    Noisy,
}

/// A DHCP server on 127.0.0.1 answering a single client
pub struct FakeServer {
    pub addr: SocketAddr,
    /// Every well-formed packet the server received, in order
    pub seen: mpsc::UnboundedReceiver<Packet>,
}

pub async fn spawn_fake_server(behaviour: Behaviour) -> FakeServer {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let (tx, seen) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 1500];
        loop {
            let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                return;
            };
            let Ok(packet) = Packet::parse(&buf[..len]) else {
                continue;
            };

            let reply_type = match (packet.message_type(), behaviour) {
                (Some(MessageType::Discover), _) => Some(MessageType::Offer),
                (Some(MessageType::Request), Behaviour::Refuse) => Some(MessageType::Nak),
                (Some(MessageType::Request), _) => Some(MessageType::Ack),
                _ => None,
            };

            if let Some(reply_type) = reply_type {
                if behaviour == Behaviour::Noisy {
                    socket.send_to(&[0xFF; 12], from).await.unwrap();

                    let mut stranger = create_reply(&packet, reply_type);
                    stranger.xid = packet.xid.wrapping_add(1);
                    socket
                        .send_to(&stranger.to_bytes().unwrap(), from)
                        .await
                        .unwrap();
                }

                let reply = create_reply(&packet, reply_type);
                socket
                    .send_to(&reply.to_bytes().unwrap(), from)
                    .await
                    .unwrap();
            }

            if tx.send(packet).is_err() {
                return;
            }
        }
    });

    FakeServer { addr, seen }
}

/// Create a server reply to `request` carrying a typical subnet configuration
pub fn create_reply(request: &Packet, reply_type: MessageType) -> Packet {
    let config = PacketConfig {
        op: Some(BOOTREPLY),
        hlen: Some(request.hlen),
        xid: Some(request.xid),
        chaddr: Some(request.chaddr.to_hex()),
        yiaddr: (reply_type != MessageType::Nak).then_some(OFFERED_IP),
        siaddr: Some(SERVER_ID),
        ..Default::default()
    };

    let mut reply = Packet::new(&config).unwrap();
    reply.options.set_message_type(reply_type);
    reply.options.set_ipv4(code::SERVER_IP, SERVER_ID).unwrap();
    if reply_type != MessageType::Nak {
        reply
            .set_option(code::SUBNET_MASK, vec![255, 255, 255, 0])
            .unwrap();
        reply.set_option(code::GATEWAY_ADDRESS, vec![192, 168, 1, 1]).unwrap();
        reply
            .set_option(code::DNS_SERVER, vec![8, 8, 8, 8, 8, 8, 4, 4])
            .unwrap();
        reply.set_option(code::DOMAIN, "test.local").unwrap();
        reply
            .set_option(code::LEASE_TIME, 86400u32.to_be_bytes().to_vec())
            .unwrap();
    }
    reply
}
