use dhcp_codec::{CodecError, Packet, WordOrder};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram the client accepts
const MAX_DATAGRAM: usize = 1500;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode packet: {0}")]
    Encode(#[source] CodecError),

    #[error("discarding datagram from {from}: {source}")]
    Malformed {
        from: SocketAddr,
        #[source]
        source: CodecError,
    },
}

/// UDP socket exchanging whole DHCP packets with one server address
pub struct Transport {
    socket: UdpSocket,
    server: SocketAddr,
    order: WordOrder,
}

impl Transport {
    pub async fn bind(
        local: SocketAddr,
        server: SocketAddr,
        order: WordOrder,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(local).await?;
        socket.set_broadcast(true)?;
        debug!("Client socket bound to {}", socket.local_addr()?);

        Ok(Self {
            socket,
            server,
            order,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn send(&self, packet: &Packet) -> Result<(), TransportError> {
        let bytes = packet
            .to_bytes_with(self.order)
            .map_err(TransportError::Encode)?;
        let sent = self.socket.send_to(&bytes, self.server).await?;
        debug!("Sent {} bytes to {}", sent, self.server);
        Ok(())
    }

    /// Receive one datagram and decode it
    pub async fn recv(&self) -> Result<(Packet, SocketAddr), TransportError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        debug!("Received {} bytes from {}", len, from);

        let packet = Packet::parse_with(&buf[..len], self.order)
            .map_err(|source| TransportError::Malformed { from, source })?;
        Ok((packet, from))
    }
}
