//! UDP sink.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;

use crate::error::{SinkError, TransportError};
use crate::sink::{Emission, Sink, SinkKind};

/// Sends every unit as one UDP datagram to a fixed destination.
///
/// Delivery is best effort: no acknowledgement, ordering or retransmission.
/// The socket is bound once and closed when the sink is dropped.
#[derive(Debug)]
pub struct RemoteSink {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl RemoteSink {
    /// Resolve `host:port` and bind an ephemeral socket of the same family.
    pub fn connect(host: &str, port: u16) -> Result<Self, SinkError> {
        let endpoint = format!("{host}:{port}");
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|source| SinkError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?
            .next()
            .ok_or(SinkError::NoAddress { endpoint })?;

        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).map_err(|source| SinkError::Bind {
            addr: bind_addr,
            source,
        })?;

        debug!(%addr, "Remote sink ready");
        Ok(Self { socket, addr })
    }

    /// Destination address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Address the sending socket is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Sink for RemoteSink {
    fn emit(&mut self, emission: Emission<'_>) -> Result<(), TransportError> {
        let payload = emission.datagram();
        let sent = self
            .socket
            .send_to(&payload, self.addr)
            .map_err(|e| TransportError::io(self.kind(), e))?;
        if sent != payload.len() {
            return Err(TransportError::Truncated {
                addr: self.addr,
                sent,
                len: payload.len(),
            });
        }
        Ok(())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Remote { addr: self.addr }
    }
}
