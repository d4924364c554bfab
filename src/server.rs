use std::{io::ErrorKind::ConnectionReset, net::SocketAddr, sync::Arc};

use bytes::{Bytes, BytesMut};
use codec::{
    Attributes,
    message::{Message, MessageEncoder, attributes::XorMappedAddress, methods::*},
};
use tokio::net::UdpSocket;

use crate::{config::Config, delay::DelayPolicy};

/// udp binding server
///
/// Reads datagrams from the UDP socket, validates them as binding
/// requests and schedules the success response after the configured
/// artificial delay. Everything else arriving on the port is foreign
/// traffic and is dropped without a reply; answering it would turn the
/// server into an amplification oracle.
pub struct Server {
    socket: Arc<UdpSocket>,
    delay: DelayPolicy,
}

impl Server {
    pub async fn bind(config: &Config) -> anyhow::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(config.server.listen).await?);

        let delay = DelayPolicy::new(config.delay.base_ms, config.delay.jitter_ms);
        if delay.is_clamping() {
            log::warn!(
                "jitter-ms={} exceeds base-ms={}, negative delays are clamped to zero",
                config.delay.jitter_ms,
                config.delay.base_ms
            );
        }

        log::info!(
            "stun server listening: listen={}, base-ms={}, jitter-ms={}",
            socket.local_addr()?,
            config.delay.base_ms,
            config.delay.jitter_ms
        );

        Ok(Self { socket, delay })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Processes datagrams until the socket fails. Each accepted
    /// request runs the same linear path: validate, encode, schedule,
    /// send. Requests never share state, so responses to overlapping
    /// requests may legally reorder when their delays differ.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut attributes = Attributes::default();

        // binding requests carry no body worth reading, 1024 bytes is
        // plenty for the header plus any attributes clients send along
        let mut buffer = vec![0u8; 1024];

        loop {
            // Note: An error will also be reported when the remote host is
            // shut down, which is not processed yet, but a warning will be
            // issued.
            let (size, source) = match self.socket.recv_from(&mut buffer).await {
                Err(e) if e.kind() == ConnectionReset => continue,
                Err(e) => return Err(e.into()),
                Ok(it) => it,
            };

            let Some(response) = binding_response(&buffer[..size], source, &mut attributes) else {
                log::debug!("ignoring non-binding or invalid stun packet: source={source}");
                continue;
            };

            let wait = self.delay.next_delay();
            log::info!(
                "received binding request: source={source}, delay={}ms",
                wait.as_millis()
            );

            if wait.is_zero() {
                send(&self.socket, &response, source).await;
            } else {
                // the response buffer and the destination move into the
                // timer task and are released once the send finishes
                let socket = self.socket.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(wait).await;
                    send(&socket, &response, source).await;
                });
            }
        }
    }
}

async fn send(socket: &UdpSocket, response: &Bytes, target: SocketAddr) {
    if let Err(e) = socket.send_to(response, target).await {
        log::warn!("failed to send binding response: target={target}, error={e}");
    } else {
        log::debug!(
            "sent binding response: target={target}, size={}",
            response.len()
        );
    }
}

/// Validates a datagram as a binding request and assembles the success
/// response reporting the observed source address back to the sender.
/// Returns [`None`] for anything that is not a well-formed binding
/// request.
fn binding_response(
    bytes: &[u8],
    source: SocketAddr,
    attributes: &mut Attributes,
) -> Option<Bytes> {
    let message = Message::decode(bytes, attributes).ok()?;
    if message.method() != BINDING_REQUEST {
        return None;
    }

    let mut buffer = BytesMut::with_capacity(64);
    let mut response = MessageEncoder::extend(BINDING_RESPONSE, &message, &mut buffer);
    response.append::<XorMappedAddress>(source);
    response.flush();

    Some(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSACTION_ID: [u8; 12] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    ];

    #[rustfmt::skip]
    const REQUEST: [u8; 20] = [
        0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42,
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    ];

    #[test]
    fn responds_to_binding_request() {
        let source: SocketAddr = "192.0.2.1:12345".parse().unwrap();

        let mut attributes = Attributes::default();
        let response = binding_response(&REQUEST, source, &mut attributes).unwrap();

        #[rustfmt::skip]
        let expected: [u8; 32] = [
            0x01, 0x01, 0x00, 0x0c, 0x21, 0x12, 0xa4, 0x42,
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
            0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0x11, 0x2b, 0xe1, 0x12, 0xa6, 0x43,
        ];

        assert_eq!(&response[..], &expected[..]);
    }

    #[test]
    fn echoes_the_transaction_id() {
        let source: SocketAddr = "[2001:db8::1]:12345".parse().unwrap();

        let mut attributes = Attributes::default();
        let response = binding_response(&REQUEST, source, &mut attributes).unwrap();

        assert_eq!(&response[8..20], &TRANSACTION_ID);

        // ipv6 attribute body is 20 bytes, reported in both lengths
        assert_eq!(&response[2..4], &[0x00, 0x18]);
        assert_eq!(&response[22..24], &[0x00, 0x14]);
        assert_eq!(response[25], 0x02);
    }

    #[test]
    fn drops_foreign_packets() {
        let source: SocketAddr = "192.0.2.1:12345".parse().unwrap();
        let mut attributes = Attributes::default();

        // non-binding message type
        let mut packet = REQUEST;
        packet[1] = 0x03;
        assert!(binding_response(&packet, source, &mut attributes).is_none());

        // a binding response is not a request either
        let mut packet = REQUEST;
        packet[0] = 0x01;
        assert!(binding_response(&packet, source, &mut attributes).is_none());

        // wrong cookie
        let mut packet = REQUEST;
        packet[4] = 0x00;
        assert!(binding_response(&packet, source, &mut attributes).is_none());

        // truncated header
        assert!(binding_response(&REQUEST[..19], source, &mut attributes).is_none());
    }
}
