use std::net::{IpAddr, SocketAddr};

use bytes::{Buf, BufMut};
use num_enum::TryFromPrimitive;

use crate::{Error, message::MAGIC_COOKIE};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum IpFamily {
    V4 = 0x01,
    V6 = 0x02,
}

/// The transport address payload shared by the address attributes. It
/// consists of an 8-bit zero byte, an 8-bit address family and a 16-bit
/// port, followed by a fixed-length value representing the IP address:
/// 32 bits for IPv4, 128 bits for IPv6. All fields are in network byte
/// order, and the address and port are obfuscated through the XOR
/// function before they are written.
#[derive(Debug, Clone, Copy)]
pub struct XorAddress;

impl XorAddress {
    /// encoder SocketAddr as Bytes.
    ///
    /// # Test
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use stun_server_codec::message::attributes::address::XorAddress;
    ///
    /// let xor_addr_bytes: [u8; 8] =
    ///     [0x00, 0x01, 0xfc, 0xbe, 0xe1, 0xba, 0xa4, 0x29];
    ///
    /// let transaction_id: [u8; 12] = [
    ///     0x6c, 0x46, 0x62, 0x54, 0x75, 0x4b, 0x44, 0x51, 0x46, 0x48, 0x4c, 0x71,
    /// ];
    ///
    /// let source = "192.168.0.107:56748".parse().unwrap();
    ///
    /// let mut buffer = BytesMut::with_capacity(1280);
    /// XorAddress::serialize(&source, &transaction_id, &mut buffer);
    /// assert_eq!(&xor_addr_bytes, &buffer[..]);
    /// ```
    pub fn serialize<B: BufMut>(addr: &SocketAddr, transaction_id: &[u8], bytes: &mut B) {
        let xor_addr = xor(addr, transaction_id);

        bytes.put_u8(0);
        bytes.put_u8(if xor_addr.is_ipv4() {
            IpFamily::V4
        } else {
            IpFamily::V6
        } as u8);

        bytes.put_u16(xor_addr.port());

        match xor_addr.ip() {
            IpAddr::V4(ip) => bytes.put(&ip.octets()[..]),
            IpAddr::V6(ip) => bytes.put(&ip.octets()[..]),
        }
    }

    /// decoder Bytes as SocketAddr.
    ///
    /// # Test
    ///
    /// ```
    /// use stun_server_codec::message::attributes::address::XorAddress;
    ///
    /// let xor_addr_bytes: [u8; 8] =
    ///     [0x00, 0x01, 0xfc, 0xbe, 0xe1, 0xba, 0xa4, 0x29];
    ///
    /// let transaction_id: [u8; 12] = [
    ///     0x6c, 0x46, 0x62, 0x54, 0x75, 0x4b, 0x44, 0x51, 0x46, 0x48, 0x4c, 0x71,
    /// ];
    ///
    /// let source = "192.168.0.107:56748".parse().unwrap();
    ///
    /// let addr = XorAddress::deserialize(&xor_addr_bytes, &transaction_id).unwrap();
    /// assert_eq!(addr, source);
    /// ```
    pub fn deserialize(mut bytes: &[u8], transaction_id: &[u8]) -> Result<SocketAddr, Error> {
        if bytes.len() < 4 {
            return Err(Error::InvalidInput);
        }

        // skip the reserved zero byte
        bytes.advance(1);

        let family = IpFamily::try_from(bytes.get_u8()).map_err(|_| Error::UnknownFamily)?;
        let port = bytes.get_u16();

        let ip = match family {
            IpFamily::V4 => {
                let octets: [u8; 4] = bytes.try_into().map_err(|_| Error::InvalidInput)?;
                IpAddr::V4(octets.into())
            }
            IpFamily::V6 => {
                let octets: [u8; 16] = bytes.try_into().map_err(|_| Error::InvalidInput)?;
                IpAddr::V6(octets.into())
            }
        };

        Ok(xor(&SocketAddr::new(ip, port), transaction_id))
    }
}

/// Obfuscates a transport address, or recovers an obfuscated one. The
/// transform is its own inverse.
///
/// The port is XORed with the most significant 16 bits of the magic
/// cookie. An IPv4 address is XORed with the magic cookie; an IPv6
/// address is XORed with the concatenation of the magic cookie and the
/// 12-byte transaction ID, byte for byte in network byte order.
///
/// # Test
///
/// ```
/// use std::net::SocketAddr;
/// use stun_server_codec::message::attributes::address::xor;
///
/// let source: SocketAddr = "192.168.0.107:1".parse().unwrap();
/// let res: SocketAddr = "225.186.164.41:8467".parse().unwrap();
///
/// let transaction_id: [u8; 12] = [
///     0x6c, 0x46, 0x62, 0x54, 0x75, 0x4b, 0x44, 0x51, 0x46, 0x48, 0x4c, 0x71,
/// ];
///
/// let addr = xor(&source, &transaction_id);
/// assert_eq!(addr, res);
/// assert_eq!(xor(&addr, &transaction_id), source);
/// ```
pub fn xor(addr: &SocketAddr, transaction_id: &[u8]) -> SocketAddr {
    let cookie = MAGIC_COOKIE.to_be_bytes();

    let ip = match addr.ip() {
        IpAddr::V4(it) => {
            let mut octets = it.octets();
            for (b, m) in octets.iter_mut().zip(cookie) {
                *b ^= m;
            }

            IpAddr::V4(octets.into())
        }
        IpAddr::V6(it) => {
            let mut mask = [0u8; 16];
            mask[..4].copy_from_slice(&cookie);
            mask[4..].copy_from_slice(&transaction_id[..12]);

            let mut octets = it.octets();
            for (b, m) in octets.iter_mut().zip(mask) {
                *b ^= m;
            }

            IpAddr::V6(octets.into())
        }
    };

    SocketAddr::new(ip, addr.port() ^ (MAGIC_COOKIE >> 16) as u16)
}
