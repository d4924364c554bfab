pub mod address;

use std::{fmt::Debug, net::SocketAddr};

use bytes::BufMut;
use num_enum::TryFromPrimitive;

use self::address::XorAddress;

use super::Error;

/// STUN Attributes Registry
///
/// [RFC5389]: https://datatracker.ietf.org/doc/html/rfc5389
/// [RFC8126]: https://datatracker.ietf.org/doc/html/rfc8126
///
/// A STUN attribute type is a hex number in the range 0x0000-0xFFFF.
/// STUN attribute types in the range 0x0000-0x7FFF are considered
/// comprehension-required; STUN attribute types in the range
/// 0x8000-0xFFFF are considered comprehension-optional.
///
/// A Binding server that performs no authentication only ever emits
/// XOR-MAPPED-ADDRESS (0x0020). Attributes carried by a request are not
/// interpreted; the decoder records the ones it recognizes and skips
/// the rest, as [RFC5389] requires for unknown comprehension-optional
/// attributes.
#[repr(u16)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, TryFromPrimitive)]
pub enum AttributeType {
    XorMappedAddress = 0x0020,
}

/// dyn stun message attribute.
pub trait Attribute<'a> {
    type Error: Debug;

    /// current attribute inner type.
    type Item;

    /// current attribute type.
    const TYPE: AttributeType;

    /// write the current attribute to the buffer.
    fn serialize<B: BufMut>(value: Self::Item, bytes: &mut B, transaction_id: &'a [u8]);

    /// convert buffer to current attribute.
    fn deserialize(bytes: &'a [u8], transaction_id: &'a [u8]) -> Result<Self::Item, Self::Error>;
}

/// [RFC5389 Section 15.2]: https://datatracker.ietf.org/doc/html/rfc5389#section-15.2
///
/// The XOR-MAPPED-ADDRESS attribute is identical to the MAPPED-ADDRESS
/// attribute, except that the reflexive transport address is obfuscated
/// through the XOR function, see [RFC5389 Section 15.2].
///
/// The format of the XOR-MAPPED-ADDRESS is:
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |0 0 0 0 0 0 0 0|    Family     |         X-Port                |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                X-Address (Variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// X-Port is computed by XOR'ing the mapped port with the most
/// significant 16 bits of the magic cookie. If the IP address family is
/// IPv4, X-Address is computed by XOR'ing the mapped IP address with
/// the magic cookie. If the IP address family is IPv6, X-Address is
/// computed by XOR'ing the mapped IP address with the concatenation of
/// the magic cookie and the 96-bit transaction ID. In all cases, the
/// XOR operation works on its inputs in network byte order.
///
/// Deployment experience found that some NATs rewrite 32-bit binary
/// payloads containing the NAT's public IP address, such as STUN's
/// MAPPED-ADDRESS attribute, in the well-meaning but misguided attempt
/// to provide a generic Application Layer Gateway function. Such
/// behavior interferes with the operation of STUN, hence the
/// obfuscation.
#[derive(Debug, Clone, Copy)]
pub struct XorMappedAddress;

impl<'a> Attribute<'a> for XorMappedAddress {
    type Error = Error;
    type Item = SocketAddr;

    const TYPE: AttributeType = AttributeType::XorMappedAddress;

    fn serialize<B: BufMut>(value: Self::Item, bytes: &mut B, transaction_id: &'a [u8]) {
        XorAddress::serialize(&value, transaction_id, bytes)
    }

    fn deserialize(bytes: &'a [u8], transaction_id: &'a [u8]) -> Result<Self::Item, Self::Error> {
        XorAddress::deserialize(bytes, transaction_id)
    }
}
