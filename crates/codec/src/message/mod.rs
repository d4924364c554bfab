pub mod attributes;
pub mod methods;

use crate::{
    Attributes, Error,
    message::{
        attributes::{Attribute, AttributeType},
        methods::Method,
    },
};

use bytes::{BufMut, BytesMut};

/// Fixed 32-bit value identifying STUN messages per RFC 5389,
/// distinguishing them from the legacy RFC 3489 protocol.
pub const MAGIC_COOKIE: u32 = 0x2112A442;

/// Writes an outgoing message: a 20-byte header followed by the
/// appended attributes. `flush` patches the header length field with
/// the byte count of the attribute section, which excludes the header
/// itself.
pub struct MessageEncoder<'a> {
    transaction_id: &'a [u8],
    bytes: &'a mut BytesMut,
}

impl<'a> MessageEncoder<'a> {
    /// create a new message with a caller-supplied transaction id.
    pub fn new(method: Method, transaction_id: &'a [u8; 12], bytes: &'a mut BytesMut) -> Self {
        bytes.clear();
        bytes.put_u16(method.into());
        bytes.put_u16(0);
        bytes.put_u32(MAGIC_COOKIE);
        bytes.put(transaction_id.as_slice());

        Self {
            bytes,
            transaction_id,
        }
    }

    /// rely on old message to create new message.
    ///
    /// The transaction id of the request is echoed verbatim, which is
    /// how the client correlates the response.
    ///
    /// # Test
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use stun_server_codec::message::methods::*;
    /// use stun_server_codec::message::*;
    /// use stun_server_codec::*;
    ///
    /// let buffer = [
    ///     0x00u8, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49,
    ///     0x42, 0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let mut buf = BytesMut::new();
    /// let old = Message::decode(&buffer[..], &mut attributes).unwrap();
    /// let mut message = MessageEncoder::extend(BINDING_REQUEST, &old, &mut buf);
    /// message.flush();
    ///
    /// assert_eq!(&buf[..], &buffer[..]);
    /// ```
    pub fn extend(method: Method, reader: &Message<'a>, bytes: &'a mut BytesMut) -> Self {
        let transaction_id = reader.transaction_id();

        bytes.clear();
        bytes.put_u16(method.into());
        bytes.put_u16(0);
        bytes.put_u32(MAGIC_COOKIE);
        bytes.put(transaction_id);

        Self {
            bytes,
            transaction_id,
        }
    }

    /// append attribute.
    ///
    /// append attribute to message attribute list.
    ///
    /// # Test
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use stun_server_codec::message::attributes::*;
    /// use stun_server_codec::message::methods::*;
    /// use stun_server_codec::message::*;
    /// use stun_server_codec::*;
    ///
    /// let buffer = [
    ///     0x00u8, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x00, 0x01, 0x02,
    ///     0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,
    /// ];
    ///
    /// let response = [
    ///     0x01u8, 0x01, 0x00, 0x0c, 0x21, 0x12, 0xa4, 0x42, 0x00, 0x01, 0x02,
    ///     0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x00, 0x20,
    ///     0x00, 0x08, 0x00, 0x01, 0x11, 0x2b, 0xe1, 0x12, 0xa6, 0x43,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let mut buf = BytesMut::with_capacity(1280);
    /// let old = Message::decode(&buffer[..], &mut attributes).unwrap();
    /// let mut message = MessageEncoder::extend(BINDING_RESPONSE, &old, &mut buf);
    ///
    /// message.append::<XorMappedAddress>("192.0.2.1:12345".parse().unwrap());
    /// message.flush();
    ///
    /// assert_eq!(&buf[..], &response[..]);
    /// ```
    pub fn append<'c, T: Attribute<'c>>(&'c mut self, value: T::Item) {
        self.bytes.put_u16(T::TYPE as u16);

        // reserve the length field, the body size is only known after
        // the attribute has been serialized.
        let os = self.bytes.len();
        self.bytes.put_u16(0);
        T::serialize(value, self.bytes, self.transaction_id);

        let size = self.bytes.len() - os - 2;
        self.bytes[os..os + 2].copy_from_slice(&(size as u16).to_be_bytes());

        // if you need to padding, padding in the zero bytes.
        let psize = alignment_32(size);
        if psize > 0 {
            self.bytes.put_bytes(0, psize);
        }
    }

    /// write the attribute list size into the message header.
    pub fn flush(&mut self) {
        let size = (self.bytes.len() - 20) as u16;
        self.bytes[2..4].copy_from_slice(&size.to_be_bytes());
    }
}

pub struct Message<'a> {
    /// message method.
    method: Method,
    /// message source bytes.
    bytes: &'a [u8],
    // message attribute list.
    attributes: &'a Attributes,
}

impl<'a> Message<'a> {
    /// message method.
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// message transaction id.
    #[inline]
    pub fn transaction_id(&self) -> &'a [u8] {
        &self.bytes[8..20]
    }

    /// get attribute.
    ///
    /// get attribute from message attribute list.
    pub fn get<T: Attribute<'a>>(&self) -> Option<T::Item> {
        let range = self.attributes.get(&T::TYPE)?;
        T::deserialize(&self.bytes[range], self.transaction_id()).ok()
    }

    /// # Test
    ///
    /// ```
    /// use stun_server_codec::message::methods::*;
    /// use stun_server_codec::message::*;
    /// use stun_server_codec::*;
    ///
    /// let buffer: [u8; 20] = [
    ///     0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 0x72, 0x6d, 0x49, 0x42,
    ///     0x72, 0x52, 0x64, 0x48, 0x57, 0x62, 0x4b, 0x2b,
    /// ];
    ///
    /// let mut attributes = Attributes::default();
    /// let message = Message::decode(&buffer[..], &mut attributes).unwrap();
    ///
    /// assert_eq!(message.method(), BINDING_REQUEST);
    /// assert_eq!(message.transaction_id(), &buffer[8..20]);
    /// ```
    pub fn decode(bytes: &'a [u8], attributes: &'a mut Attributes) -> Result<Self, Error> {
        attributes.clear();

        let len = bytes.len();

        // There must be at least a complete header.
        if len < 20 {
            return Err(Error::InvalidInput);
        }

        let method = Method::try_from(u16::from_be_bytes(bytes[..2].try_into()?))?;

        // First check whether the message length is valid. Here, the length
        // needs to add the 20 bytes of the header, because the length field
        // does not include the header length.
        let size = u16::from_be_bytes(bytes[2..4].try_into()?) as usize + 20;
        if len < size {
            return Err(Error::InvalidInput);
        }

        // Check whether the magic cookie is the same.
        if bytes[4..8] != MAGIC_COOKIE.to_be_bytes() {
            return Err(Error::NotFoundMagicNumber);
        }

        let mut offset = 20;
        while offset + 4 <= size {
            let key = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);

            // get attribute size
            let body = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;

            // check if the attribute length has overflowed.
            offset += 4;
            if size - offset < body {
                break;
            }

            let range = offset..(offset + body);

            // if there are padding bytes, skip padding size.
            if body > 0 {
                offset += body + alignment_32(body);
            }

            // skip the attributes that are not supported.
            if let Ok(kind) = AttributeType::try_from(key) {
                attributes.append(kind, range);
            }
        }

        Ok(Self {
            attributes,
            method,
            bytes,
        })
    }
}

/// compute padding size.
///
/// RFC5389 stipulates that the attribute content is a multiple of 4.
///
/// # Test
///
/// ```
/// use stun_server_codec::message::alignment_32;
///
/// assert_eq!(alignment_32(4), 0);
/// assert_eq!(alignment_32(0), 0);
/// assert_eq!(alignment_32(5), 3);
/// ```
#[inline(always)]
pub fn alignment_32(size: usize) -> usize {
    let range = size % 4;
    if size == 0 || range == 0 {
        return 0;
    }

    4 - range
}
