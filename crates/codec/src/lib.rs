//! ## Session Traversal Utilities for NAT (STUN)
//!
//! [RFC5389]: https://tools.ietf.org/html/rfc5389
//! [Section 7.2]: https://tools.ietf.org/html/rfc5389#section-7.2
//!
//! STUN is a client-server protocol. In the Binding request/response
//! transaction, a Binding request is sent from a STUN client to a STUN
//! server. When the Binding request arrives at the STUN server, it may
//! have passed through one or more NATs between the STUN client and the
//! STUN server. As the Binding request message passes through a NAT, the
//! NAT will modify the source transport address of the packet. As a
//! result, the source transport address of the request received by the
//! server will be the public IP address and port created by the NAT
//! closest to the server. This is called a "reflexive transport
//! address". The STUN server copies that source transport address into
//! an XOR-MAPPED-ADDRESS attribute in the STUN Binding response and
//! sends the Binding response back to the STUN client. See [Section 7.2]
//! for the transaction rules.
//!
//! This crate only implements the wire codec: header and method
//! validation, the XOR-MAPPED-ADDRESS attribute, and response assembly.
//! Transport, scheduling and configuration live in the server crate.

pub mod message;

use std::{array::TryFromSliceError, ops::Range};

use crate::message::attributes::AttributeType;

#[derive(Debug)]
pub enum Error {
    InvalidInput,
    NotFoundMagicNumber,
    UnknownMethod,
    UnknownFamily,
    TryFromSliceError(TryFromSliceError),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<TryFromSliceError> for Error {
    fn from(value: TryFromSliceError) -> Self {
        Self::TryFromSliceError(value)
    }
}

/// A cache of the list of attributes, this is for internal use only.
///
/// The decoder records the body range of every recognized attribute
/// here so that lookups do not rescan the source buffer.
#[derive(Debug, Clone)]
pub struct Attributes(Vec<(AttributeType, Range<usize>)>);

impl Default for Attributes {
    fn default() -> Self {
        Self(Vec::with_capacity(10))
    }
}

impl Attributes {
    /// Adds an attribute to the list.
    pub fn append(&mut self, kind: AttributeType, range: Range<usize>) {
        self.0.push((kind, range));
    }

    /// Gets an attribute from the list.
    ///
    /// Note: This function will only look for the first matching
    /// attribute in the list and return it.
    pub fn get(&self, kind: &AttributeType) -> Option<Range<usize>> {
        self.0
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, v)| v.clone())
    }

    pub fn clear(&mut self) {
        if !self.0.is_empty() {
            self.0.clear();
        }
    }
}
