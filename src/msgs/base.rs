use crate::key;
use crate::msgs::codec;
use crate::msgs::codec::{Codec, Reader};

/// A payload whose length is supplied by the enclosing structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(pub Vec<u8>);

impl Codec for Payload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader) -> Option<Payload> {
        Some(Payload(r.rest().to_vec()))
    }
}

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Payload {
        Payload(bytes)
    }

    pub fn empty() -> Payload {
        Payload(Vec::new())
    }

    pub fn from_slice(data: &[u8]) -> Payload {
        Payload(data.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An opaque payload with a one-byte length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadU8(pub Vec<u8>);

impl PayloadU8 {
    pub fn new(bytes: Vec<u8>) -> PayloadU8 {
        PayloadU8(bytes)
    }

    pub fn empty() -> PayloadU8 {
        PayloadU8(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Codec for PayloadU8 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.0.len() <= 0xff);
        bytes.push(self.0.len() as u8);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader) -> Option<PayloadU8> {
        let len = try_ret!(codec::read_u8(r)) as usize;
        let body = try_ret!(r.take(len));
        Some(PayloadU8(body.to_vec()))
    }
}

/// An opaque payload with a two-byte length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadU16(pub Vec<u8>);

impl PayloadU16 {
    pub fn new(bytes: Vec<u8>) -> PayloadU16 {
        PayloadU16(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Codec for PayloadU16 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.0.len() <= 0xffff);
        codec::encode_u16(self.0.len() as u16, bytes);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader) -> Option<PayloadU16> {
        let len = try_ret!(codec::read_u16(r)) as usize;
        let body = try_ret!(r.take(len));
        Some(PayloadU16(body.to_vec()))
    }
}

// A certificate in a Certificate message is DER bytes behind a
// three-byte length.
impl Codec for key::Certificate {
    fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_u24(self.0.len() as u32, bytes);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader) -> Option<key::Certificate> {
        let len = try_ret!(codec::read_u24(r)) as usize;
        let body = try_ret!(r.take(len));
        Some(key::Certificate(body.to_vec()))
    }
}
