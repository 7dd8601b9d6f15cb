use crate::key;
use crate::msgs::base::{Payload, PayloadU16};
use crate::msgs::codec;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::{CipherSuite, Compression, HandshakeType, ProtocolVersion};

/// The 32-byte nonce carried by both hello messages.
#[derive(Clone)]
pub struct Random(pub [u8; 32]);

impl std::fmt::Debug for Random {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // 64 hex chars of nonce add nothing to a trace.
        write!(f, "Random(..)")
    }
}

impl Codec for Random {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader) -> Option<Random> {
        let bytes = try_ret!(r.take(32));
        let mut opaque = [0u8; 32];
        opaque.copy_from_slice(bytes);
        Some(Random(opaque))
    }
}

impl Random {
    pub fn from_slice(bytes: &[u8]) -> Random {
        let mut opaque = [0u8; 32];
        opaque.copy_from_slice(bytes);
        Random(opaque)
    }
}

/// A session identifier: up to 32 opaque bytes behind a one-byte length.
/// This engine never resumes, so the only one it emits is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionID {
    bytes: Vec<u8>,
}

impl Codec for SessionID {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.bytes.len() <= 32);
        bytes.push(self.bytes.len() as u8);
        bytes.extend_from_slice(&self.bytes);
    }

    fn read(r: &mut Reader) -> Option<SessionID> {
        let len = try_ret!(codec::read_u8(r)) as usize;
        if len > 32 {
            return None;
        }

        let body = try_ret!(r.take(len));
        Some(SessionID { bytes: body.to_vec() })
    }
}

impl SessionID {
    pub fn empty() -> SessionID {
        SessionID { bytes: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// An extension we carry without interpreting.  This engine negotiates
/// none, but a ClientHello bearing them must still parse and re-encode
/// byte-identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExtension {
    pub typ: u16,
    pub payload: PayloadU16,
}

impl Codec for UnknownExtension {
    fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_u16(self.typ, bytes);
        self.payload.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<UnknownExtension> {
        let typ = try_ret!(codec::read_u16(r));
        let payload = try_ret!(PayloadU16::read(r));
        Some(UnknownExtension { typ, payload })
    }
}

#[derive(Debug)]
pub struct ClientHelloPayload {
    pub client_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionID,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<Compression>,
    pub extensions: Vec<UnknownExtension>,
}

impl Codec for ClientHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.client_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id.encode(bytes);
        codec::encode_vec_u16(bytes, &self.cipher_suites);
        codec::encode_vec_u8(bytes, &self.compression_methods);

        if !self.extensions.is_empty() {
            codec::encode_vec_u16(bytes, &self.extensions);
        }
    }

    fn read(r: &mut Reader) -> Option<ClientHelloPayload> {
        let mut ret = ClientHelloPayload {
            client_version: try_ret!(ProtocolVersion::read(r)),
            random: try_ret!(Random::read(r)),
            session_id: try_ret!(SessionID::read(r)),
            cipher_suites: try_ret!(codec::read_vec_u16::<CipherSuite>(r)),
            compression_methods: try_ret!(codec::read_vec_u8::<Compression>(r)),
            extensions: Vec::new(),
        };

        if r.any_left() {
            ret.extensions = try_ret!(codec::read_vec_u16::<UnknownExtension>(r));
        }

        Some(ret)
    }
}

#[derive(Debug)]
pub struct ServerHelloPayload {
    pub server_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionID,
    pub cipher_suite: CipherSuite,
    pub compression_method: Compression,
    pub extensions: Vec<UnknownExtension>,
}

impl Codec for ServerHelloPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.server_version.encode(bytes);
        self.random.encode(bytes);
        self.session_id.encode(bytes);
        self.cipher_suite.encode(bytes);
        self.compression_method.encode(bytes);

        if !self.extensions.is_empty() {
            codec::encode_vec_u16(bytes, &self.extensions);
        }
    }

    fn read(r: &mut Reader) -> Option<ServerHelloPayload> {
        let mut ret = ServerHelloPayload {
            server_version: try_ret!(ProtocolVersion::read(r)),
            random: try_ret!(Random::read(r)),
            session_id: try_ret!(SessionID::read(r)),
            cipher_suite: try_ret!(CipherSuite::read(r)),
            compression_method: try_ret!(Compression::read(r)),
            extensions: Vec::new(),
        };

        if r.any_left() {
            ret.extensions = try_ret!(codec::read_vec_u16::<UnknownExtension>(r));
        }

        Some(ret)
    }
}

pub type CertificatePayload = Vec<key::Certificate>;

impl Codec for CertificatePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_vec_u24(bytes, self);
    }

    fn read(r: &mut Reader) -> Option<CertificatePayload> {
        codec::read_vec_u24::<key::Certificate>(r)
    }
}

#[derive(Debug)]
pub enum HandshakePayload {
    HelloRequest,
    ClientHello(ClientHelloPayload),
    ServerHello(ServerHelloPayload),
    Certificate(CertificatePayload),
    ServerHelloDone,
    /// The PKCS#1-encrypted pre-master secret, behind a two-byte length.
    ClientKeyExchange(PayloadU16),
    /// Exactly twelve bytes of verify_data.
    Finished(Payload),
    Unknown(Payload),
}

impl HandshakePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        match *self {
            HandshakePayload::HelloRequest | HandshakePayload::ServerHelloDone => {}
            HandshakePayload::ClientHello(ref x) => x.encode(bytes),
            HandshakePayload::ServerHello(ref x) => x.encode(bytes),
            HandshakePayload::Certificate(ref x) => x.encode(bytes),
            HandshakePayload::ClientKeyExchange(ref x) => x.encode(bytes),
            HandshakePayload::Finished(ref x) => x.encode(bytes),
            HandshakePayload::Unknown(ref x) => x.encode(bytes),
        }
    }
}

/// A handshake message: one-byte type, three-byte length, body.
#[derive(Debug)]
pub struct HandshakeMessagePayload {
    pub typ: HandshakeType,
    pub payload: HandshakePayload,
}

impl Codec for HandshakeMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        // encode the body first to learn its length
        let mut sub: Vec<u8> = Vec::new();
        self.payload.encode(&mut sub);

        self.typ.encode(bytes);
        codec::encode_u24(sub.len() as u32, bytes);
        bytes.append(&mut sub);
    }

    fn read(r: &mut Reader) -> Option<HandshakeMessagePayload> {
        let typ = try_ret!(HandshakeType::read(r));
        let len = try_ret!(codec::read_u24(r)) as usize;
        let mut sub = try_ret!(r.sub(len));

        let payload = match typ {
            HandshakeType::HelloRequest if sub.left() == 0 => HandshakePayload::HelloRequest,
            HandshakeType::ClientHello => {
                HandshakePayload::ClientHello(try_ret!(ClientHelloPayload::read(&mut sub)))
            }
            HandshakeType::ServerHello => {
                HandshakePayload::ServerHello(try_ret!(ServerHelloPayload::read(&mut sub)))
            }
            HandshakeType::Certificate => {
                HandshakePayload::Certificate(try_ret!(CertificatePayload::read(&mut sub)))
            }
            HandshakeType::ServerHelloDone if sub.left() == 0 => HandshakePayload::ServerHelloDone,
            HandshakeType::ClientKeyExchange => {
                HandshakePayload::ClientKeyExchange(try_ret!(PayloadU16::read(&mut sub)))
            }
            HandshakeType::Finished => HandshakePayload::Finished(try_ret!(Payload::read(&mut sub))),
            _ => HandshakePayload::Unknown(try_ret!(Payload::read(&mut sub))),
        };

        if sub.any_left() {
            return None;
        }

        Some(HandshakeMessagePayload { typ, payload })
    }
}

impl HandshakeMessagePayload {
    pub fn len(&self) -> usize {
        self.get_encoding().len()
    }

    /// Build a message whose body encodes `payload`.
    pub fn build(typ: HandshakeType, payload: HandshakePayload) -> HandshakeMessagePayload {
        HandshakeMessagePayload { typ, payload }
    }
}
