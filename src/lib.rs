//! # relictls
//!
//! relictls is a server-side TLS 1.0 (RFC 2246) record and handshake
//! engine with no I/O of its own.  The host owns the transport: it feeds
//! inbound bytes to [`ServerEngine::handle`] and ships whatever bytes come
//! back.  The engine performs no reads, no writes, no timekeeping and no
//! concurrency; a single engine must be driven from one thread at a time,
//! while any number of engines may share one [`ServerConfig`].
//!
//! The supported handshake is the classic RSA key exchange: ClientHello,
//! ServerHello/Certificate/ServerHelloDone, ClientKeyExchange,
//! ChangeCipherSpec, Finished, with renegotiation on a later ClientHello.
//! Cipher suites cover 3DES-EDE-CBC, AES-CBC and RC4 record protection,
//! all with HMAC record authentication.
//!
//! TLS 1.0 is obsolete.  Its chained CBC IVs (BEAST) and its MD5-based
//! PRF are kept here because the protocol version requires them for
//! interoperability; do not put this in front of traffic that a modern
//! TLS stack could carry instead.

mod msgs;

mod cipher;
mod error;
mod key;
mod prf;
mod rand;
mod server;
mod server_hs;
mod session;
mod suites;

pub use crate::error::Error;
pub use crate::key::{Certificate, PrivateKey};
pub use crate::msgs::enums::{AlertDescription, AlertLevel, CipherSuite, ContentType, ProtocolVersion};
pub use crate::rand::{SecureRandom, SystemRandom};
pub use crate::server::{Event, ServerConfig, ServerEngine};
pub use crate::suites::{BulkAlgorithm, KeyExchangeAlgorithm, MACAlgorithm, SupportedCipherSuite,
                        ALL_CIPHERSUITES, TLS_RSA_WITH_3DES_EDE_CBC_SHA, TLS_RSA_WITH_AES_128_CBC_SHA,
                        TLS_RSA_WITH_AES_256_CBC_SHA, TLS_RSA_WITH_RC4_128_MD5,
                        TLS_RSA_WITH_RC4_128_SHA};

/// Message-layer internals.  These are exposed for hosts that need to
/// assemble or inspect raw records (for instance to build an alert of
/// their own); the types here are not semver-stable API.
pub mod internal {
    pub mod msgs {
        pub use crate::msgs::*;
    }
}
