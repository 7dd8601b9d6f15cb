use crate::msgs::enums::{ContentType, HandshakeType};

use std::error::Error as StdError;
use std::fmt;

/// The ways a connection can fail.  Every variant is fatal: once the
/// engine has reported one of these it refuses further input.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// We received a record that isn't valid right now.  `expect_types`
    /// lists the content types legal in the current state; `got_type`
    /// is what arrived.  A buggy peer, a broken transport, or an attack.
    InappropriateMessage {
        expect_types: Vec<ContentType>,
        got_type: ContentType,
    },

    /// We received a handshake message that isn't valid right now.
    InappropriateHandshakeMessage {
        expect_types: Vec<HandshakeType>,
        got_type: HandshakeType,
    },

    /// The peer sent a syntactically incorrect message.
    CorruptMessage,

    /// The peer sent a message whose body didn't parse for its
    /// content type.
    CorruptMessagePayload(ContentType),

    /// Record-layer verification failed: bad MAC, or malformed
    /// block-cipher padding.
    DecryptError,

    /// A cryptographic primitive failed; for this engine that is the
    /// RSA decryption of the ClientKeyExchange.
    CryptoError,

    /// A record's declared length ran past the end of the supplied
    /// buffer.  The engine does not reassemble partial records.
    UnexpectedFragment,

    /// The peer can't talk to us: wrong version, no common
    /// ciphersuite, no null compression.
    PeerIncompatible(String),

    /// The peer broke the protocol: bad Finished verify_data,
    /// a ChangeCipherSpec we weren't owed, and the like.
    PeerMisbehaved(String),

    /// The host asked for application data before the handshake
    /// finished.
    HandshakeNotComplete,

    /// The configured private key didn't parse.
    InvalidKey,

    /// The randomness source failed.
    FailedToGetRandomBytes,

    /// A catch-all for unlikely internal failures.
    General(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InappropriateMessage {
                ref expect_types,
                ref got_type,
            } => write!(
                f,
                "received unexpected {:?} message, wanted one of {:?}",
                got_type, expect_types
            ),
            Error::InappropriateHandshakeMessage {
                ref expect_types,
                ref got_type,
            } => write!(
                f,
                "received unexpected {:?} handshake message, wanted one of {:?}",
                got_type, expect_types
            ),
            Error::CorruptMessage => write!(f, "received corrupt message"),
            Error::CorruptMessagePayload(ref typ) => {
                write!(f, "received corrupt {:?} payload", typ)
            }
            Error::DecryptError => write!(f, "record failed verification"),
            Error::CryptoError => write!(f, "cryptographic operation failed"),
            Error::UnexpectedFragment => write!(f, "record truncated by supplied buffer"),
            Error::PeerIncompatible(ref why) => write!(f, "peer incompatible: {}", why),
            Error::PeerMisbehaved(ref why) => write!(f, "peer misbehaved: {}", why),
            Error::HandshakeNotComplete => write!(f, "handshake not complete"),
            Error::InvalidKey => write!(f, "invalid private key"),
            Error::FailedToGetRandomBytes => write!(f, "failed to get random bytes"),
            Error::General(ref why) => write!(f, "unexpected error: {}", why),
        }
    }
}

impl StdError for Error {}
