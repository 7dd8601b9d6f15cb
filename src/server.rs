use crate::cipher::CryptoState;
use crate::error::Error;
use crate::key::{Certificate, PrivateKey};
use crate::msgs::alert::AlertMessagePayload;
use crate::msgs::codec::{encode_u16, Codec, Reader};
use crate::msgs::deframer;
use crate::msgs::enums::{AlertDescription, AlertLevel, ContentType, ProtocolVersion};
use crate::rand::SecureRandom;
use crate::server_hs;
use crate::server_hs::{DecrypterChange, HandshakeState, RecordCommand};
use crate::suites::SupportedCipherSuite;

use log::warn;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use zeroize::Zeroizing;

use std::sync::Arc;

/// Things the engine learned from inbound records, drained with
/// [`ServerEngine::take_events`].
#[derive(Debug, PartialEq)]
pub enum Event {
    /// A decrypted APPLICATION_DATA fragment.
    ApplicationData(Vec<u8>),
    /// The Finished exchange completed; application data may flow.
    HandshakeComplete,
    /// The peer sent an alert.  The engine carries on; closing the
    /// transport on a fatal alert is the host's decision.
    AlertReceived(AlertLevel, AlertDescription),
}

/// Per-listener configuration: the certificate chain, the RSA key that
/// certificate speaks for, and a randomness source.  Build one and
/// share it (`Arc`) across every connection's engine.
pub struct ServerConfig {
    /// DER certificates, sent leaf-first in the Certificate message.
    pub cert_chain: Vec<Certificate>,
    key: RsaPrivateKey,
    rng: Box<dyn SecureRandom>,
}

impl ServerConfig {
    /// Parse `private_key` (PKCS#1 or PKCS#8 DER) and build a config.
    pub fn new(
        cert_chain: Vec<Certificate>,
        private_key: &PrivateKey,
        rng: Box<dyn SecureRandom>,
    ) -> Result<ServerConfig, Error> {
        let key = RsaPrivateKey::from_pkcs1_der(&private_key.0)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(&private_key.0))
            .map_err(|_| Error::InvalidKey)?;

        Ok(ServerConfig {
            cert_chain,
            key,
            rng,
        })
    }

    pub(crate) fn fill_random(&self, bytes: &mut [u8]) -> Result<(), Error> {
        self.rng.fill(bytes)
    }

    /// PKCS#1 v1.5 decryption of the ClientKeyExchange body.
    pub(crate) fn decrypt_pre_master(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        self.key
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| Error::CryptoError)
    }
}

/// One TLS 1.0 server connection, driven entirely by the host: feed it
/// transport bytes with [`handle`](ServerEngine::handle), ship the
/// bytes it returns, and drain its [`Event`]s.  The first error is
/// terminal; every later call reports it again.
pub struct ServerEngine {
    config: Arc<ServerConfig>,
    state: Option<HandshakeState>,
    decryptor: CryptoState,
    encryptor: CryptoState,
    events: Vec<Event>,
    error: Option<Error>,
    // set at the first Finished exchange; application data stays legal
    // during a later renegotiation, under the still-installed ciphers
    completed_once: bool,
}

impl ServerEngine {
    pub fn new(config: Arc<ServerConfig>) -> ServerEngine {
        ServerEngine {
            config,
            state: Some(HandshakeState::ExpectClientHello),
            decryptor: CryptoState::Plain,
            encryptor: CryptoState::Plain,
            events: Vec::new(),
            error: None,
            completed_once: false,
        }
    }

    /// Process one buffer of inbound transport bytes and return the
    /// bytes to send back.  `input` must contain whole records; the
    /// host reassembles partial reads first.
    ///
    /// On error nothing is returned for the whole buffer, the engine
    /// is dead, and the host should close the transport (optionally
    /// shipping [`fatal_alert`](ServerEngine::fatal_alert) first).
    pub fn handle(&mut self, input: &[u8]) -> Result<Vec<u8>, Error> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }

        match self.process(input) {
            Ok(out) => Ok(out),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn process(&mut self, input: &[u8]) -> Result<Vec<u8>, Error> {
        let records = deframer::deframe(input)?;
        let mut out = Vec::new();

        for mut record in records {
            if let ContentType::Unknown(_) = record.typ {
                return Err(Error::CorruptMessage);
            }
            if (record.version.get_u16() & 0xff00) != 0x0300 {
                return Err(Error::CorruptMessage);
            }

            let body = match record.take_opaque_payload() {
                Some(payload) => payload.0,
                None => return Err(Error::CorruptMessage),
            };

            let fragment = self
                .decryptor
                .decrypt(record.typ, record.version, &body)?;

            match record.typ {
                ContentType::Alert => self.process_alert(&fragment)?,
                ContentType::ApplicationData => self.process_plaintext(fragment)?,
                ContentType::Handshake | ContentType::ChangeCipherSpec => {
                    self.process_handshake(record.typ, &fragment, &mut out)?
                }
                ContentType::Unknown(_) => unreachable!(),
            }
        }

        Ok(out)
    }

    fn process_alert(&mut self, fragment: &[u8]) -> Result<(), Error> {
        let mut rd = Reader::init(fragment);
        let alert = match AlertMessagePayload::read(&mut rd) {
            Some(alert) if !rd.any_left() => alert,
            _ => return Err(Error::CorruptMessagePayload(ContentType::Alert)),
        };

        if alert.level == AlertLevel::Fatal {
            warn!("peer sent fatal alert: {:?}", alert.description);
        }

        self.events
            .push(Event::AlertReceived(alert.level, alert.description));
        Ok(())
    }

    fn process_plaintext(&mut self, fragment: Vec<u8>) -> Result<(), Error> {
        if self.completed_once {
            self.events.push(Event::ApplicationData(fragment));
            Ok(())
        } else {
            Err(Error::InappropriateMessage {
                expect_types: vec![ContentType::Handshake],
                got_type: ContentType::ApplicationData,
            })
        }
    }

    fn process_handshake(
        &mut self,
        typ: ContentType,
        fragment: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let state = self
            .state
            .take()
            .ok_or_else(|| Error::General("engine state missing".to_string()))?;
        let was_established = state.is_established();

        let transition = server_hs::handle_record(state, &self.config, typ, fragment)?;

        if transition.next.is_established() && !was_established {
            self.completed_once = true;
            self.events.push(Event::HandshakeComplete);
        }
        self.state = Some(transition.next);

        // apply commands in order: an Emit before a ChangeEncrypter is
        // protected under the old cipher, one after it under the new
        for command in transition.output {
            match command {
                RecordCommand::Emit(typ, plain) => {
                    let protected =
                        self.encryptor
                            .encrypt(typ, ProtocolVersion::TLSv1_0, &plain)?;
                    append_record(out, typ, &protected);
                }
                RecordCommand::ChangeEncrypter(ctx) => {
                    self.encryptor = CryptoState::Active(ctx);
                }
            }
        }

        // the new inbound cipher starts with the *next* record
        if let DecrypterChange::Activate(ctx) = transition.decrypter {
            self.decryptor = CryptoState::Active(ctx);
        }

        Ok(())
    }

    /// Encrypt application data for the peer, returning the wire bytes.
    pub fn send(&mut self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }

        if !self.completed_once {
            return Err(Error::HandshakeNotComplete);
        }

        let protected =
            self.encryptor
                .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, data)?;

        let mut out = Vec::new();
        append_record(&mut out, ContentType::ApplicationData, &protected);
        Ok(out)
    }

    /// Assemble a fatal alert record for the host to ship before it
    /// closes the transport.  Usable even after the engine has died,
    /// which is exactly when it's wanted.
    pub fn fatal_alert(&mut self, desc: AlertDescription) -> Result<Vec<u8>, Error> {
        let body = AlertMessagePayload {
            level: AlertLevel::Fatal,
            description: desc,
        }
        .get_encoding();

        let protected = self
            .encryptor
            .encrypt(ContentType::Alert, ProtocolVersion::TLSv1_0, &body)?;

        let mut out = Vec::new();
        append_record(&mut out, ContentType::Alert, &protected);
        Ok(out)
    }

    /// Drain the events gathered by prior [`handle`](ServerEngine::handle) calls.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// True until the Finished exchange completes (and again during a
    /// renegotiation).
    pub fn is_handshaking(&self) -> bool {
        match self.state {
            Some(ref st) => !st.is_established(),
            None => false,
        }
    }

    /// The suite protecting traffic, once a cipher is active.
    pub fn suite(&self) -> Option<&'static SupportedCipherSuite> {
        match self.encryptor {
            CryptoState::Active(ref ctx) => Some(ctx.suite()),
            CryptoState::Plain => None,
        }
    }
}

fn append_record(out: &mut Vec<u8>, typ: ContentType, payload: &[u8]) {
    typ.encode(out);
    ProtocolVersion::TLSv1_0.encode(out);
    encode_u16(payload.len() as u16, out);
    out.extend_from_slice(payload);
}
