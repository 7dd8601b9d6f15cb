use crate::cipher::{new_crypto_pair, CryptoContext};
use crate::error::Error;
use crate::msgs::base::Payload;
use crate::msgs::ccs::ChangeCipherSpecPayload;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::{Compression, ContentType, HandshakeType, ProtocolVersion};
use crate::msgs::handshake::{ClientHelloPayload, HandshakeMessagePayload, HandshakePayload,
                             Random, ServerHelloPayload, SessionID};
use crate::server::ServerConfig;
use crate::session::{HandshakeTranscript, SessionSecrets};
use crate::suites;
use crate::suites::SupportedCipherSuite;

use log::{debug, trace, warn};

/// One step of outbound work, applied by the driver in list order.
/// `Emit` is a plaintext record to protect under whichever encryptor is
/// current when the driver reaches it; `ChangeEncrypter` swaps that
/// encryptor, so an emitted ChangeCipherSpec placed before the swap
/// goes out unprotected while everything after is under the new cipher.
pub enum RecordCommand {
    Emit(ContentType, Vec<u8>),
    ChangeEncrypter(CryptoContext),
}

/// What to do with the inbound direction.  `Activate` takes effect for
/// the *next* inbound record; the record that caused it (the peer's
/// ChangeCipherSpec) is by definition unprotected.
pub enum DecrypterChange {
    Keep,
    Activate(CryptoContext),
}

/// The result of feeding one record to the state machine.
pub struct Transition {
    pub next: HandshakeState,
    pub output: Vec<RecordCommand>,
    pub decrypter: DecrypterChange,
}

impl Transition {
    fn quiet(next: HandshakeState) -> Transition {
        Transition {
            next,
            output: Vec::new(),
            decrypter: DecrypterChange::Keep,
        }
    }
}

/// Where the handshake stands.  Each variant owns exactly the material
/// that phase needs; moving between them is the only way the material
/// moves, so key state can't outlive its phase.
pub enum HandshakeState {
    /// Nothing has happened yet; the first record must be a
    /// ClientHello.
    ExpectClientHello,

    /// Our hello flight is out; the ClientKeyExchange comes next.
    ExpectClientKeyExchange {
        suite: &'static SupportedCipherSuite,
        client_random: [u8; 32],
        server_random: [u8; 32],
        transcript: HandshakeTranscript,
    },

    /// Key material is derived and parked until the peer's
    /// ChangeCipherSpec activates it; then its Finished proves the
    /// handshake.  `pending` is (server-write, client-write).
    KeysExchanged {
        pending: Option<(CryptoContext, CryptoContext)>,
        secrets: SessionSecrets,
        transcript: HandshakeTranscript,
    },

    /// Application data flows.  A further ClientHello starts a
    /// renegotiation under the established ciphers.
    Traffic,
}

impl HandshakeState {
    pub fn is_established(&self) -> bool {
        matches!(self, HandshakeState::Traffic)
    }
}

fn parse_handshake(fragment: &[u8]) -> Result<HandshakeMessagePayload, Error> {
    let mut rd = Reader::init(fragment);
    let parsed = HandshakeMessagePayload::read(&mut rd);

    // one message per record; trailing bytes mean a peer we don't
    // support (coalesced or fragmented handshake flights)
    match parsed {
        Some(hs) if !rd.any_left() => Ok(hs),
        _ => Err(Error::CorruptMessagePayload(ContentType::Handshake)),
    }
}

fn inappropriate(got: ContentType, expect: &[ContentType]) -> Error {
    warn!("received a {:?} record while expecting {:?}", got, expect);
    Error::InappropriateMessage {
        expect_types: expect.to_vec(),
        got_type: got,
    }
}

fn inappropriate_handshake(got: HandshakeType, expect: &[HandshakeType]) -> Error {
    warn!(
        "received a {:?} handshake message while expecting {:?}",
        got, expect
    );
    Error::InappropriateHandshakeMessage {
        expect_types: expect.to_vec(),
        got_type: got,
    }
}

fn assemble(typ: HandshakeType, payload: HandshakePayload) -> Vec<u8> {
    HandshakeMessagePayload { typ, payload }.get_encoding()
}

/// Answer a ClientHello: pick the suite, draw our random, and emit the
/// ServerHello / Certificate / ServerHelloDone flight.  Also the
/// renegotiation entry point, in which case the established ciphers
/// keep protecting the records around this exchange.
fn handle_client_hello(
    config: &ServerConfig,
    raw: &[u8],
    client_hello: &ClientHelloPayload,
) -> Result<Transition, Error> {
    trace!("we got a clienthello {:?}", client_hello);

    if client_hello.client_version.get_u16() < ProtocolVersion::TLSv1_0.get_u16() {
        return Err(Error::PeerIncompatible(
            "client does not support TLSv1.0".to_string(),
        ));
    }

    if !client_hello
        .compression_methods
        .contains(&Compression::Null)
    {
        return Err(Error::PeerIncompatible(
            "client did not offer null compression".to_string(),
        ));
    }

    let suite = suites::choose_ciphersuite_preferring_client(
        &client_hello.cipher_suites,
        &suites::ALL_CIPHERSUITES,
    )
    .ok_or_else(|| Error::PeerIncompatible("no ciphersuites in common".to_string()))?;
    debug!("decided upon suite {:?}", suite);

    let mut server_random = [0u8; 32];
    config.fill_random(&mut server_random)?;

    let mut transcript = HandshakeTranscript::new();
    transcript.add(raw);

    let server_hello = assemble(
        HandshakeType::ServerHello,
        HandshakePayload::ServerHello(ServerHelloPayload {
            server_version: ProtocolVersion::TLSv1_0,
            random: Random(server_random),
            session_id: SessionID::empty(),
            cipher_suite: suite.suite,
            compression_method: Compression::Null,
            extensions: Vec::new(),
        }),
    );

    let certificate = assemble(
        HandshakeType::Certificate,
        HandshakePayload::Certificate(config.cert_chain.clone()),
    );

    let server_hello_done = assemble(HandshakeType::ServerHelloDone, HandshakePayload::ServerHelloDone);

    let mut output = Vec::new();
    for msg in &[&server_hello, &certificate, &server_hello_done] {
        transcript.add(msg);
        output.push(RecordCommand::Emit(ContentType::Handshake, msg.to_vec()));
    }

    Ok(Transition {
        next: HandshakeState::ExpectClientKeyExchange {
            suite,
            client_random: client_hello.random.0,
            server_random,
            transcript,
        },
        output,
        decrypter: DecrypterChange::Keep,
    })
}

/// Recover the pre-master secret from the ClientKeyExchange and derive
/// everything: master secret, key block, both pending directions.
fn handle_client_kx(
    config: &ServerConfig,
    raw: &[u8],
    ciphertext: &[u8],
    suite: &'static SupportedCipherSuite,
    client_random: [u8; 32],
    server_random: [u8; 32],
    mut transcript: HandshakeTranscript,
) -> Result<Transition, Error> {
    let plain = config.decrypt_pre_master(ciphertext)?;

    // the unpadded plaintext is the 48-byte pre-master itself; be
    // lenient about primitives that hand back a longer buffer, but
    // never a shorter one
    if plain.len() < 48 {
        return Err(Error::CryptoError);
    }
    let pms = &plain[plain.len() - 48..];

    let secrets = SessionSecrets::new(client_random, server_random, pms);
    let pending = new_crypto_pair(suite, &secrets);

    transcript.add(raw);
    debug!("key material derived, awaiting cipher change");

    Ok(Transition::quiet(HandshakeState::KeysExchanged {
        pending: Some(pending),
        secrets,
        transcript,
    }))
}

/// The peer's ChangeCipherSpec: activate its write cipher for the next
/// inbound record, and answer with our own ChangeCipherSpec followed by
/// the encryptor swap, in that order, so ours also crosses the wire
/// unprotected.
fn handle_ccs(
    fragment: &[u8],
    pending: Option<(CryptoContext, CryptoContext)>,
    secrets: SessionSecrets,
    transcript: HandshakeTranscript,
) -> Result<Transition, Error> {
    if ChangeCipherSpecPayload::read_bytes(fragment).is_none() {
        return Err(Error::CorruptMessagePayload(ContentType::ChangeCipherSpec));
    }

    let (server_write, client_write) = pending.ok_or_else(|| {
        warn!("second ChangeCipherSpec in one handshake");
        Error::PeerMisbehaved("duplicate ChangeCipherSpec".to_string())
    })?;

    trace!("installing new record ciphers");

    Ok(Transition {
        next: HandshakeState::KeysExchanged {
            pending: None,
            secrets,
            transcript,
        },
        output: vec![
            RecordCommand::Emit(
                ContentType::ChangeCipherSpec,
                ChangeCipherSpecPayload {}.get_encoding(),
            ),
            RecordCommand::ChangeEncrypter(server_write),
        ],
        decrypter: DecrypterChange::Activate(client_write),
    })
}

/// Check the peer's Finished against the transcript, then prove our own
/// side of it.  Our Finished is emitted after the encryptor swap, so it
/// is the first record of the new cipher epoch (sequence zero).
fn handle_finished(
    raw: &[u8],
    verify_data: &Payload,
    secrets: SessionSecrets,
    mut transcript: HandshakeTranscript,
) -> Result<Transition, Error> {
    let expect = secrets.client_verify_data(&transcript.concat());

    ring::constant_time::verify_slices_are_equal(&expect, &verify_data.0).map_err(|_| {
        warn!("peer Finished did not verify");
        Error::PeerMisbehaved("bad Finished verify_data".to_string())
    })?;

    // our verify_data additionally covers the peer's Finished message
    transcript.add(raw);
    let our_verify_data = secrets.server_verify_data(&transcript.concat());

    let finished = assemble(
        HandshakeType::Finished,
        HandshakePayload::Finished(Payload::new(our_verify_data)),
    );

    debug!("handshake complete");

    Ok(Transition {
        next: HandshakeState::Traffic,
        output: vec![RecordCommand::Emit(ContentType::Handshake, finished)],
        decrypter: DecrypterChange::Keep,
    })
}

/// Feed one decrypted record to the state machine.  Only the pairings
/// in the match below are legal; everything else is a protocol error
/// that ends the connection.
pub fn handle_record(
    state: HandshakeState,
    config: &ServerConfig,
    typ: ContentType,
    fragment: &[u8],
) -> Result<Transition, Error> {
    match state {
        HandshakeState::ExpectClientHello => match typ {
            ContentType::Handshake => {
                let hs = parse_handshake(fragment)?;
                match hs.payload {
                    HandshakePayload::ClientHello(ref ch) => {
                        handle_client_hello(config, fragment, ch)
                    }
                    _ => Err(inappropriate_handshake(hs.typ, &[HandshakeType::ClientHello])),
                }
            }
            _ => Err(inappropriate(typ, &[ContentType::Handshake])),
        },

        HandshakeState::ExpectClientKeyExchange {
            suite,
            client_random,
            server_random,
            transcript,
        } => match typ {
            ContentType::Handshake => {
                let hs = parse_handshake(fragment)?;
                match hs.payload {
                    HandshakePayload::ClientKeyExchange(ref ct) => handle_client_kx(
                        config,
                        fragment,
                        &ct.0,
                        suite,
                        client_random,
                        server_random,
                        transcript,
                    ),
                    _ => Err(inappropriate_handshake(
                        hs.typ,
                        &[HandshakeType::ClientKeyExchange],
                    )),
                }
            }
            _ => Err(inappropriate(typ, &[ContentType::Handshake])),
        },

        HandshakeState::KeysExchanged {
            pending,
            secrets,
            transcript,
        } => match typ {
            ContentType::ChangeCipherSpec => handle_ccs(fragment, pending, secrets, transcript),
            ContentType::Handshake => {
                let hs = parse_handshake(fragment)?;
                match hs.payload {
                    HandshakePayload::Finished(ref vd) => {
                        handle_finished(fragment, vd, secrets, transcript)
                    }
                    _ => Err(inappropriate_handshake(hs.typ, &[HandshakeType::Finished])),
                }
            }
            _ => Err(inappropriate(
                typ,
                &[ContentType::ChangeCipherSpec, ContentType::Handshake],
            )),
        },

        HandshakeState::Traffic => match typ {
            ContentType::Handshake => {
                let hs = parse_handshake(fragment)?;
                match hs.payload {
                    HandshakePayload::ClientHello(ref ch) => {
                        debug!("renegotiation requested");
                        handle_client_hello(config, fragment, ch)
                    }
                    _ => Err(inappropriate_handshake(hs.typ, &[HandshakeType::ClientHello])),
                }
            }
            _ => Err(inappropriate(typ, &[ContentType::Handshake])),
        },
    }
}
