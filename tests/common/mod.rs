//! A minimal TLS 1.0 client for driving the engine from the outside.
//!
//! Everything here is written longhand against the RFC: its own PRF,
//! its own record protection, hand-assembled handshake bytes.  Nothing
//! is shared with the library internals, so an engine bug can't cancel
//! itself out in the tests.

#![allow(dead_code)]

use relictls::{Certificate, Event, PrivateKey, ServerConfig, ServerEngine, SystemRandom};

use cipher::block_padding::NoPadding;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use sha1::Sha1;

use std::sync::{Arc, OnceLock};

pub const SUITE_3DES: u16 = 0x000a;
pub const SUITE_AES_128: u16 = 0x002f;
pub const SUITE_AES_256: u16 = 0x0035;
pub const SUITE_NULL: u16 = 0x0000;

// One RSA key for the whole test binary; keygen is the slow part.
static TEST_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

pub fn test_key() -> &'static RsaPrivateKey {
    TEST_KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("rsa keygen")
    })
}

pub fn test_cert() -> Certificate {
    // the engine treats certificates as opaque DER; any bytes do
    Certificate(vec![0x30, 0x82, 0x01, 0x0a, 0xde, 0xad, 0xbe, 0xef])
}

pub fn make_config() -> Arc<ServerConfig> {
    let _ = env_logger::builder().is_test(true).try_init();

    let der = test_key().to_pkcs1_der().expect("key encode");
    let config = ServerConfig::new(
        vec![test_cert()],
        &PrivateKey(der.as_bytes().to_vec()),
        Box::new(SystemRandom::new()),
    )
    .expect("config");
    Arc::new(config)
}

// ---- wire assembly ----------------------------------------------------

pub fn record(typ: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![typ, 0x03, 0x01];
    out.extend_from_slice(&(body.len() as u16).to_be_bytes());
    out.extend_from_slice(body);
    out
}

pub fn handshake_msg(typ: u8, body: &[u8]) -> Vec<u8> {
    let len = body.len() as u32;
    let mut out = vec![typ, (len >> 16) as u8, (len >> 8) as u8, len as u8];
    out.extend_from_slice(body);
    out
}

pub fn client_hello_msg(random: &[u8; 32], suites: &[u16]) -> Vec<u8> {
    let mut body = vec![0x03, 0x01];
    body.extend_from_slice(random);
    body.push(0); // empty session id
    body.extend_from_slice(&((suites.len() * 2) as u16).to_be_bytes());
    for suite in suites {
        body.extend_from_slice(&suite.to_be_bytes());
    }
    body.push(1); // one compression method:
    body.push(0); // null
    handshake_msg(1, &body)
}

/// Split engine output into (type, body) records, checking each header
/// claims version {3,1}.
pub fn split_records(mut buf: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut out = Vec::new();
    while !buf.is_empty() {
        assert!(buf.len() >= 5, "trailing partial record");
        assert_eq!(&buf[1..3], &[0x03, 0x01], "record version");
        let len = u16::from_be_bytes([buf[3], buf[4]]) as usize;
        assert!(buf.len() >= 5 + len, "record length overruns buffer");
        out.push((buf[0], buf[5..5 + len].to_vec()));
        buf = &buf[5 + len..];
    }
    out
}

// ---- RFC 2246 crypto, longhand ----------------------------------------

pub fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <Hmac<Md5> as Mac>::new_from_slice(key).unwrap();
    for p in parts {
        mac.update(p);
    }
    mac.finalize().into_bytes().to_vec()
}

pub fn hmac_sha1(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <Hmac<Sha1> as Mac>::new_from_slice(key).unwrap();
    for p in parts {
        mac.update(p);
    }
    mac.finalize().into_bytes().to_vec()
}

pub fn prf10(len: usize, secret: &[u8], label: &[u8], seed: &[u8]) -> Vec<u8> {
    let mut label_seed = label.to_vec();
    label_seed.extend_from_slice(seed);

    let half = (secret.len() + 1) / 2;
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    let mut md5_stream = Vec::new();
    let mut a = hmac_md5(s1, &[&label_seed]);
    while md5_stream.len() < len {
        md5_stream.extend(hmac_md5(s1, &[&a, &label_seed]));
        a = hmac_md5(s1, &[&a]);
    }

    let mut sha_stream = Vec::new();
    let mut a = hmac_sha1(s2, &[&label_seed]);
    while sha_stream.len() < len {
        sha_stream.extend(hmac_sha1(s2, &[&a, &label_seed]));
        a = hmac_sha1(s2, &[&a]);
    }

    md5_stream[..len]
        .iter()
        .zip(&sha_stream[..len])
        .map(|(m, s)| m ^ s)
        .collect()
}

pub fn verify_data(master: &[u8], label: &[u8], transcript: &[u8]) -> Vec<u8> {
    let mut seed = Vec::new();
    seed.extend_from_slice(&Md5::digest(transcript));
    seed.extend_from_slice(&Sha1::digest(transcript));
    prf10(12, master, label, &seed)
}

fn mac_header(seq: u64, typ: u8, len: usize) -> [u8; 13] {
    let mut hdr = [0u8; 13];
    hdr[..8].copy_from_slice(&seq.to_be_bytes());
    hdr[8] = typ;
    hdr[9] = 0x03;
    hdr[10] = 0x01;
    hdr[11..].copy_from_slice(&(len as u16).to_be_bytes());
    hdr
}

/// One direction of 3DES_EDE_CBC_SHA record protection, IVs chained
/// record to record as TLS 1.0 demands.
pub struct Direction {
    mac_key: Vec<u8>,
    key: Vec<u8>,
    iv: Vec<u8>,
    seq: u64,
}

impl Direction {
    pub fn new(mac_key: &[u8], key: &[u8], iv: &[u8]) -> Direction {
        Direction {
            mac_key: mac_key.to_vec(),
            key: key.to_vec(),
            iv: iv.to_vec(),
            seq: 0,
        }
    }

    /// Protect `fragment` and return a whole record, header included.
    pub fn seal(&mut self, typ: u8, fragment: &[u8]) -> Vec<u8> {
        let mac = hmac_sha1(
            &self.mac_key,
            &[&mac_header(self.seq, typ, fragment.len()), fragment],
        );

        let mut data = fragment.to_vec();
        data.extend_from_slice(&mac);
        let pad = 8 - 1 - data.len() % 8;
        data.extend(std::iter::repeat(pad as u8).take(pad + 1));

        let enc = cbc::Encryptor::<des::TdesEde3>::new_from_slices(&self.key, &self.iv).unwrap();
        let len = data.len();
        enc.encrypt_padded_mut::<NoPadding>(&mut data, len).unwrap();

        self.iv = data[data.len() - 8..].to_vec();
        self.seq += 1;
        record(typ, &data)
    }

    /// Open a record body, verifying padding and MAC.
    pub fn open(&mut self, typ: u8, body: &[u8]) -> Vec<u8> {
        assert!(!body.is_empty() && body.len() % 8 == 0, "bad ciphertext length");
        let next_iv = body[body.len() - 8..].to_vec();

        let mut data = body.to_vec();
        let dec = cbc::Decryptor::<des::TdesEde3>::new_from_slices(&self.key, &self.iv).unwrap();
        dec.decrypt_padded_mut::<NoPadding>(&mut data).unwrap();
        self.iv = next_iv;

        let pad = *data.last().unwrap() as usize;
        assert!(data.len() >= pad + 1, "padding overruns record");
        for &b in &data[data.len() - pad - 1..] {
            assert_eq!(b as usize, pad, "inconsistent padding");
        }
        data.truncate(data.len() - pad - 1);

        assert!(data.len() >= 20, "record shorter than its MAC");
        let fragment = data[..data.len() - 20].to_vec();
        let mac = &data[data.len() - 20..];
        let want = hmac_sha1(
            &self.mac_key,
            &[&mac_header(self.seq, typ, fragment.len()), &fragment],
        );
        assert_eq!(mac, &want[..], "record MAC");

        self.seq += 1;
        fragment
    }
}

// ---- the client half of a handshake -----------------------------------

/// Handshake progress, kept in the open so tests can go off-script
/// after any step.
pub struct Flow {
    pub transcript: Vec<u8>,
    pub client_random: [u8; 32],
    pub server_random: [u8; 32],
    pub master: Vec<u8>,
    pub to_server: Option<Direction>,
    pub from_server: Option<Direction>,
}

/// Both directions of an established connection, client-side.
pub struct Client {
    pub to_server: Direction,
    pub from_server: Direction,
}

/// Send a ClientHello offering 3DES and check the returned flight:
/// ServerHello {3,1} / Certificate / ServerHelloDone.
pub fn start(engine: &mut ServerEngine) -> Flow {
    let client_random = [0x11u8; 32];
    let ch = client_hello_msg(&client_random, &[SUITE_3DES]);

    let out = engine.handle(&record(22, &ch)).expect("client hello");
    let flight = split_records(&out);
    assert_eq!(flight.len(), 3, "hello flight");
    assert!(flight.iter().all(|(typ, _)| *typ == 22));

    // ServerHello: {3,1}, our suite, empty session id, null compression
    let sh = &flight[0].1;
    assert_eq!(sh[0], 2);
    let sh_body = &sh[4..];
    assert_eq!(&sh_body[..2], &[0x03, 0x01]);
    let mut server_random = [0u8; 32];
    server_random.copy_from_slice(&sh_body[2..34]);
    assert_eq!(sh_body[34], 0);
    assert_eq!(&sh_body[35..37], &SUITE_3DES.to_be_bytes());
    assert_eq!(sh_body[37], 0);
    assert_eq!(sh_body.len(), 38);

    // Certificate carries the configured chain
    let cert = &flight[1].1;
    assert_eq!(cert[0], 11);
    let cert_der = test_cert().0;
    assert!(cert
        .windows(cert_der.len())
        .any(|w| w == &cert_der[..]), "configured certificate missing");

    // ServerHelloDone is empty
    assert_eq!(flight[2].1, handshake_msg(14, &[]));

    let mut transcript = ch;
    for (_, msg) in &flight {
        transcript.extend_from_slice(msg);
    }

    Flow {
        transcript,
        client_random,
        server_random,
        master: Vec::new(),
        to_server: None,
        from_server: None,
    }
}

pub fn fixed_pre_master() -> [u8; 48] {
    let mut pms = [0u8; 48];
    pms[0] = 0x03;
    pms[1] = 0x01;
    for (i, b) in pms.iter_mut().enumerate().skip(2) {
        *b = i as u8;
    }
    pms
}

pub fn encrypt_to_server(plain: &[u8]) -> Vec<u8> {
    test_key()
        .to_public_key()
        .encrypt(&mut rand::thread_rng(), Pkcs1v15Encrypt, plain)
        .expect("rsa encrypt")
}

pub fn client_kx_msg(rsa_ciphertext: &[u8]) -> Vec<u8> {
    let mut body = (rsa_ciphertext.len() as u16).to_be_bytes().to_vec();
    body.extend_from_slice(rsa_ciphertext);
    handshake_msg(16, &body)
}

impl Flow {
    /// Send the ClientKeyExchange and derive the same key material the
    /// server should now hold.
    pub fn exchange_keys(&mut self, engine: &mut ServerEngine) {
        let pms = fixed_pre_master();
        let kx = client_kx_msg(&encrypt_to_server(&pms));

        let out = engine.handle(&record(22, &kx)).expect("client key exchange");
        assert!(out.is_empty(), "no records owed after ClientKeyExchange");
        self.transcript.extend_from_slice(&kx);

        let mut randoms = self.client_random.to_vec();
        randoms.extend_from_slice(&self.server_random);
        self.master = prf10(48, &pms, b"master secret", &randoms);

        let mut randoms_rev = self.server_random.to_vec();
        randoms_rev.extend_from_slice(&self.client_random);
        let kb = prf10(104, &self.master, b"key expansion", &randoms_rev);

        // client MAC, server MAC, client key, server key, client IV, server IV
        self.to_server = Some(Direction::new(&kb[0..20], &kb[40..64], &kb[88..96]));
        self.from_server = Some(Direction::new(&kb[20..40], &kb[64..88], &kb[96..104]));
    }

    /// Send ChangeCipherSpec and Finished in one buffer, and check the
    /// server's answering pair: a plaintext CCS, then a Finished under
    /// the fresh cipher at sequence zero.
    pub fn finish(mut self, engine: &mut ServerEngine) -> Client {
        let mut to_server = self.to_server.take().expect("exchange_keys first");
        let mut from_server = self.from_server.take().expect("exchange_keys first");

        let fin = handshake_msg(20, &verify_data(&self.master, b"client finished", &self.transcript));

        let mut buf = record(20, &[0x01]);
        buf.extend(to_server.seal(22, &fin));
        let out = engine.handle(&buf).expect("finished");
        self.transcript.extend_from_slice(&fin);

        let reply = split_records(&out);
        assert_eq!(reply.len(), 2, "expected CCS + Finished");
        assert_eq!(reply[0].0, 20);
        assert_eq!(reply[0].1, vec![0x01], "server CCS must be plaintext");

        assert_eq!(reply[1].0, 22);
        let server_fin = from_server.open(22, &reply[1].1);
        let want = handshake_msg(20, &verify_data(&self.master, b"server finished", &self.transcript));
        assert_eq!(server_fin, want, "server Finished verify_data");

        let events = engine.take_events();
        assert!(events.contains(&Event::HandshakeComplete));

        Client {
            to_server,
            from_server,
        }
    }
}

/// The whole happy path: returns the client's working record ciphers.
pub fn handshake(engine: &mut ServerEngine) -> Client {
    let mut flow = start(engine);
    flow.exchange_keys(engine);
    flow.finish(engine)
}
