use crate::prf;

use hmac::digest::Digest;
use md5::Md5;
use sha1::Sha1;
use zeroize::Zeroize;
use zeroize::Zeroizing;

fn join_randoms(first: &[u8; 32], second: &[u8; 32]) -> [u8; 64] {
    let mut randoms = [0u8; 64];
    randoms[..32].copy_from_slice(first);
    randoms[32..].copy_from_slice(second);
    randoms
}

/// The secrets of one handshake: both nonces and the master secret
/// derived from the pre-master.
pub struct SessionSecrets {
    pub client_random: [u8; 32],
    pub server_random: [u8; 32],
    master_secret: [u8; 48],
}

impl SessionSecrets {
    pub fn new(client_random: [u8; 32], server_random: [u8; 32], pms: &[u8]) -> SessionSecrets {
        let mut ret = SessionSecrets {
            client_random,
            server_random,
            master_secret: [0u8; 48],
        };

        let randoms = join_randoms(&ret.client_random, &ret.server_random);
        prf::prf(&mut ret.master_secret, pms, b"master secret", &randoms);
        ret
    }

    /// The key block for the record layer; the caller chops it up.
    //
    // nb. the randoms go in the opposite order to master-secret
    // derivation; RFC 2246 section 6.3 says so.
    pub fn make_key_block(&self, len: usize) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(vec![0u8; len]);

        let randoms = join_randoms(&self.server_random, &self.client_random);
        prf::prf(&mut out, &self.master_secret, b"key expansion", &randoms);
        out
    }

    /// Finished verify_data: 12 PRF bytes over the MD5 and SHA-1
    /// digests of the transcript.
    fn make_verify_data(&self, transcript: &[u8], label: &[u8]) -> Vec<u8> {
        let mut seed = [0u8; 36];
        seed[..16].copy_from_slice(&Md5::digest(transcript));
        seed[16..].copy_from_slice(&Sha1::digest(transcript));

        let mut out = vec![0u8; 12];
        prf::prf(&mut out, &self.master_secret, label, &seed);
        out
    }

    pub fn client_verify_data(&self, transcript: &[u8]) -> Vec<u8> {
        self.make_verify_data(transcript, b"client finished")
    }

    pub fn server_verify_data(&self, transcript: &[u8]) -> Vec<u8> {
        self.make_verify_data(transcript, b"server finished")
    }
}

impl Drop for SessionSecrets {
    fn drop(&mut self) {
        self.master_secret.zeroize();
    }
}

/// The handshake transcript: the exact byte buffers of every handshake
/// message seen or emitted, framing included, in protocol order.
/// Recording the wire bytes rather than re-serialising structures
/// guarantees the PRF sees the same octets the peer's did.
#[derive(Default)]
pub struct HandshakeTranscript {
    buffers: Vec<Vec<u8>>,
}

impl HandshakeTranscript {
    pub fn new() -> HandshakeTranscript {
        HandshakeTranscript { buffers: Vec::new() }
    }

    pub fn add(&mut self, raw: &[u8]) {
        self.buffers.push(raw.to_vec());
    }

    pub fn concat(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffers.iter().map(Vec::len).sum());
        for buf in &self.buffers {
            out.extend_from_slice(buf);
        }
        out
    }

    pub fn num_messages(&self) -> usize {
        self.buffers.len()
    }
}
