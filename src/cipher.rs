use crate::error::Error;
use crate::msgs::codec;
use crate::msgs::enums::{ContentType, ProtocolVersion};
use crate::session::SessionSecrets;
use crate::suites::{BulkAlgorithm, MACAlgorithm, SupportedCipherSuite};

use cipher::block_padding::NoPadding;
use cipher::{BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit,
             KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use md5::Md5;
use rc4::consts::U16;
use rc4::Rc4;
use sha1::Sha1;
use zeroize::Zeroize;

/// The record MAC covers a 13-byte pseudo-header before the fragment:
/// sequence (8) ++ type (1) ++ version (2) ++ length (2), all
/// big-endian.
fn make_mac_header(seq: u64, typ: ContentType, vers: ProtocolVersion, len: usize) -> [u8; 13] {
    let mut hdr = [0u8; 13];
    codec::put_u64(seq, &mut hdr[0..8]);
    hdr[8] = typ.get_u8();
    codec::put_u16(vers.get_u16(), &mut hdr[9..11]);
    codec::put_u16(len as u16, &mut hdr[11..13]);
    hdr
}

fn hmac_parts<M: Mac + hmac::digest::KeyInit>(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key)
        .expect("hmac accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().to_vec()
}

fn record_mac(
    alg: MACAlgorithm,
    key: &[u8],
    seq: u64,
    typ: ContentType,
    vers: ProtocolVersion,
    fragment: &[u8],
) -> Vec<u8> {
    let hdr = make_mac_header(seq, typ, vers, fragment.len());
    match alg {
        MACAlgorithm::MD5 => hmac_parts::<Hmac<Md5>>(key, &[&hdr, fragment]),
        MACAlgorithm::SHA1 => hmac_parts::<Hmac<Sha1>>(key, &[&hdr, fragment]),
    }
}

fn cbc_encrypt_in_place<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), Error>
where
    C: BlockCipher + BlockEncrypt + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::General("cipher key/iv length mismatch".to_string()))?;
    let len = buf.len();
    enc.encrypt_padded_mut::<NoPadding>(buf, len)
        .map_err(|_| Error::General("cbc encrypt failed".to_string()))?;
    Ok(())
}

fn cbc_decrypt_in_place<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), Error>
where
    C: BlockCipher + BlockDecrypt + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::General("cipher key/iv length mismatch".to_string()))?;
    dec.decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|_| Error::DecryptError)?;
    Ok(())
}

fn block_encrypt(alg: BulkAlgorithm, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), Error> {
    match alg {
        BulkAlgorithm::TRIPLE_DES_EDE_CBC => cbc_encrypt_in_place::<des::TdesEde3>(key, iv, buf),
        BulkAlgorithm::AES_128_CBC => cbc_encrypt_in_place::<aes::Aes128>(key, iv, buf),
        BulkAlgorithm::AES_256_CBC => cbc_encrypt_in_place::<aes::Aes256>(key, iv, buf),
        BulkAlgorithm::RC4_128 => Err(Error::General("stream suite in block path".to_string())),
    }
}

fn block_decrypt(alg: BulkAlgorithm, key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), Error> {
    match alg {
        BulkAlgorithm::TRIPLE_DES_EDE_CBC => cbc_decrypt_in_place::<des::TdesEde3>(key, iv, buf),
        BulkAlgorithm::AES_128_CBC => cbc_decrypt_in_place::<aes::Aes128>(key, iv, buf),
        BulkAlgorithm::AES_256_CBC => cbc_decrypt_in_place::<aes::Aes256>(key, iv, buf),
        BulkAlgorithm::RC4_128 => Err(Error::General("stream suite in block path".to_string())),
    }
}

/// The bulk-cipher half of a direction's state.  Stream suites own a
/// live keystream; block suites thread the running IV from record to
/// record (TLS 1.0's chained-IV rule -- the interoperability
/// requirement that earned this protocol version BEAST).
enum BulkState {
    Stream(Rc4<U16>),
    Block { iv: Vec<u8> },
}

/// Everything one direction needs to protect or open records: the
/// sequence counter, the MAC secret, the cipher key and its running
/// state.  Created with sequence zero; a new one is installed at every
/// ChangeCipherSpec.
///
/// Deliberately not `Clone`: the RC4 keystream is live state, and a
/// copied context would reuse it.
pub struct CryptoContext {
    suite: &'static SupportedCipherSuite,
    seq: u64,
    mac_key: Vec<u8>,
    enc_key: Vec<u8>,
    bulk: BulkState,
}

impl CryptoContext {
    pub fn new(
        suite: &'static SupportedCipherSuite,
        mac_key: &[u8],
        key: &[u8],
        iv: &[u8],
    ) -> CryptoContext {
        debug_assert_eq!(mac_key.len(), suite.mac_key_len);
        debug_assert_eq!(key.len(), suite.enc_key_len);
        debug_assert_eq!(iv.len(), suite.fixed_iv_len);

        let bulk = if suite.bulk.is_stream() {
            BulkState::Stream(
                <Rc4<U16> as KeyInit>::new_from_slice(key)
                    .expect("suite table and key block lengths agree"),
            )
        } else {
            BulkState::Block { iv: iv.to_vec() }
        };

        CryptoContext {
            suite,
            seq: 0,
            mac_key: mac_key.to_vec(),
            enc_key: key.to_vec(),
            bulk,
        }
    }

    pub fn suite(&self) -> &'static SupportedCipherSuite {
        self.suite
    }

    pub fn sequence(&self) -> u64 {
        self.seq
    }

    /// Protect one record's plaintext: MAC, pad (block suites), apply
    /// the cipher, bump the sequence.
    pub fn encrypt(
        &mut self,
        typ: ContentType,
        vers: ProtocolVersion,
        plain: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mac = record_mac(self.suite.mac, &self.mac_key, self.seq, typ, vers, plain);

        let mut buf = Vec::with_capacity(plain.len() + mac.len() + 17);
        buf.extend_from_slice(plain);
        buf.extend_from_slice(&mac);

        match self.bulk {
            BulkState::Stream(ref mut rc4) => {
                rc4.apply_keystream(&mut buf);
            }
            BulkState::Block { ref mut iv } => {
                let bs = self.suite.bulk.block_size().unwrap();

                // pad_len+1 trailing bytes, each holding pad_len
                let pad_len = bs - 1 - (buf.len() % bs);
                for _ in 0..=pad_len {
                    buf.push(pad_len as u8);
                }

                block_encrypt(self.suite.bulk, &self.enc_key, iv, &mut buf)?;

                // next record chains off our last ciphertext block
                iv.copy_from_slice(&buf[buf.len() - bs..]);
            }
        }

        self.seq += 1;
        Ok(buf)
    }

    /// Open one record: apply the inverse cipher, strip and check
    /// padding (block suites), verify the MAC, bump the sequence.
    pub fn decrypt(
        &mut self,
        typ: ContentType,
        vers: ProtocolVersion,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut buf = ciphertext.to_vec();

        match self.bulk {
            BulkState::Stream(ref mut rc4) => {
                rc4.apply_keystream(&mut buf);
            }
            BulkState::Block { ref mut iv } => {
                let bs = self.suite.bulk.block_size().unwrap();
                if buf.is_empty() || buf.len() % bs != 0 {
                    return Err(Error::DecryptError);
                }

                let next_iv = buf[buf.len() - bs..].to_vec();
                block_decrypt(self.suite.bulk, &self.enc_key, iv, &mut buf)?;

                let pad_len = buf[buf.len() - 1] as usize;
                if buf.len() < pad_len + 1 {
                    return Err(Error::DecryptError);
                }

                let unpadded = buf.len() - pad_len - 1;
                if buf[unpadded..].iter().any(|&b| b as usize != pad_len) {
                    return Err(Error::DecryptError);
                }
                buf.truncate(unpadded);

                *iv = next_iv;
            }
        }

        let mac_len = self.suite.mac_len();
        if buf.len() < mac_len {
            return Err(Error::DecryptError);
        }

        let body_len = buf.len() - mac_len;
        let want_mac = record_mac(
            self.suite.mac,
            &self.mac_key,
            self.seq,
            typ,
            vers,
            &buf[..body_len],
        );
        ring::constant_time::verify_slices_are_equal(&want_mac, &buf[body_len..])
            .map_err(|_| Error::DecryptError)?;

        buf.truncate(body_len);
        self.seq += 1;
        Ok(buf)
    }
}

impl Drop for CryptoContext {
    fn drop(&mut self) {
        self.mac_key.zeroize();
        self.enc_key.zeroize();
    }
}

/// A direction's record protection: identity until a ChangeCipherSpec
/// installs a real context.
pub enum CryptoState {
    Plain,
    Active(CryptoContext),
}

impl CryptoState {
    pub fn is_active(&self) -> bool {
        matches!(self, CryptoState::Active(_))
    }

    pub fn encrypt(
        &mut self,
        typ: ContentType,
        vers: ProtocolVersion,
        plain: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match self {
            CryptoState::Plain => Ok(plain.to_vec()),
            CryptoState::Active(ctx) => ctx.encrypt(typ, vers, plain),
        }
    }

    pub fn decrypt(
        &mut self,
        typ: ContentType,
        vers: ProtocolVersion,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match self {
            CryptoState::Plain => Ok(ciphertext.to_vec()),
            CryptoState::Active(ctx) => ctx.decrypt(typ, vers, ciphertext),
        }
    }
}

/// Chop a fresh key block into the two per-direction contexts.
///
/// RFC 2246 section 6.3 fixes the order: client MAC, server MAC,
/// client key, server key, client IV, server IV.  Returns
/// (server-write, client-write); for this server those are the
/// encryptor and decryptor respectively.
pub fn new_crypto_pair(
    suite: &'static SupportedCipherSuite,
    secrets: &SessionSecrets,
) -> (CryptoContext, CryptoContext) {
    let key_block = secrets.make_key_block(suite.key_block_len());

    let mut offs = 0;
    let client_write_mac_key = &key_block[offs..offs + suite.mac_key_len];
    offs += suite.mac_key_len;
    let server_write_mac_key = &key_block[offs..offs + suite.mac_key_len];
    offs += suite.mac_key_len;
    let client_write_key = &key_block[offs..offs + suite.enc_key_len];
    offs += suite.enc_key_len;
    let server_write_key = &key_block[offs..offs + suite.enc_key_len];
    offs += suite.enc_key_len;
    let client_write_iv = &key_block[offs..offs + suite.fixed_iv_len];
    offs += suite.fixed_iv_len;
    let server_write_iv = &key_block[offs..offs + suite.fixed_iv_len];

    (
        CryptoContext::new(suite, server_write_mac_key, server_write_key, server_write_iv),
        CryptoContext::new(suite, client_write_mac_key, client_write_key, client_write_iv),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites;

    fn matched_contexts(suite: &'static SupportedCipherSuite) -> (CryptoContext, CryptoContext) {
        let mac_key = vec![0x0b; suite.mac_key_len];
        let key = vec![0x1c; suite.enc_key_len];
        let iv = vec![0x2d; suite.fixed_iv_len];
        (
            CryptoContext::new(suite, &mac_key, &key, &iv),
            CryptoContext::new(suite, &mac_key, &key, &iv),
        )
    }

    fn roundtrip_suite(suite: &'static SupportedCipherSuite) {
        let (mut tx, mut rx) = matched_contexts(suite);

        for msg in &[&b"hello"[..], &[0u8; 0][..], &[0x55; 200][..]] {
            let wire = tx
                .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, msg)
                .unwrap();
            assert_ne!(&wire[..], *msg);
            let plain = rx
                .decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &wire)
                .unwrap();
            assert_eq!(&plain[..], *msg);
        }

        assert_eq!(tx.sequence(), 3);
        assert_eq!(rx.sequence(), 3);
    }

    #[test]
    fn roundtrip_all_suites() {
        for suite in &suites::ALL_CIPHERSUITES {
            roundtrip_suite(suite);
        }
    }

    #[test]
    fn ciphertext_is_padded_to_block_size() {
        let (mut tx, _) = matched_contexts(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA);
        let wire = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"x")
            .unwrap();
        assert_eq!(wire.len() % 8, 0);
        // 1 byte body + 20 byte MAC + at least one padding byte
        assert!(wire.len() >= 24);
    }

    #[test]
    fn chained_iv_links_records() {
        let (mut tx, mut rx) = matched_contexts(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA);

        let first = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"one")
            .unwrap();
        let second = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"two")
            .unwrap();

        // the running IV after record N is record N's last ciphertext block
        match &tx.bulk {
            BulkState::Block { iv } => assert_eq!(&iv[..], &second[second.len() - 8..]),
            _ => unreachable!(),
        }

        // decryption only works in emission order
        rx.decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &first)
            .unwrap();
        rx.decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &second)
            .unwrap();
    }

    #[test]
    fn tampered_mac_rejected() {
        let (mut tx, mut rx) = matched_contexts(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA);
        let mut wire = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"payload")
            .unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0x01;

        assert_eq!(
            rx.decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &wire),
            Err(Error::DecryptError)
        );
    }

    #[test]
    fn wrong_sequence_rejected() {
        let (mut tx, mut rx) = matched_contexts(&suites::TLS_RSA_WITH_RC4_128_SHA);
        let wire1 = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"a")
            .unwrap();
        let wire2 = tx
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"b")
            .unwrap();

        // skipping a record desynchronises the MAC sequence
        let _ = wire1;
        assert!(rx
            .decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &wire2)
            .is_err());
    }

    #[test]
    fn wrong_content_type_rejected() {
        let (mut tx, mut rx) = matched_contexts(&suites::TLS_RSA_WITH_AES_128_CBC_SHA);
        let wire = tx
            .encrypt(ContentType::Handshake, ProtocolVersion::TLSv1_0, b"finished")
            .unwrap();
        assert!(rx
            .decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &wire)
            .is_err());
    }

    #[test]
    fn short_block_record_rejected() {
        let (_, mut rx) = matched_contexts(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA);
        assert_eq!(
            rx.decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &[0u8; 7]),
            Err(Error::DecryptError)
        );
    }

    #[test]
    fn key_block_chop_directions_interoperate() {
        let secrets = SessionSecrets::new([3u8; 32], [4u8; 32], &[0x66; 48]);
        let (mut server_write, _) = new_crypto_pair(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA, &secrets);
        let (_, mut client_write_again) =
            new_crypto_pair(&suites::TLS_RSA_WITH_3DES_EDE_CBC_SHA, &secrets);

        // server-write and client-write are distinct keys
        let wire = server_write
            .encrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, b"msg")
            .unwrap();
        assert!(client_write_again
            .decrypt(ContentType::ApplicationData, ProtocolVersion::TLSv1_0, &wire)
            .is_err());
    }
}
