use crate::msgs::enums::CipherSuite;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyExchangeAlgorithm {
    /// The client encrypts the pre-master secret to our certificate's
    /// RSA key; there is no ServerKeyExchange message.
    RSA,
}

#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BulkAlgorithm {
    TRIPLE_DES_EDE_CBC,
    AES_128_CBC,
    AES_256_CBC,
    RC4_128,
}

impl BulkAlgorithm {
    /// Block size in bytes; stream ciphers have none.
    pub fn block_size(&self) -> Option<usize> {
        match *self {
            BulkAlgorithm::TRIPLE_DES_EDE_CBC => Some(8),
            BulkAlgorithm::AES_128_CBC | BulkAlgorithm::AES_256_CBC => Some(16),
            BulkAlgorithm::RC4_128 => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        self.block_size().is_none()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MACAlgorithm {
    MD5,
    SHA1,
}

impl MACAlgorithm {
    /// Digest length, which for HMAC is also the MAC length.
    pub fn mac_len(&self) -> usize {
        match *self {
            MACAlgorithm::MD5 => 16,
            MACAlgorithm::SHA1 => 20,
        }
    }
}

/// A cipher suite supported by this engine.  The suite identifier is
/// the single source of truth for every algorithm choice downstream.
#[derive(Debug)]
pub struct SupportedCipherSuite {
    /// The TLS enumeration naming this suite.
    pub suite: CipherSuite,
    pub kx: KeyExchangeAlgorithm,
    pub bulk: BulkAlgorithm,
    pub mac: MACAlgorithm,
    pub mac_key_len: usize,
    pub enc_key_len: usize,
    pub fixed_iv_len: usize,
}

impl PartialEq for SupportedCipherSuite {
    fn eq(&self, other: &SupportedCipherSuite) -> bool {
        self.suite == other.suite
    }
}

impl SupportedCipherSuite {
    /// How much key block the two directions consume between them.
    pub fn key_block_len(&self) -> usize {
        (self.mac_key_len + self.enc_key_len + self.fixed_iv_len) * 2
    }

    pub fn mac_len(&self) -> usize {
        self.mac.mac_len()
    }
}

pub static TLS_RSA_WITH_3DES_EDE_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA,
    kx: KeyExchangeAlgorithm::RSA,
    bulk: BulkAlgorithm::TRIPLE_DES_EDE_CBC,
    mac: MACAlgorithm::SHA1,
    mac_key_len: 20,
    enc_key_len: 24,
    fixed_iv_len: 8,
};

pub static TLS_RSA_WITH_AES_128_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
    kx: KeyExchangeAlgorithm::RSA,
    bulk: BulkAlgorithm::AES_128_CBC,
    mac: MACAlgorithm::SHA1,
    mac_key_len: 20,
    enc_key_len: 16,
    fixed_iv_len: 16,
};

pub static TLS_RSA_WITH_AES_256_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
    kx: KeyExchangeAlgorithm::RSA,
    bulk: BulkAlgorithm::AES_256_CBC,
    mac: MACAlgorithm::SHA1,
    mac_key_len: 20,
    enc_key_len: 32,
    fixed_iv_len: 16,
};

pub static TLS_RSA_WITH_RC4_128_SHA: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_RC4_128_SHA,
    kx: KeyExchangeAlgorithm::RSA,
    bulk: BulkAlgorithm::RC4_128,
    mac: MACAlgorithm::SHA1,
    mac_key_len: 20,
    enc_key_len: 16,
    fixed_iv_len: 0,
};

pub static TLS_RSA_WITH_RC4_128_MD5: SupportedCipherSuite = SupportedCipherSuite {
    suite: CipherSuite::TLS_RSA_WITH_RC4_128_MD5,
    kx: KeyExchangeAlgorithm::RSA,
    bulk: BulkAlgorithm::RC4_128,
    mac: MACAlgorithm::MD5,
    mac_key_len: 16,
    enc_key_len: 16,
    fixed_iv_len: 0,
};

/// Every suite this engine will negotiate, in our order of preference.
pub static ALL_CIPHERSUITES: [&SupportedCipherSuite; 5] = [
    &TLS_RSA_WITH_AES_256_CBC_SHA,
    &TLS_RSA_WITH_AES_128_CBC_SHA,
    &TLS_RSA_WITH_3DES_EDE_CBC_SHA,
    &TLS_RSA_WITH_RC4_128_SHA,
    &TLS_RSA_WITH_RC4_128_MD5,
];

/// Pick the first of the client's suites that we also support.
pub fn choose_ciphersuite_preferring_client(
    client_suites: &[CipherSuite],
    server_suites: &[&'static SupportedCipherSuite],
) -> Option<&'static SupportedCipherSuite> {
    for client_suite in client_suites {
        if let Some(selected) = server_suites.iter().find(|x| *client_suite == x.suite) {
            return Some(*selected);
        }
    }

    None
}
