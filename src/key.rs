/// A single certificate by value: DER-encoded X.509, sent verbatim in
/// the Certificate message.  The engine never inspects its contents.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Certificate(pub Vec<u8>);

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An RSA private key by value: DER-encoded ASN.1 in either PKCS#8 or
/// PKCS#1 form.  Parsed once at configuration time.
#[derive(Clone, Eq, PartialEq)]
pub struct PrivateKey(pub Vec<u8>);

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        // never dump key bytes into logs
        write!(f, "PrivateKey(..)")
    }
}
