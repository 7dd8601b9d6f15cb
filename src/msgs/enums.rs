#![allow(clippy::upper_case_acronyms)]

wire_enum! {u8, ContentType, {
    ChangeCipherSpec => 0x14,
    Alert => 0x15,
    Handshake => 0x16,
    ApplicationData => 0x17,
}}

wire_enum! {u16, ProtocolVersion, {
    SSLv2 => 0x0200,
    SSLv3 => 0x0300,
    TLSv1_0 => 0x0301,
    TLSv1_1 => 0x0302,
    TLSv1_2 => 0x0303,
}}

wire_enum! {u8, HandshakeType, {
    HelloRequest => 0x00,
    ClientHello => 0x01,
    ServerHello => 0x02,
    Certificate => 0x0b,
    ServerKeyExchange => 0x0c,
    CertificateRequest => 0x0d,
    ServerHelloDone => 0x0e,
    CertificateVerify => 0x0f,
    ClientKeyExchange => 0x10,
    Finished => 0x14,
}}

wire_enum! {u16, CipherSuite, {
    TLS_NULL_WITH_NULL_NULL => 0x0000,
    TLS_RSA_WITH_RC4_128_MD5 => 0x0004,
    TLS_RSA_WITH_RC4_128_SHA => 0x0005,
    TLS_RSA_WITH_3DES_EDE_CBC_SHA => 0x000a,
    TLS_RSA_WITH_AES_128_CBC_SHA => 0x002f,
    TLS_RSA_WITH_AES_256_CBC_SHA => 0x0035,
}}

wire_enum! {u8, Compression, {
    Null => 0x00,
    Deflate => 0x01,
}}

wire_enum! {u8, AlertLevel, {
    Warning => 0x01,
    Fatal => 0x02,
}}

wire_enum! {u8, AlertDescription, {
    CloseNotify => 0x00,
    UnexpectedMessage => 0x0a,
    BadRecordMac => 0x14,
    DecryptionFailed => 0x15,
    RecordOverflow => 0x16,
    DecompressionFailure => 0x1e,
    HandshakeFailure => 0x28,
    BadCertificate => 0x2a,
    UnsupportedCertificate => 0x2b,
    CertificateRevoked => 0x2c,
    CertificateExpired => 0x2d,
    CertificateUnknown => 0x2e,
    IllegalParameter => 0x2f,
    UnknownCA => 0x30,
    AccessDenied => 0x31,
    DecodeError => 0x32,
    DecryptError => 0x33,
    ExportRestriction => 0x3c,
    ProtocolVersion => 0x46,
    InsufficientSecurity => 0x47,
    InternalError => 0x50,
    UserCanceled => 0x5a,
    NoRenegotiation => 0x64,
}}
