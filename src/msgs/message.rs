use crate::msgs::alert::AlertMessagePayload;
use crate::msgs::base::Payload;
use crate::msgs::ccs::ChangeCipherSpecPayload;
use crate::msgs::codec::{encode_u16, read_u16, Codec, Reader};
use crate::msgs::enums::{AlertDescription, AlertLevel, ContentType, HandshakeType, ProtocolVersion};
use crate::msgs::handshake::HandshakeMessagePayload;

#[derive(Debug)]
pub enum MessagePayload {
    Alert(AlertMessagePayload),
    Handshake(HandshakeMessagePayload),
    ChangeCipherSpec(ChangeCipherSpecPayload),
    Opaque(Payload),
}

impl MessagePayload {
    pub fn encode(&self, bytes: &mut Vec<u8>) {
        match *self {
            MessagePayload::Alert(ref x) => x.encode(bytes),
            MessagePayload::Handshake(ref x) => x.encode(bytes),
            MessagePayload::ChangeCipherSpec(ref x) => x.encode(bytes),
            MessagePayload::Opaque(ref x) => x.encode(bytes),
        }
    }

    /// Parse an opaque payload as `typ` dictates.  Fails on a parse
    /// error or on trailing bytes after the parsed message.
    pub fn decode_given_type(&self, typ: ContentType) -> Option<MessagePayload> {
        if let MessagePayload::Opaque(ref payload) = *self {
            let mut r = Reader::init(&payload.0);
            let parsed = match typ {
                ContentType::Alert => {
                    MessagePayload::Alert(try_ret!(AlertMessagePayload::read(&mut r)))
                }
                ContentType::Handshake => {
                    MessagePayload::Handshake(try_ret!(HandshakeMessagePayload::read(&mut r)))
                }
                ContentType::ChangeCipherSpec => {
                    MessagePayload::ChangeCipherSpec(try_ret!(ChangeCipherSpecPayload::read(&mut r)))
                }
                _ => return None,
            };

            if r.any_left() {
                None
            } else {
                Some(parsed)
            }
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            MessagePayload::Alert(ref x) => x.len(),
            MessagePayload::Handshake(ref x) => x.len(),
            MessagePayload::ChangeCipherSpec(ref x) => x.len(),
            MessagePayload::Opaque(ref x) => x.len(),
        }
    }

    pub fn opaque(data: &[u8]) -> MessagePayload {
        MessagePayload::Opaque(Payload::from_slice(data))
    }
}

/// A TLS record, named TLSPlaintext in the standard.
#[derive(Debug)]
pub struct Message {
    pub typ: ContentType,
    pub version: ProtocolVersion,
    pub payload: MessagePayload,
}

impl Codec for Message {
    fn read(r: &mut Reader) -> Option<Message> {
        let typ = try_ret!(ContentType::read(r));
        let version = try_ret!(ProtocolVersion::read(r));
        let len = try_ret!(read_u16(r));

        let mut sub = try_ret!(r.sub(len as usize));
        let payload = try_ret!(Payload::read(&mut sub));

        Some(Message {
            typ,
            version,
            payload: MessagePayload::Opaque(payload),
        })
    }

    fn encode(&self, bytes: &mut Vec<u8>) {
        self.typ.encode(bytes);
        self.version.encode(bytes);
        encode_u16(self.payload.len() as u16, bytes);
        self.payload.encode(bytes);
    }
}

impl Message {
    pub fn is_content_type(&self, typ: ContentType) -> bool {
        self.typ == typ
    }

    pub fn is_handshake_type(&self, hstyp: HandshakeType) -> bool {
        if let MessagePayload::Handshake(ref hsp) = self.payload {
            hsp.typ == hstyp
        } else {
            false
        }
    }

    /// Take an opaque payload's bytes, leaving an empty one behind.
    pub fn take_opaque_payload(&mut self) -> Option<Payload> {
        if let MessagePayload::Opaque(ref mut op) = self.payload {
            Some(std::mem::replace(op, Payload::empty()))
        } else {
            None
        }
    }

    pub fn build_alert(level: AlertLevel, desc: AlertDescription) -> Message {
        Message {
            typ: ContentType::Alert,
            version: ProtocolVersion::TLSv1_0,
            payload: MessagePayload::Alert(AlertMessagePayload {
                level,
                description: desc,
            }),
        }
    }
}
