use crate::msgs::codec::{read_u8, Codec, Reader};

/// The one-byte ChangeCipherSpec message; the single legal body is 0x01.
#[derive(Debug)]
pub struct ChangeCipherSpecPayload;

impl Codec for ChangeCipherSpecPayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        bytes.push(1u8);
    }

    fn read(r: &mut Reader) -> Option<ChangeCipherSpecPayload> {
        let typ = try_ret!(read_u8(r));

        if typ == 1 && !r.any_left() {
            Some(ChangeCipherSpecPayload {})
        } else {
            None
        }
    }
}

impl ChangeCipherSpecPayload {
    pub fn len(&self) -> usize {
        1
    }
}
