use crate::error::Error;
use crate::msgs::codec::{Codec, Reader};
use crate::msgs::message::Message;

/// Split `input` into complete records.
///
/// The engine never buffers a partial record: if the final record's
/// declared length runs past the end of `input` (or a bare header
/// fragment is left over), the whole call fails and the connection is
/// unrecoverable.  Reassembly of partial reads is the host's job.
pub fn deframe(input: &[u8]) -> Result<Vec<Message>, Error> {
    let mut rd = Reader::init(input);
    let mut frames = Vec::new();

    while rd.any_left() {
        match Message::read(&mut rd) {
            Some(m) => frames.push(m),
            None => return Err(Error::UnexpectedFragment),
        }
    }

    Ok(frames)
}
