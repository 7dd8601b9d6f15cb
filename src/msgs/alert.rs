use crate::msgs::codec::{Codec, Reader};
use crate::msgs::enums::{AlertDescription, AlertLevel};

#[derive(Debug, Clone)]
pub struct AlertMessagePayload {
    pub level: AlertLevel,
    pub description: AlertDescription,
}

impl Codec for AlertMessagePayload {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.level.encode(bytes);
        self.description.encode(bytes);
    }

    fn read(r: &mut Reader) -> Option<AlertMessagePayload> {
        let level = try_ret!(AlertLevel::read(r));
        let description = try_ret!(AlertDescription::read(r));

        Some(AlertMessagePayload { level, description })
    }
}

impl AlertMessagePayload {
    pub fn len(&self) -> usize {
        2
    }
}
