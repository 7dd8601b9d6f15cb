/// Unwrap an `Option` mid-parse, bailing out of the surrounding `read`
/// with `None` if the buffer ran dry.
macro_rules! try_ret(
    ($e:expr) => (match $e { Some(x) => x, None => return None })
);

/// Define a wire enum: a closed set of named code points over a one- or
/// two-byte carrier, with an `Unknown` fallback so parsing never fails
/// on a value we merely don't recognise.
macro_rules! wire_enum {
    (u8, $name:ident, { $( $var:ident => $val:expr ),* $(,)? }) => {
        #[allow(non_camel_case_types)]
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub enum $name {
            $( $var, )*
            Unknown(u8),
        }

        impl $name {
            pub fn get_u8(&self) -> u8 {
                match *self {
                    $( $name::$var => $val, )*
                    $name::Unknown(v) => v,
                }
            }
        }

        impl crate::msgs::codec::Codec for $name {
            fn encode(&self, bytes: &mut Vec<u8>) {
                bytes.push(self.get_u8());
            }

            fn read(r: &mut crate::msgs::codec::Reader) -> Option<Self> {
                Some(match try_ret!(crate::msgs::codec::read_u8(r)) {
                    $( $val => $name::$var, )*
                    v => $name::Unknown(v),
                })
            }
        }
    };
    (u16, $name:ident, { $( $var:ident => $val:expr ),* $(,)? }) => {
        #[allow(non_camel_case_types)]
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub enum $name {
            $( $var, )*
            Unknown(u16),
        }

        impl $name {
            pub fn get_u16(&self) -> u16 {
                match *self {
                    $( $name::$var => $val, )*
                    $name::Unknown(v) => v,
                }
            }
        }

        impl crate::msgs::codec::Codec for $name {
            fn encode(&self, bytes: &mut Vec<u8>) {
                crate::msgs::codec::encode_u16(self.get_u16(), bytes);
            }

            fn read(r: &mut crate::msgs::codec::Reader) -> Option<Self> {
                Some(match try_ret!(crate::msgs::codec::read_u16(r)) {
                    $( $val => $name::$var, )*
                    v => $name::Unknown(v),
                })
            }
        }
    };
}
