#[macro_use]
mod macros;

pub mod codec;

pub mod base;
pub mod enums;

pub mod alert;
pub mod ccs;
pub mod handshake;
pub mod message;

pub mod deframer;
