use crate::error::Error;

/// A source of cryptographically secure random bytes, supplied to
/// [`crate::ServerConfig`] at construction.  The engine draws from it
/// exactly once per handshake, for the 32-byte server random.
pub trait SecureRandom: Send + Sync {
    /// Fill the whole of `bytes` with random material.
    fn fill(&self, bytes: &mut [u8]) -> Result<(), Error>;
}

/// The operating system's randomness, the source nearly every host
/// wants.
pub struct SystemRandom {
    inner: ring::rand::SystemRandom,
}

impl SystemRandom {
    pub fn new() -> SystemRandom {
        SystemRandom {
            inner: ring::rand::SystemRandom::new(),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> SystemRandom {
        SystemRandom::new()
    }
}

impl SecureRandom for SystemRandom {
    fn fill(&self, bytes: &mut [u8]) -> Result<(), Error> {
        ring::rand::SecureRandom::fill(&self.inner, bytes).map_err(|_| Error::FailedToGetRandomBytes)
    }
}
