//! Keypair sources for the search loop.

use crate::crypto::Keypair;

/// Produces one candidate keypair per search attempt.
pub trait KeypairSource: Send {
    fn next_keypair(&mut self) -> Keypair;
}

/// Fresh keypairs from the OS RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeypairSource;

impl KeypairSource for OsKeypairSource {
    #[inline]
    fn next_keypair(&mut self) -> Keypair {
        Keypair::generate()
    }
}

/// Any closure returning keypairs is a source.
impl<F> KeypairSource for F
where
    F: FnMut() -> Keypair + Send,
{
    fn next_keypair(&mut self) -> Keypair {
        self()
    }
}
