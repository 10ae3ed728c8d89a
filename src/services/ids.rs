//! Book identifier generation

use rand::{distributions::Alphanumeric, Rng};

/// Length of generated book ids
pub const BOOK_ID_LENGTH: usize = 16;

#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random alphanumeric ids (62 symbol alphabet) drawn from the thread-local CSPRNG
#[derive(Debug, Clone, Copy)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(BOOK_ID_LENGTH)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
