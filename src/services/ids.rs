//! Book id generation

use rand::{distributions::Alphanumeric, Rng};

#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Produce an opaque id. Collisions are possible but must be unlikely.
    fn generate(&self) -> String;
}

/// Fixed-length random alphanumeric ids
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
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
