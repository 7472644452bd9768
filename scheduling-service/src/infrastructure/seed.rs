use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::seed::SeedSource;

/// Mixes the wall clock with thread-local randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSeedSource;

impl SeedSource for RandomSeedSource {
    fn next_seed(&self) -> u64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);
        millis ^ rand::random::<u64>()
    }
}
