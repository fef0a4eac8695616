use std::sync::Mutex;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Produces the presentation order of a new exam attempt.
pub trait QuestionShuffler: Send + Sync {
    fn shuffle(&self, question_ids: &mut [String]);
}

/// Uniform permutation from the thread-local generator.
#[derive(Debug, Default)]
pub struct RandomShuffler;

impl QuestionShuffler for RandomShuffler {
    fn shuffle(&self, question_ids: &mut [String]) {
        let mut rng = rand::rng();
        question_ids.shuffle(&mut rng);
    }
}

/// Reproducible permutations from a fixed seed.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl QuestionShuffler for SeededShuffler {
    fn shuffle(&self, question_ids: &mut [String]) {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        question_ids.shuffle(&mut *rng);
    }
}
