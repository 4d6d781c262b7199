//! Stimulus sequence generation.
//!
//! A generator turns [`SequenceParams`] into a [`StimulusSequence`] with a
//! controlled number of N-back matches. The seeded generator is reproducible
//! so a round can be replayed from its seed.

use std::collections::VecDeque;

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

use crate::{GameConfig, StimulusSequence};

/// Inputs to sequence generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceParams {
    /// Number of stimuli.
    pub length: usize,
    /// Symbols are drawn from `0..symbol_space`.
    pub symbol_space: u8,
    /// Number of positions `i >= n_back` with `seq[i] == seq[i - n_back]`.
    pub match_count: usize,
    /// Comparison distance.
    pub n_back: usize,
}

impl From<&GameConfig> for SequenceParams {
    fn from(config: &GameConfig) -> Self {
        Self {
            length: config.length(),
            symbol_space: config.symbol_space(),
            match_count: config.match_count(),
            n_back: config.n_back(),
        }
    }
}

/// Produces the stimulus sequence for a new round.
pub trait SequenceGenerator: Send {
    /// Generates a sequence for the given parameters.
    fn generate(&mut self, params: &SequenceParams) -> StimulusSequence;
}

/// Random generator embedding exactly the requested number of matches.
///
/// Match positions are chosen uniformly among `n_back..length`. Every other
/// position gets a symbol that differs from its N-back partner, so no
/// accidental matches appear. Requests that cannot be satisfied (fewer than
/// two symbols, more matches than comparable positions) are clamped.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededGenerator {
    /// Creates a generator with the given seed.
    #[instrument]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a generator with a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn pick_symbol(&mut self, symbol_space: u8, avoid: Option<u8>) -> u8 {
        match avoid {
            Some(avoid) if symbol_space >= 2 => {
                // Draw from one fewer symbol and skip over the avoided one.
                let pick = self.rng.gen_range(0..symbol_space - 1);
                if pick >= avoid { pick + 1 } else { pick }
            }
            _ => self.rng.gen_range(0..symbol_space.max(1)),
        }
    }
}

impl SequenceGenerator for SeededGenerator {
    #[instrument(skip(self), fields(seed = self.seed))]
    fn generate(&mut self, params: &SequenceParams) -> StimulusSequence {
        let comparable = params.length.saturating_sub(params.n_back);
        let mut match_count = params.match_count.min(comparable);
        if params.symbol_space < 2 {
            // Every comparable position is forced to match.
            match_count = comparable;
        }
        if match_count != params.match_count {
            warn!(
                requested = params.match_count,
                embedded = match_count,
                "Match count clamped to what the parameters allow"
            );
        }

        let mut is_match = vec![false; params.length];
        for offset in index::sample(&mut self.rng, comparable, match_count) {
            is_match[params.n_back + offset] = true;
        }

        let mut symbols = Vec::with_capacity(params.length);
        for (i, &matched) in is_match.iter().enumerate() {
            let partner = i
                .checked_sub(params.n_back)
                .filter(|_| params.n_back > 0)
                .map(|j| symbols[j]);
            let symbol = match partner {
                Some(earlier) if matched => earlier,
                _ => self.pick_symbol(params.symbol_space, partner),
            };
            symbols.push(symbol);
        }

        let sequence = StimulusSequence::new(symbols);
        debug!(symbols = ?sequence.symbols(), "Generated sequence");
        sequence
    }
}

/// Replays pre-recorded sequences in order.
///
/// Once the queue is exhausted the last sequence is repeated, so a session
/// can be restarted any number of times.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator {
    queue: VecDeque<StimulusSequence>,
    last: StimulusSequence,
}

impl ScriptedGenerator {
    /// Creates a generator replaying the given sequences.
    pub fn new(sequences: impl IntoIterator<Item = StimulusSequence>) -> Self {
        Self {
            queue: sequences.into_iter().collect(),
            last: StimulusSequence::default(),
        }
    }

    /// Creates a generator that always returns `symbols`.
    pub fn repeating(symbols: Vec<u8>) -> Self {
        Self::new([StimulusSequence::new(symbols)])
    }
}

impl SequenceGenerator for ScriptedGenerator {
    fn generate(&mut self, _params: &SequenceParams) -> StimulusSequence {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(length: usize, symbol_space: u8, match_count: usize, n_back: usize) -> SequenceParams {
        SequenceParams {
            length,
            symbol_space,
            match_count,
            n_back,
        }
    }

    #[test]
    fn test_embeds_exact_match_count() {
        let mut generator = SeededGenerator::new(7);
        for n_back in 1..4 {
            for match_count in 0..=6 {
                let seq = generator.generate(&params(10, 9, match_count, n_back));
                assert_eq!(seq.len(), 10);
                assert_eq!(seq.match_count(n_back), match_count, "n_back={n_back}");
            }
        }
    }

    #[test]
    fn test_symbols_stay_in_range() {
        let mut generator = SeededGenerator::new(99);
        let seq = generator.generate(&params(200, 4, 50, 2));
        assert!(seq.symbols().iter().all(|&s| s < 4));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let p = params(20, 9, 6, 2);
        let a = SeededGenerator::new(42).generate(&p);
        let b = SeededGenerator::new(42).generate(&p);
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_symbols_still_avoid_accidental_matches() {
        let mut generator = SeededGenerator::new(3);
        let seq = generator.generate(&params(30, 2, 0, 1));
        assert_eq!(seq.match_count(1), 0);
    }

    #[test]
    fn test_excess_matches_clamped() {
        let mut generator = SeededGenerator::new(1);
        let seq = generator.generate(&params(5, 9, 10, 2));
        assert_eq!(seq.match_count(2), 3);
    }

    #[test]
    fn test_scripted_replays_then_repeats_last() {
        let mut generator = ScriptedGenerator::new([
            StimulusSequence::new(vec![1, 2]),
            StimulusSequence::new(vec![3, 4]),
        ]);
        let p = params(2, 9, 0, 1);
        assert_eq!(generator.generate(&p).symbols(), &[1, 2]);
        assert_eq!(generator.generate(&p).symbols(), &[3, 4]);
        assert_eq!(generator.generate(&p).symbols(), &[3, 4]);
    }
}
