//! Stimulus sequences.

use serde::{Deserialize, Serialize};

/// One presented symbol and where it sits in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stimulus {
    /// Position in the sequence.
    pub index: usize,
    /// Symbol code at that position.
    pub value: u8,
}

/// Ordered, immutable list of symbol codes for one round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StimulusSequence {
    symbols: Vec<u8>,
}

impl StimulusSequence {
    /// Wraps a list of symbol codes.
    pub fn new(symbols: Vec<u8>) -> Self {
        Self { symbols }
    }

    /// Number of stimuli.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the sequence has no stimuli.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.symbols.get(index).copied()
    }

    /// All symbols in order.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Stimuli in presentation order.
    pub fn stimuli(&self) -> impl Iterator<Item = Stimulus> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, &value)| Stimulus { index, value })
    }

    /// Whether the symbol at `index` repeats the one `n_back` steps earlier.
    ///
    /// Positions before `n_back` and out-of-range positions are never matches.
    pub fn is_match(&self, index: usize, n_back: usize) -> bool {
        if n_back == 0 || index < n_back {
            return false;
        }
        match (self.get(index), self.get(index - n_back)) {
            (Some(current), Some(earlier)) => current == earlier,
            _ => false,
        }
    }

    /// Number of positions that are N-back matches.
    pub fn match_count(&self, n_back: usize) -> usize {
        (0..self.len()).filter(|&i| self.is_match(i, n_back)).count()
    }
}

impl From<Vec<u8>> for StimulusSequence {
    fn from(symbols: Vec<u8>) -> Self {
        Self::new(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_match_compares_n_back() {
        let seq = StimulusSequence::new(vec![2, 5, 2, 7, 7, 7]);
        assert!(seq.is_match(2, 2));
        assert!(!seq.is_match(3, 2));
        assert!(seq.is_match(5, 2));
        assert!(seq.is_match(4, 1));
    }

    #[test]
    fn test_early_and_out_of_range_positions_never_match() {
        let seq = StimulusSequence::new(vec![1, 1, 1]);
        assert!(!seq.is_match(0, 2));
        assert!(!seq.is_match(1, 2));
        assert!(!seq.is_match(3, 2));
        assert!(!seq.is_match(2, 0));
    }

    #[test]
    fn test_match_count() {
        let seq = StimulusSequence::new(vec![3, 1, 4, 3, 1, 4, 3, 1, 9]);
        assert_eq!(seq.match_count(2), 0);
        assert_eq!(seq.match_count(3), 5);
    }

    #[test]
    fn test_stimuli_enumerate_in_order() {
        let seq = StimulusSequence::from(vec![4, 0]);
        let stimuli: Vec<_> = seq.stimuli().collect();
        assert_eq!(
            stimuli,
            vec![
                Stimulus { index: 0, value: 4 },
                Stimulus { index: 1, value: 0 }
            ]
        );
    }
}
