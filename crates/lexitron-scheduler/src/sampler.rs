//! Roulette-wheel selection over weighted candidates.

use crate::anti_repeat::AntiRepeatBuffer;
use crate::models::Word;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::borrow::Borrow;

/// Weight multiplier for the previously drawn index.
pub const FORBIDDEN_PENALTY: f64 = 0.0001;

/// Draws the next card. Owns the RNG and the anti-repeat history.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    rng: ChaCha8Rng,
    anti_repeat: AntiRepeatBuffer,
}

impl WeightedSampler {
    /// Create a sampler. Without a seed the RNG is seeded from the thread RNG.
    pub fn new(anti_repeat: AntiRepeatBuffer, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            anti_repeat,
        }
    }

    pub fn anti_repeat(&self) -> &AntiRepeatBuffer {
        &self.anti_repeat
    }

    pub fn anti_repeat_mut(&mut self) -> &mut AntiRepeatBuffer {
        &mut self.anti_repeat
    }

    /// Bernoulli draw with probability `p`, clamped to `[0, 1]`.
    pub fn chance(&mut self, p: f64) -> bool {
        let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
        self.rng.gen_bool(p)
    }

    /// Pick an index of `deck` with probability proportional to `weight`.
    ///
    /// The `forbidden` index keeps a tiny share of its weight, so it is never
    /// fully excluded. An empty deck yields 0; callers guard against that.
    pub fn sample_index<W, F>(&mut self, deck: &[W], forbidden: Option<usize>, weight: F) -> usize
    where
        W: Borrow<Word>,
        F: Fn(&Word) -> f64,
    {
        if deck.is_empty() {
            return 0;
        }

        let weights: Vec<f64> = deck
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let base = weight(w.borrow());
                let base = if base.is_finite() && base > 0.0 { base } else { 0.0 };
                let penalty = if Some(i) == forbidden { FORBIDDEN_PENALTY } else { 1.0 };
                base * penalty
            })
            .collect();
        let total: f64 = weights.iter().sum();

        if total > 0.0 && total.is_finite() {
            let mut r = self.rng.gen::<f64>() * total;
            for (i, w) in weights.iter().enumerate() {
                r -= w;
                if r <= 0.0 {
                    return i;
                }
            }
        }

        self.rng.gen_range(0..deck.len())
    }

    /// Filter `pool` through the anti-repeat buffer, draw one word avoiding
    /// `previous`, and remember it.
    pub fn pick<'a, F>(&mut self, pool: &'a [Word], previous: Option<&str>, weight: F) -> Option<&'a Word>
    where
        F: Fn(&Word) -> f64,
    {
        let candidates = self.anti_repeat.filter_candidates(pool);
        if candidates.is_empty() {
            return None;
        }
        let forbidden = previous.and_then(|id| candidates.iter().position(|w| w.id == id));
        let index = self.sample_index(&candidates, forbidden, weight);
        let word = candidates[index];
        self.anti_repeat.remember(&word.id);
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn deck(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word::new(format!("w{i}"), format!("f{i}"), format!("b{i}")))
            .collect()
    }

    fn sampler(seed: u64) -> WeightedSampler {
        WeightedSampler::new(AntiRepeatBuffer::new(5), Some(seed))
    }

    #[test]
    fn test_empty_deck_returns_zero() {
        let mut s = sampler(1);
        let empty: Vec<Word> = Vec::new();
        assert_eq!(s.sample_index(&empty, None, |_| 1.0), 0);
        assert!(s.pick(&empty, None, |_| 1.0).is_none());
    }

    #[test]
    fn test_forbidden_index_rarely_drawn() {
        let words = deck(2);
        let mut s = sampler(7);
        let weight = |w: &Word| if w.id == "w0" { 10.0 } else { 1.0 };
        let hits = (0..20_000)
            .filter(|_| s.sample_index(&words, Some(0), weight) == 0)
            .count();
        // Expected share is 10 * 0.0001 / (10 * 0.0001 + 1), just under 0.001.
        assert!((5..60).contains(&hits), "forbidden index drawn {hits} times");
    }

    #[test]
    fn test_weights_shift_distribution() {
        let words = deck(2);
        let mut s = sampler(11);
        let weight = |w: &Word| if w.id == "w0" { 9.0 } else { 1.0 };
        let hits = (0..10_000)
            .filter(|_| s.sample_index(&words, None, weight) == 0)
            .count();
        assert!((8_500..9_500).contains(&hits), "heavy word drawn {hits} times");
    }

    #[test]
    fn test_zero_weights_fall_back_to_uniform() {
        let words = deck(3);
        let mut s = sampler(3);
        for _ in 0..100 {
            assert!(s.sample_index(&words, None, |_| 0.0) < 3);
            assert!(s.sample_index(&words, None, |_| f64::NAN) < 3);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let words = deck(10);
        let mut a = sampler(42);
        let mut b = sampler(42);
        for _ in 0..50 {
            assert_eq!(
                a.sample_index(&words, None, |_| 1.0),
                b.sample_index(&words, None, |_| 1.0)
            );
        }
    }

    #[test]
    fn test_pick_avoids_recent_words() {
        let words = deck(6);
        let mut s = sampler(5);
        let mut previous: Option<String> = None;
        let mut last_five: Vec<String> = Vec::new();
        for _ in 0..30 {
            let word = s.pick(&words, previous.as_deref(), |_| 1.0).unwrap();
            assert!(!last_five.contains(&word.id));
            last_five.push(word.id.clone());
            if last_five.len() > 5 {
                last_five.remove(0);
            }
            previous = Some(word.id.clone());
        }
    }

    #[test]
    fn test_pick_single_word_deck_repeats() {
        let words = deck(1);
        let mut s = sampler(9);
        let first = s.pick(&words, None, |_| 1.0).unwrap().id.clone();
        let second = s.pick(&words, Some(&first), |_| 1.0).unwrap();
        assert_eq!(second.id, first);
    }

    #[test]
    fn test_chance_bounds() {
        let mut s = sampler(2);
        assert!(!s.chance(0.0));
        assert!(s.chance(1.0));
        assert!(!s.chance(f64::NAN));
        assert!(s.chance(7.0));
    }

    proptest! {
        #[test]
        fn prop_index_in_range(
            n in 1usize..50,
            forbidden in prop::option::of(0usize..60),
            seed in any::<u64>(),
        ) {
            let words = deck(n);
            let mut s = sampler(seed);
            let index = s.sample_index(&words, forbidden, |w| w.id.len() as f64);
            prop_assert!(index < n);
        }
    }
}
