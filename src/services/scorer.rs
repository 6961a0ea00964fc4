// src/services/scorer.rs

//! Composite weight used to order titles within a group.
//!
//! - rank: mean of `11 - min(rank, 10)` over all ranks
//! - frequency: `min(count, 10) * 10`
//! - hotness: share of ranks at or above the threshold, times 100

use crate::models::WeightConfig;

/// Rank assumed for titles observed without any rank.
pub const MISSING_RANK: u32 = 99;

#[derive(Debug, Clone, Copy)]
pub struct WeightScorer {
    weights: WeightConfig,
    rank_threshold: u32,
}

impl WeightScorer {
    pub fn new(weights: WeightConfig, rank_threshold: u32) -> Self {
        Self {
            weights,
            rank_threshold,
        }
    }

    /// Score a title from its ranks and occurrence count.
    pub fn score(&self, ranks: &[u32], occurrence_count: u32) -> f64 {
        let ranks: &[u32] = if ranks.is_empty() {
            &[MISSING_RANK]
        } else {
            ranks
        };
        let n = ranks.len() as f64;

        let rank_component = ranks
            .iter()
            .map(|&r| f64::from(11 - r.min(10)))
            .sum::<f64>()
            / n;

        let freq_component = f64::from(occurrence_count.min(10)) * 10.0;

        let hot = ranks.iter().filter(|&&r| r <= self.rank_threshold).count() as f64;
        let hot_component = hot / n * 100.0;

        rank_component * self.weights.rank_weight
            + freq_component * self.weights.frequency_weight
            + hot_component * self.weights.hotness_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> WeightScorer {
        WeightScorer::new(WeightConfig::default(), 5)
    }

    #[test]
    fn test_known_value() {
        // rank: (10 + 8) / 2 = 9, freq: 30, hot: 100
        let score = scorer().score(&[1, 3], 3);
        let expected = 9.0 * 0.6 + 30.0 * 0.3 + 100.0 * 0.1;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ranks_default() {
        let s = scorer();
        assert_eq!(s.score(&[], 1), s.score(&[MISSING_RANK], 1));
    }

    #[test]
    fn test_monotonic_in_rank() {
        let s = scorer();
        let mut previous = f64::INFINITY;
        for rank in 1..=20 {
            let score = s.score(&[rank], 4);
            assert!(score <= previous, "rank {rank} scored higher");
            previous = score;
        }
    }

    #[test]
    fn test_count_capped_at_ten() {
        let s = scorer();
        assert_eq!(s.score(&[2], 10), s.score(&[2], 25));
        assert!(s.score(&[2], 3) < s.score(&[2], 4));
    }
}
