use rand::Rng;

use crate::edit::align::{Alignment, align_str};
use crate::foundation::error::EditMotionResult;
use crate::task::config::TaskConfig;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";

/// Alphabet for sampled strings. Never empty: no flags at all falls back to uppercase.
pub fn build_charset(cfg: &TaskConfig) -> Vec<char> {
    let mut chars = String::new();
    if cfg.use_mixed_case {
        chars.push_str(UPPER);
        chars.push_str(LOWER);
    } else {
        if cfg.use_uppercase {
            chars.push_str(UPPER);
        }
        if cfg.use_lowercase {
            chars.push_str(LOWER);
        }
    }
    if cfg.use_numbers {
        chars.push_str(DIGITS);
    }
    if chars.is_empty() {
        chars.push_str(UPPER);
    }
    chars.chars().collect()
}

/// A sampled source/target pair with its alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringPair {
    pub source: String,
    pub target: String,
    pub alignment: Alignment,
    pub attempts: usize,
    /// Whether the distance landed inside the requested window. `false` means the sampling
    /// budget ran out and the last candidate was kept.
    pub in_range: bool,
}

#[derive(Clone, Debug)]
pub struct PairSampler {
    charset: Vec<char>,
    min_len: usize,
    max_len: usize,
    min_dist: usize,
    max_dist: usize,
    max_attempts: usize,
}

impl PairSampler {
    /// Fails on configs that [`TaskConfig::validate`] rejects, e.g. a zero minimum length.
    pub fn from_config(cfg: &TaskConfig) -> EditMotionResult<Self> {
        cfg.validate()?;
        Ok(Self {
            charset: build_charset(cfg),
            min_len: cfg.min_string_length,
            max_len: cfg.max_string_length,
            min_dist: cfg.min_edit_distance,
            max_dist: cfg.max_edit_distance,
            max_attempts: cfg.max_attempts,
        })
    }

    pub fn charset(&self) -> &[char] {
        &self.charset
    }

    /// Draw a source string, then draw targets until one lands inside the distance window.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> StringPair {
        let source_len = rng.gen_range(self.min_len..=self.max_len);
        let source = self.random_string(rng, source_len);

        let lo = source_len.saturating_sub(self.max_dist).max(1);
        let hi = source_len + self.max_dist;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let target_len = rng.gen_range(lo..=hi);
            let target = self.random_string(rng, target_len);
            let alignment = align_str(&source, &target);
            let in_range = (self.min_dist..=self.max_dist).contains(&alignment.distance);

            if in_range || attempts >= self.max_attempts {
                if !in_range {
                    tracing::warn!(
                        attempts,
                        distance = alignment.distance,
                        min = self.min_dist,
                        max = self.max_dist,
                        "sampling budget exhausted, keeping last pair"
                    );
                }
                return StringPair {
                    source,
                    target,
                    alignment,
                    attempts,
                    in_range,
                };
            }
        }
    }

    fn random_string<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> String {
        (0..len)
            .map(|_| self.charset[rng.gen_range(0..self.charset.len())])
            .collect()
    }
}
