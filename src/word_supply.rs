use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, SessionError};
use crate::language::Language;

/// Strategy for ordering the words drawn from a pool
pub trait WordSelector: Send {
    /// Select `count` words from `pool`. Callers have already checked that
    /// `count` fits in the pool.
    fn select_words(&self, pool: &[String], count: usize) -> Vec<String>;
}

/// Fresh shuffle of the whole pool, truncated to `count`
pub struct RandomSelector;

impl WordSelector for RandomSelector {
    fn select_words(&self, pool: &[String], count: usize) -> Vec<String> {
        shuffled_prefix(pool, count, &mut rand::thread_rng())
    }
}

/// Pool order, no randomization. Handy for scripted sessions and tests.
pub struct SequentialSelector;

impl WordSelector for SequentialSelector {
    fn select_words(&self, pool: &[String], count: usize) -> Vec<String> {
        pool.iter().take(count).cloned().collect()
    }
}

fn shuffled_prefix<R: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut R) -> Vec<String> {
    pool.choose_multiple(rng, count).cloned().collect()
}

/// Draws `n` words from `pool` in random order.
///
/// Fails with `InvalidConfiguration` when `n` is zero or larger than the pool;
/// the count is never clamped.
pub fn draw(pool: &[String], n: usize) -> Result<Vec<String>> {
    check_count(pool.len(), n)?;
    Ok(RandomSelector.select_words(pool, n))
}

fn check_count(pool_size: usize, n: usize) -> Result<()> {
    if pool_size == 0 {
        return Err(SessionError::invalid("word pool is empty"));
    }
    if n == 0 {
        return Err(SessionError::invalid("number of words must be at least 1"));
    }
    if n > pool_size {
        return Err(SessionError::invalid(format!(
            "requested {n} words but the pool only has {pool_size}"
        )));
    }
    Ok(())
}

/// Holds the pool for a session and produces a new word sequence on every draw
pub struct WordSupply {
    pool: Vec<String>,
    number_of_words: usize,
    selector: Box<dyn WordSelector>,
}

impl std::fmt::Debug for WordSupply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordSupply")
            .field("pool_size", &self.pool.len())
            .field("number_of_words", &self.number_of_words)
            .finish()
    }
}

impl WordSupply {
    pub fn new(language: Language, number_of_words: usize) -> Result<Self> {
        Self::with_selector(language, number_of_words, Box::new(RandomSelector))
    }

    pub fn with_selector(
        language: Language,
        number_of_words: usize,
        selector: Box<dyn WordSelector>,
    ) -> Result<Self> {
        check_count(language.words.len(), number_of_words)?;
        Ok(Self {
            pool: language.words,
            number_of_words,
            selector,
        })
    }

    pub fn number_of_words(&self) -> usize {
        self.number_of_words
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn draw(&self) -> Vec<String> {
        self.selector.select_words(&self.pool, self.number_of_words)
    }
}
