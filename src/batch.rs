//! Deterministic skip-gram batch generation over an encoded corpus.
//!
//! A [`BatchGenerator`] slides a window of `2 * skip_window + 1` positions along the corpus,
//! wrapping around at the end.  Every window contributes `2 * skip_window` rows pairing its middle
//! token (the target) with each surrounding token (the contexts), left to right.  The generator
//! remembers where it stopped, so successive batches are contiguous and cycle over the corpus
//! forever.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;
use crate::error::{Result, SkipgramError};
use crate::vocab::{EncodedCorpus, TokenId};

/// One batch of `(target, context)` rows stored as two parallel columns.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    /// Target id of each row.
    pub targets: Vec<TokenId>,
    /// Context id of each row.
    pub contexts: Vec<TokenId>,
}

impl Batch {
    /// Creates an empty batch able to hold `rows` rows without reallocating.
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            targets: Vec::with_capacity(rows),
            contexts: Vec::with_capacity(rows),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true when the batch holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates over `(target, context)` rows.
    pub fn pairs(&self) -> impl ExactSizeIterator<Item = (TokenId, TokenId)> + '_ {
        self.targets
            .iter()
            .copied()
            .zip(self.contexts.iter().copied())
    }

    fn clear(&mut self) {
        self.targets.clear();
        self.contexts.clear();
    }

    fn push(&mut self, target: TokenId, context: TokenId) {
        self.targets.push(target);
        self.contexts.push(context);
    }
}

/// Stateful producer of skip-gram batches with a persistent cursor.
///
/// Generation takes `&mut self`; independent streams over the same data use separate generators
/// built from clones of one [`EncodedCorpus`].
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    corpus: EncodedCorpus,
    cursor: usize,
}

impl BatchGenerator {
    /// Creates a generator positioned at the start of the corpus.
    pub fn new(corpus: EncodedCorpus) -> Result<Self> {
        Self::with_cursor(corpus, 0)
    }

    /// Creates a generator whose first window starts at `start` (reduced modulo the corpus length).
    pub fn with_cursor(corpus: EncodedCorpus, start: usize) -> Result<Self> {
        if corpus.is_empty() {
            return Err(SkipgramError::InvalidState(
                "cannot generate batches from an empty corpus".into(),
            ));
        }
        let cursor = start % corpus.len();
        debug!(
            "batch generator over {} positions starting at {cursor}",
            corpus.len()
        );
        Ok(Self { corpus, cursor })
    }

    /// Position of the first window of the next batch.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The corpus this generator reads from.
    pub fn corpus(&self) -> &EncodedCorpus {
        &self.corpus
    }

    /// Produces the next batch of `batch_size` rows and advances the cursor.
    ///
    /// `batch_size` must be a multiple of `2 * skip_window`, and the corpus must hold at least
    /// one full window.  On error the cursor is left untouched.
    pub fn generate_batch(&mut self, batch_size: usize, skip_window: usize) -> Result<Batch> {
        self.generate_with(&BatchConfig {
            batch_size,
            skip_window,
        })
    }

    /// Same as [`BatchGenerator::generate_batch`] for a prepared [`BatchConfig`].
    pub fn generate_with(&mut self, cfg: &BatchConfig) -> Result<Batch> {
        let mut batch = Batch::with_capacity(cfg.batch_size);
        self.fill_batch(cfg, &mut batch)?;
        Ok(batch)
    }

    /// Overwrites `batch` with the next batch, reusing its allocations.
    pub fn fill_batch(&mut self, cfg: &BatchConfig, batch: &mut Batch) -> Result<()> {
        self.check(cfg)?;
        self.fill_unchecked(cfg, batch);
        Ok(())
    }

    /// Returns an endless iterator of successive batches, validating the shape once up front.
    pub fn batches(&mut self, batch_size: usize, skip_window: usize) -> Result<Batches<'_>> {
        let cfg = BatchConfig {
            batch_size,
            skip_window,
        };
        self.check(&cfg)?;
        Ok(Batches {
            generator: self,
            cfg,
        })
    }

    fn check(&self, cfg: &BatchConfig) -> Result<()> {
        cfg.validate()?;
        let span = cfg.span();
        if self.corpus.len() < span {
            return Err(SkipgramError::InvalidState(format!(
                "corpus of {} positions is shorter than a window of {span} (skip_window {})",
                self.corpus.len(),
                cfg.skip_window
            )));
        }
        Ok(())
    }

    fn fill_unchecked(&mut self, cfg: &BatchConfig, batch: &mut Batch) {
        let data = self.corpus.as_slice();
        let len = data.len();
        let span = cfg.span();
        let windows = cfg.windows_per_batch();
        batch.clear();

        let mut window: VecDeque<TokenId> = VecDeque::with_capacity(span);
        let mut next = self.cursor;
        for _ in 0..span {
            window.push_back(data[next]);
            next = (next + 1) % len;
        }

        for filled in 0..windows {
            let target = window[cfg.skip_window];
            for (slot, &context) in window.iter().enumerate() {
                if slot != cfg.skip_window {
                    batch.push(target, context);
                }
            }
            if filled + 1 < windows {
                window.pop_front();
                window.push_back(data[next]);
                next = (next + 1) % len;
            }
        }

        self.cursor = (self.cursor + windows % len) % len;
    }
}

/// Endless iterator over successive batches of a [`BatchGenerator`].
#[derive(Debug)]
pub struct Batches<'a> {
    generator: &'a mut BatchGenerator,
    cfg: BatchConfig,
}

impl Batches<'_> {
    /// Cursor the next batch will start from.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.generator.cursor
    }
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Batch::with_capacity(self.cfg.batch_size);
        self.generator.fill_unchecked(&self.cfg, &mut batch);
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl FusedIterator for Batches<'_> {}
