//! Configuration builders controlling vocabulary construction, batching, and corpus ingestion.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkipgramError};
use crate::vocab::{TokenId, UNK_TOKEN};

/// Configuration for building a bounded vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabConfig {
    /// Requested vocabulary size including the out-of-vocabulary sentinel at index 0.
    pub vocab_size: usize,
    /// Label reported for the sentinel entry.
    pub unk_token: String,
    /// Enables progress logging through the `log` facade.
    pub show_progress: bool,
}

impl VocabConfig {
    /// Returns a builder initialised with [`VocabConfig::default`].
    #[must_use]
    pub fn builder() -> VocabBuilder {
        VocabBuilder::default()
    }

    /// Validates the invariants required for vocabulary construction.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(SkipgramError::InvalidArgument(
                "vocab_size must be at least 1 (the sentinel entry)".into(),
            ));
        }
        let max_vocab = usize::try_from(TokenId::MAX)
            .unwrap_or(usize::MAX)
            .saturating_add(1);
        if self.vocab_size > max_vocab {
            return Err(SkipgramError::InvalidArgument(format!(
                "vocab_size ({}) exceeds {max_vocab}, the number of representable TokenIds",
                self.vocab_size
            )));
        }
        if self.unk_token.is_empty() {
            return Err(SkipgramError::InvalidArgument(
                "unk_token must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self {
            vocab_size: 50_000,
            unk_token: UNK_TOKEN.into(),
            show_progress: true,
        }
    }
}

/// Builder for [`VocabConfig`].
#[derive(Debug, Default, Clone)]
pub struct VocabBuilder {
    cfg: VocabConfig,
}

impl VocabBuilder {
    /// Creates a builder with [`VocabConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the desired vocabulary size (including the sentinel).
    #[must_use]
    pub fn vocab_size(mut self, value: usize) -> Self {
        self.cfg.vocab_size = value;
        self
    }

    /// Overrides the sentinel label.
    #[must_use]
    pub fn unk_token<S: Into<String>>(mut self, token: S) -> Self {
        self.cfg.unk_token = token.into();
        self
    }

    /// Enables or disables progress logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`VocabConfig`].
    pub fn build(self) -> Result<VocabConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Shape of the batches produced by a [`crate::BatchGenerator`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of `(target, context)` rows per batch.
    pub batch_size: usize,
    /// Number of context tokens taken on each side of the target.
    pub skip_window: usize,
}

impl BatchConfig {
    /// Creates a validated batch configuration.
    pub fn new(batch_size: usize, skip_window: usize) -> Result<Self> {
        let cfg = Self {
            batch_size,
            skip_window,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Number of context slots emitted for each target.
    #[must_use]
    pub fn contexts_per_target(&self) -> usize {
        self.skip_window.saturating_mul(2)
    }

    /// Number of consecutive corpus positions covered by one window.
    #[must_use]
    pub fn span(&self) -> usize {
        self.contexts_per_target().saturating_add(1)
    }

    /// Number of target windows that fit in one batch.
    #[must_use]
    pub fn windows_per_batch(&self) -> usize {
        match self.contexts_per_target() {
            0 => 0,
            per_target => self.batch_size / per_target,
        }
    }

    /// Validates the batch shape; the corpus length is checked by the generator.
    pub fn validate(&self) -> Result<()> {
        if self.skip_window == 0 {
            return Err(SkipgramError::InvalidArgument(
                "skip_window must be greater than zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SkipgramError::InvalidArgument(
                "batch_size must be greater than zero".into(),
            ));
        }
        let per_target = self.skip_window.checked_mul(2).ok_or_else(|| {
            SkipgramError::InvalidArgument(format!(
                "skip_window ({}) is too large",
                self.skip_window
            ))
        })?;
        if self.batch_size % per_target != 0 {
            return Err(SkipgramError::InvalidArgument(format!(
                "batch_size ({}) must be a multiple of 2 * skip_window ({per_target})",
                self.batch_size
            )));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 128,
            skip_window: 1,
        }
    }
}

/// Configuration controlling how plain-text corpora are read from disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
    /// Stops reading once this many tokens were collected; `None` reads everything.
    pub max_tokens: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
            max_tokens: None,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Caps the number of tokens loaded from the inputs.
    #[must_use]
    pub fn max_tokens(mut self, limit: Option<usize>) -> Self {
        self.cfg.max_tokens = limit;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
