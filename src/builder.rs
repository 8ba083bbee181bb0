//! One-shot construction of a bounded vocabulary and the encoded corpus.

use std::cmp::Ordering;
use std::time::Instant;
use std::{fmt, path::Path};

use log::info;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::{IngestConfig, VocabBuilder, VocabConfig};
use crate::corpus::load_tokens;
use crate::error::Result;
use crate::metrics::{sample_rss_kb, BuildMetrics};
use crate::vocab::{EncodedCorpus, FrequencyTable, TokenCount, Vocabulary};

/// Number of tokens counted per parallel work item.
const COUNT_CHUNK: usize = 1 << 16;

/// High-level façade turning a token sequence into a vocabulary, counts, and encoded corpus.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    cfg: VocabConfig,
}

/// Artifacts returned after a vocabulary build completes.
#[must_use]
#[derive(Debug, Clone)]
pub struct VocabularyArtifacts {
    /// Token <-> index mapping.
    pub vocabulary: Vocabulary,
    /// Counts aligned with vocabulary indices.
    pub frequencies: FrequencyTable,
    /// Input corpus expressed as vocabulary indices.
    pub corpus: EncodedCorpus,
    /// Sizes and timings captured during the build.
    pub metrics: BuildMetrics,
}

impl VocabularyArtifacts {
    /// Splits the artifacts into `(vocabulary, frequencies, corpus)`.
    pub fn into_parts(self) -> (Vocabulary, FrequencyTable, EncodedCorpus) {
        (self.vocabulary, self.frequencies, self.corpus)
    }
}

impl VocabularyBuilder {
    /// Creates a new builder for the supplied configuration.
    #[must_use]
    pub fn new(cfg: VocabConfig) -> Self {
        Self { cfg }
    }

    /// Returns a [`VocabBuilder`] with default settings.
    #[must_use]
    pub fn builder() -> VocabBuilder {
        VocabConfig::builder()
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &VocabConfig {
        &self.cfg
    }

    /// Loads whitespace-delimited tokens from disk and builds the vocabulary from them.
    pub fn build_from_paths<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        ingest: &IngestConfig,
    ) -> Result<VocabularyArtifacts> {
        let tokens = load_tokens(inputs, ingest)?;
        self.build(&tokens)
    }

    /// Builds the vocabulary from an in-memory token sequence.
    ///
    /// The `vocab_size - 1` most frequent tokens receive indices `1..` in descending count order;
    /// equally frequent tokens are ordered by the position of their first occurrence.  Every
    /// other token is encoded as [`crate::UNK_ID`].
    pub fn build<S>(&self, tokens: &[S]) -> Result<VocabularyArtifacts>
    where
        S: AsRef<str> + Sync,
    {
        self.cfg.validate()?;
        let start = Instant::now();

        let counts = count_tokens(tokens);
        let distinct_tokens = counts.len();
        let elapsed_counting = start.elapsed();
        if self.cfg.show_progress {
            info!(
                "counted {} tokens ({} distinct) in {:.2?}",
                tokens.len(),
                distinct_tokens,
                elapsed_counting
            );
        }

        let selected = select_most_common(counts, self.cfg.vocab_size - 1);
        let selected_total: usize = selected.iter().map(|(_, stats)| stats.count).sum();
        let unk_count = tokens.len() - selected_total;

        let mut entries = Vec::with_capacity(selected.len() + 1);
        entries.push(TokenCount {
            token: self.cfg.unk_token.clone(),
            count: unk_count,
        });
        entries.extend(selected.iter().map(|(token, stats)| TokenCount {
            token: (*token).to_owned(),
            count: stats.count,
        }));
        let vocabulary = Vocabulary::from_selected(
            self.cfg.unk_token.clone(),
            selected
                .into_iter()
                .map(|(token, _)| token.to_owned())
                .collect(),
        );

        let ids: Vec<_> = tokens
            .par_iter()
            .map(|token| vocabulary.encode_token(token.as_ref()))
            .collect();
        let corpus = EncodedCorpus::from(ids);

        let metrics = BuildMetrics {
            corpus_tokens: tokens.len(),
            distinct_tokens,
            vocab_size: vocabulary.len(),
            unk_count,
            elapsed_counting,
            elapsed_total: start.elapsed(),
            rss_kb: sample_rss_kb(),
        };
        if self.cfg.show_progress {
            info!(
                "built vocab of {} entries in {:.2?}; {} positions ({:.2}%) mapped to {}",
                metrics.vocab_size,
                metrics.elapsed_total,
                unk_count,
                metrics.unk_ratio() * 100.0,
                self.cfg.unk_token
            );
        }

        Ok(VocabularyArtifacts {
            vocabulary,
            frequencies: FrequencyTable::new(entries),
            corpus,
            metrics,
        })
    }
}

/// Builds a vocabulary of at most `vocab_size` entries with the default sentinel label.
pub fn build_vocabulary<S>(
    tokens: &[S],
    vocab_size: usize,
) -> Result<(Vocabulary, FrequencyTable, EncodedCorpus)>
where
    S: AsRef<str> + Sync,
{
    let cfg = VocabConfig::builder()
        .vocab_size(vocab_size)
        .show_progress(false)
        .build()?;
    Ok(VocabularyBuilder::new(cfg).build(tokens)?.into_parts())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TokenStats {
    count: usize,
    first_seen: usize,
}

impl TokenStats {
    fn merge(&mut self, other: TokenStats) {
        self.count += other.count;
        self.first_seen = self.first_seen.min(other.first_seen);
    }
}

/// Descending count, then earliest first occurrence.
fn rank(left: &(&str, TokenStats), right: &(&str, TokenStats)) -> Ordering {
    right
        .1
        .count
        .cmp(&left.1.count)
        .then_with(|| left.1.first_seen.cmp(&right.1.first_seen))
}

fn count_tokens<S>(tokens: &[S]) -> FxHashMap<&str, TokenStats>
where
    S: AsRef<str> + Sync,
{
    tokens
        .par_chunks(COUNT_CHUNK)
        .enumerate()
        .map(|(chunk_idx, chunk)| {
            let base = chunk_idx * COUNT_CHUNK;
            let mut local: FxHashMap<&str, TokenStats> = FxHashMap::default();
            for (offset, token) in chunk.iter().enumerate() {
                local
                    .entry(token.as_ref())
                    .and_modify(|stats| stats.count += 1)
                    .or_insert(TokenStats {
                        count: 1,
                        first_seen: base + offset,
                    });
            }
            local
        })
        .reduce(FxHashMap::default, |mut acc, mut local| {
            if acc.len() < local.len() {
                std::mem::swap(&mut acc, &mut local);
            }
            for (token, stats) in local {
                acc.entry(token)
                    .and_modify(|existing| existing.merge(stats))
                    .or_insert(stats);
            }
            acc
        })
}

fn select_most_common(
    counts: FxHashMap<&str, TokenStats>,
    keep: usize,
) -> Vec<(&str, TokenStats)> {
    let mut ranked: Vec<(&str, TokenStats)> = counts.into_iter().collect();
    let keep = keep.min(ranked.len());
    if keep > 0 && keep < ranked.len() {
        ranked.select_nth_unstable_by(keep - 1, rank);
    }
    ranked.truncate(keep);
    ranked.sort_unstable_by(rank);
    ranked
}

impl fmt::Display for VocabularyArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vocabulary with {} entries", self.vocabulary.len())?;
        writeln!(f, "Corpus tokens: {}", self.corpus.len())?;
        writeln!(
            f,
            "Mapped to {}: {}",
            self.vocabulary.unk_token(),
            self.frequencies.unk_count()
        )?;
        Ok(())
    }
}
