//! Vocabulary, frequency table, and encoded corpus types produced by a vocabulary build.

use std::ops::Deref;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkipgramError};

/// Token identifier used throughout the crate.
pub type TokenId = u32;

/// Identifier reserved for the out-of-vocabulary sentinel.
pub const UNK_ID: TokenId = 0;

/// Default label of the out-of-vocabulary sentinel.
pub const UNK_TOKEN: &str = "UNK";

/// Bidirectional token <-> index mapping with the sentinel at index 0.
///
/// The forward table only holds the tokens selected from the corpus, so a corpus token that
/// happens to spell the sentinel label keeps its own index.
#[must_use]
#[derive(Debug, Clone)]
pub struct Vocabulary {
    id_to_token: Vec<String>,
    token_to_id: FxHashMap<String, TokenId>,
}

impl Vocabulary {
    /// Builds a vocabulary from the sentinel label and the selected tokens in index order.
    pub(crate) fn from_selected(unk_token: String, selected: Vec<String>) -> Self {
        let mut token_to_id = FxHashMap::default();
        token_to_id.reserve(selected.len());
        let mut id_to_token = Vec::with_capacity(selected.len() + 1);
        id_to_token.push(unk_token);
        for (offset, token) in selected.into_iter().enumerate() {
            token_to_id.insert(token.clone(), (offset + 1) as TokenId);
            id_to_token.push(token);
        }
        Self {
            id_to_token,
            token_to_id,
        }
    }

    /// Number of entries including the sentinel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// Always false; the sentinel is present even for an empty corpus.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Label of the sentinel entry.
    #[must_use]
    pub fn unk_token(&self) -> &str {
        &self.id_to_token[UNK_ID as usize]
    }

    /// Index of a selected corpus token, or `None` when it fell through to the sentinel.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    /// Returns true when the token received its own index.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    /// Index used when encoding `token`.
    #[must_use]
    pub fn encode_token(&self, token: &str) -> TokenId {
        self.get(token).unwrap_or(UNK_ID)
    }

    /// Encodes a token sequence, mapping unknown tokens to [`UNK_ID`].
    #[must_use]
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TokenId> {
        tokens
            .iter()
            .map(|token| self.encode_token(token.as_ref()))
            .collect()
    }

    /// Token stored at `id`; index 0 yields the sentinel label.
    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    /// Decodes identifiers back into tokens.
    pub fn decode(&self, ids: &[TokenId]) -> Result<Vec<&str>> {
        ids.iter()
            .map(|&id| {
                self.token(id).ok_or_else(|| {
                    SkipgramError::InvalidArgument(format!(
                        "token id {id} exceeds vocab size {}",
                        self.len()
                    ))
                })
            })
            .collect()
    }

    /// Iterates over `(id, token)` entries in index order, sentinel first.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> + '_ {
        self.id_to_token
            .iter()
            .enumerate()
            .map(|(idx, token)| (idx as TokenId, token.as_str()))
    }
}

/// Occurrence count of a single vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCount {
    /// Token text (the sentinel label for entry 0).
    pub token: String,
    /// Number of corpus positions encoded with this entry.
    pub count: usize,
}

/// Per-entry counts aligned with vocabulary indices.
///
/// Entry 0 is the sentinel and counts the positions it absorbed; the remaining entries are in
/// descending count order.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<TokenCount>,
}

impl FrequencyTable {
    pub(crate) fn new(entries: Vec<TokenCount>) -> Self {
        Self { entries }
    }

    /// Number of entries including the sentinel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for the given vocabulary index.
    #[must_use]
    pub fn get(&self, id: TokenId) -> Option<&TokenCount> {
        self.entries.get(id as usize)
    }

    /// Number of corpus positions that fell through to the sentinel.
    #[must_use]
    pub fn unk_count(&self) -> usize {
        self.entries.first().map_or(0, |entry| entry.count)
    }

    /// Sum of all counts; equals the corpus length.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// The first `n` entries: the sentinel followed by the most frequent tokens.
    #[must_use]
    pub fn most_common(&self, n: usize) -> &[TokenCount] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Iterates over entries in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, TokenCount> {
        self.entries.iter()
    }

    /// Returns the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TokenCount] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a TokenCount;
    type IntoIter = std::slice::Iter<'a, TokenCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Corpus re-expressed as vocabulary indices.
///
/// Cloning is cheap; clones share the same immutable buffer so several generators can read it.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCorpus {
    ids: Arc<[TokenId]>,
}

impl EncodedCorpus {
    /// Number of encoded positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true for an empty corpus.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<TokenId> {
        self.ids.get(position).copied()
    }

    /// Returns the identifiers as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TokenId] {
        &self.ids
    }
}

impl Deref for EncodedCorpus {
    type Target = [TokenId];

    fn deref(&self) -> &Self::Target {
        &self.ids
    }
}

impl From<Vec<TokenId>> for EncodedCorpus {
    fn from(ids: Vec<TokenId>) -> Self {
        Self { ids: ids.into() }
    }
}

impl From<&[TokenId]> for EncodedCorpus {
    fn from(ids: &[TokenId]) -> Self {
        Self { ids: ids.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vocab() -> Vocabulary {
        Vocabulary::from_selected(UNK_TOKEN.into(), vec!["the".into(), "of".into()])
    }

    #[test]
    fn sentinel_occupies_index_zero() {
        let vocab = sample_vocab();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.token(UNK_ID), Some(UNK_TOKEN));
        assert_eq!(vocab.get("the"), Some(1));
        assert_eq!(vocab.get("of"), Some(2));
        assert_eq!(vocab.encode_token("anarchism"), UNK_ID);
        assert!(!vocab.contains(UNK_TOKEN));
    }

    #[test]
    fn decode_rejects_out_of_range_ids() {
        let vocab = sample_vocab();
        assert_eq!(vocab.decode(&[1, 0, 2]).unwrap(), vec!["the", "UNK", "of"]);
        let err = vocab.decode(&[3]).expect_err("id 3 is out of range");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn corpus_token_spelling_the_sentinel_keeps_its_own_index() {
        let vocab = Vocabulary::from_selected(UNK_TOKEN.into(), vec![UNK_TOKEN.into()]);
        assert_eq!(vocab.get(UNK_TOKEN), Some(1));
        assert_eq!(vocab.token(0), Some(UNK_TOKEN));
        assert_eq!(vocab.token(1), Some(UNK_TOKEN));
    }

    #[test]
    fn frequency_table_reports_sentinel_and_totals() {
        let table = FrequencyTable::new(vec![
            TokenCount {
                token: UNK_TOKEN.into(),
                count: 3,
            },
            TokenCount {
                token: "a".into(),
                count: 5,
            },
        ]);
        assert_eq!(table.unk_count(), 3);
        assert_eq!(table.total(), 8);
        assert_eq!(table.most_common(10).len(), 2);
        assert_eq!(table.most_common(1)[0].token, UNK_TOKEN);
    }

    #[test]
    fn encoded_corpus_clones_share_storage() {
        let corpus = EncodedCorpus::from(vec![1, 2, 3]);
        let shared = corpus.clone();
        assert!(std::ptr::eq(corpus.as_slice(), shared.as_slice()));
        assert_eq!(shared.get(2), Some(3));
        assert_eq!(shared.get(3), None);
    }
}
