//! Metrics describing a vocabulary build.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Summary captured while building a vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildMetrics {
    /// Number of tokens in the input corpus.
    pub corpus_tokens: usize,
    /// Number of distinct tokens observed.
    pub distinct_tokens: usize,
    /// Effective vocabulary size including the sentinel.
    pub vocab_size: usize,
    /// Positions encoded with the sentinel.
    pub unk_count: usize,
    /// Wall time spent counting tokens.
    pub elapsed_counting: Duration,
    /// Total wall time of the build.
    pub elapsed_total: Duration,
    /// Resident set size sample captured from `/proc/self/status` on Linux.
    pub rss_kb: Option<usize>,
}

impl BuildMetrics {
    /// Share of corpus positions absorbed by the sentinel, in `[0, 1]`.
    #[must_use]
    pub fn unk_ratio(&self) -> f64 {
        if self.corpus_tokens == 0 {
            0.0
        } else {
            self.unk_count as f64 / self.corpus_tokens as f64
        }
    }
}

#[cfg(target_os = "linux")]
fn current_rss_kb() -> Option<usize> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open("/proc/self/status").ok()?;
    for line in BufReader::new(file).lines().map_while(Result::ok) {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let value = rest
                .split_whitespace()
                .find_map(|part| part.parse::<usize>().ok());
            return value;
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn current_rss_kb() -> Option<usize> {
    None
}

/// Samples the current resident set size (RSS) on supported platforms.
pub fn sample_rss_kb() -> Option<usize> {
    current_rss_kb()
}
