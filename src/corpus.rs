//! Facilities for discovering plain-text inputs and splitting them into tokens.
//!
//! This is the hand-off point from whatever produced the cleaned corpus (a `text8`-style file of
//! whitespace-separated lowercase words) to the vocabulary builder.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{Result, SkipgramError};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level.  Files inside a directory are visited in file name
/// order so the resulting corpus is reproducible.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(SkipgramError::InvalidArgument(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| SkipgramError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(cfg.follow_symlinks)
                .max_depth(if cfg.recursive { usize::MAX } else { 1 })
                .sort_by_file_name();
            for entry in walker {
                let entry = entry.map_err(|err| SkipgramError::Internal(err.to_string()))?;
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if metadata.is_file() || (cfg.follow_symlinks && path.is_file()) {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(SkipgramError::InvalidArgument(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Iterates over the whitespace-delimited tokens of `text`.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.split_whitespace()
}

/// Splits text into owned whitespace-delimited tokens.
#[must_use]
pub fn split_tokens(text: &str) -> Vec<String> {
    tokens(text).map(str::to_owned).collect()
}

/// Loads every discovered file in order and concatenates their tokens.
///
/// Reading stops once [`IngestConfig::max_tokens`] tokens were collected.
pub fn load_tokens<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<String>> {
    let file_paths = collect_paths(inputs, cfg)?;
    let limit = cfg.max_tokens.unwrap_or(usize::MAX);
    let mut loaded = Vec::new();
    for file_path in file_paths {
        if loaded.len() >= limit {
            break;
        }
        let text = fs::read_to_string(&file_path)
            .map_err(|err| SkipgramError::io(err, Some(file_path.clone())))?;
        let before = loaded.len();
        loaded.extend(tokens(&text).take(limit - before).map(str::to_owned));
        debug!(
            "read {} tokens from {}",
            loaded.len() - before,
            file_path.display()
        );
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collect_paths_discovers_files_recursively() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_a = dir.path().join("a.txt");
        let file_b = nested.join("b.txt");
        fs::write(&file_a, "one two").expect("write a");
        fs::write(&file_b, "three").expect("write b");

        let cfg = IngestConfig::default();
        let mut paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        paths.sort();
        assert_eq!(paths, vec![file_a.clone(), file_b]);

        let shallow = IngestConfig::builder().recursive(false).build();
        let paths = collect_paths(&[dir.path()], &shallow).expect("collect shallow");
        assert_eq!(paths, vec![file_a]);
    }

    #[test]
    fn collect_paths_rejects_missing_input() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("text9");
        let err = collect_paths(&[missing], &IngestConfig::default()).expect_err("missing input");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn load_tokens_concatenates_files_in_order() {
        let dir = tempdir().expect("tempdir");
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "anarchism originated\n as").expect("write first");
        fs::write(&second, "\ta term  of abuse").expect("write second");

        let tokens =
            load_tokens(&[&first, &second], &IngestConfig::default()).expect("load tokens");
        assert_eq!(
            tokens,
            vec!["anarchism", "originated", "as", "a", "term", "of", "abuse"]
        );
    }

    #[test]
    fn load_tokens_honours_max_tokens() {
        let dir = tempdir().expect("tempdir");
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "one two three").expect("write first");
        fs::write(&second, "four five").expect("write second");

        let cfg = IngestConfig::builder().max_tokens(Some(4)).build();
        let tokens = load_tokens(&[&first, &second], &cfg).expect("load tokens");
        assert_eq!(tokens, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn load_tokens_reports_invalid_utf8_with_path() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("binary.bin");
        fs::write(&file, [0xFFu8, 0xFE, 0x20, 0x41]).expect("write binary");
        let err = load_tokens(&[&file], &IngestConfig::default()).expect_err("not utf-8");
        assert!(matches!(err, SkipgramError::Io { path: Some(p), .. } if p == file));
    }

    #[test]
    fn split_tokens_ignores_surrounding_whitespace() {
        assert_eq!(split_tokens("  the quick\n\nfox "), vec!["the", "quick", "fox"]);
        assert!(split_tokens(" \t\n").is_empty());
    }

    #[test]
    fn load_tokens_splits_files_like_split_tokens() {
        let dir = tempdir().expect("tempdir");
        let text = "anarchism originated\tas a\n\n  term of abuse \n";
        let path = dir.path().join("text8");
        fs::write(&path, text).expect("write corpus");

        let loaded = load_tokens(&[&path], &IngestConfig::default()).expect("load tokens");
        assert_eq!(loaded, split_tokens(text));
        assert_eq!(tokens(text).count(), 7);

        let capped = IngestConfig::builder().max_tokens(Some(3)).build();
        let loaded = load_tokens(&[&path], &capped).expect("load capped tokens");
        assert_eq!(loaded, tokens(text).take(3).collect::<Vec<_>>());
    }
}
