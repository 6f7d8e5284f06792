//! Alias storage and expansion.
//!
//! Aliases live in a flat text file, one `name = expansion` entry per line.
//! The file is read in full on every lookup and rewritten in full on every
//! update, which keeps the on-disk order equal to first-insertion order
//! with in-place overwrite on update.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while reading or updating the alias file.
///
/// Every failure leaves the existing store untouched.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("cannot read alias file `{path}`: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot update alias file `{path}`: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// On-disk store of `name = expansion` entries.
///
/// The backing file path is injected at construction so the store never
/// consults ambient process state.
pub struct AliasStore {
    path: PathBuf,
}

impl AliasStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AliasStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the backing file, empty, if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<(), AliasError> {
        fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|source| AliasError::Write {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>, AliasError> {
        self.ensure_exists()?;
        let contents = fs::read_to_string(&self.path).map_err(|source| AliasError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(contents.lines().map(str::to_string).collect())
    }

    /// Looks up an alias by exact name; first match wins.
    pub fn lookup(&self, name: &str) -> Result<Option<String>, AliasError> {
        for line in self.read_lines()? {
            if let Some((key, value)) = split_entry(&line) {
                if key == name {
                    return Ok(Some(value.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Inserts a new alias or overwrites an existing one in place.
    ///
    /// The whole store is rewritten to a sibling temporary file which is
    /// then renamed over the original, so an interrupted update never
    /// drops entries or leaves a half-written store visible.
    pub fn upsert(&self, name: &str, expansion: &str) -> Result<(), AliasError> {
        let mut lines = self.read_lines()?;
        let mut found = false;

        for line in lines.iter_mut() {
            if split_entry(line).is_some_and(|(key, _)| key == name) {
                *line = format!("{name} = {expansion}");
                found = true;
                // Later duplicates, if hand-edited in, are left verbatim;
                // lookup only ever sees the first.
                break;
            }
        }
        if !found {
            lines.push(format!("{name} = {expansion}"));
        }

        let mut contents = lines.join("\n");
        contents.push('\n');

        let tmp_path = sibling_temp_path(&self.path);
        let write_err = |source| AliasError::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp_path, contents).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            write_err(source)
        })?;
        Ok(())
    }

    /// Expands the leading word of a raw input line.
    ///
    /// The first whitespace-delimited word (a cruder split than the
    /// tokenizer's, quotes are not considered) is looked up in the store;
    /// on a hit the result is the expansion, a single space, and the rest
    /// of the line. Runs once per line before tokenization, and the
    /// expansion text is never re-expanded, so aliases cannot loop.
    pub fn expand(&self, line: &str) -> String {
        let mut parts = line.trim_start().splitn(2, char::is_whitespace);
        let Some(first) = parts.next().filter(|w| !w.is_empty()) else {
            return line.to_string();
        };

        let expansion = match self.lookup(first) {
            Ok(Some(expansion)) => expansion,
            Ok(None) => return line.to_string(),
            Err(err) => {
                // An unreadable store degrades to no expansion.
                log::warn!("alias lookup failed: {err}");
                return line.to_string();
            }
        };

        match parts.next().map(str::trim_start).filter(|r| !r.is_empty()) {
            Some(rest) => format!("{expansion} {rest}"),
            None => expansion,
        }
    }
}

/// Splits one store line at its first `=`, trimming whitespace around both
/// sides. Lines without `=` are not entries.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn sibling_temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> AliasStore {
        AliasStore::new(dir.join(".aliases"))
    }

    #[test]
    fn lookup_on_missing_store_creates_empty_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.lookup("ll").unwrap(), None);
        assert!(store.path().exists());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");
    }

    #[test]
    fn upsert_then_lookup_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("ll", "ls -la").unwrap();
        assert_eq!(store.lookup("ll").unwrap(), Some("ls -la".to_string()));
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("ll", "ls -la").unwrap();
        store.upsert("g", "git status").unwrap();
        store.upsert("ll", "ls -l").unwrap();

        assert_eq!(store.lookup("ll").unwrap(), Some("ls -l".to_string()));
        let contents = fs::read_to_string(store.path()).unwrap();
        // One entry named ll, still in first position.
        assert_eq!(contents, "ll = ls -l\ng = git status\n");
    }

    #[test]
    fn upsert_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("ll", "ls -la").unwrap();
        let before = fs::read_to_string(store.path()).unwrap();
        store.upsert("ll", "ls -la").unwrap();
        let after = fs::read_to_string(store.path()).unwrap();
        assert_eq!(before, after);
        assert_eq!(after.matches("ll =").count(), 1);
    }

    #[test]
    fn upsert_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("ll", "ls -la").unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(".aliases")]);
    }

    #[test]
    fn lookup_trims_whitespace_around_delimiter() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "  ll   =   ls -la  \n").unwrap();
        assert_eq!(store.lookup("ll").unwrap(), Some("ls -la".to_string()));
    }

    #[test]
    fn first_equals_sign_is_the_delimiter() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("set", "env FOO=bar").unwrap();
        assert_eq!(store.lookup("set").unwrap(), Some("env FOO=bar".to_string()));
    }

    #[test]
    fn expand_replaces_leading_word_and_keeps_remainder() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("g", "git status").unwrap();
        assert_eq!(store.expand("g --short"), "git status --short");
        assert_eq!(store.expand("g"), "git status");
    }

    #[test]
    fn expand_leaves_unknown_words_alone() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.expand("ls -la"), "ls -la");
        assert_eq!(store.expand("   "), "   ");
    }

    #[test]
    fn expand_collapses_leading_spaces_of_remainder() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("g", "git status").unwrap();
        assert_eq!(store.expand("g     --short"), "git status --short");
    }

    #[test]
    fn expand_does_not_recurse() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert("a", "b").unwrap();
        store.upsert("b", "a").unwrap();
        // One substitution only; the result is not looked up again.
        assert_eq!(store.expand("a"), "b");
    }
}
