//! `.env` file loading.
//!
//! Parsing follows the dotenv format (`export`, comments, quoting, `$VAR`
//! substitution). Values are only collected here; the process environment
//! is never modified.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;

/// Variables read from a `.env` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: BTreeMap<String, String>,
}

impl EnvFile {
    /// Reads `path`. Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvFile`] when the file cannot be read or a
    /// line is malformed.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let fail = |err: dotenvy::Error| ConfigError::EnvFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        match dotenvy::from_path_iter(path) {
            Ok(iter) => Self::collect(iter).map(Some).map_err(fail),
            Err(err) if err.not_found() => Ok(None),
            Err(err) => Err(fail(err)),
        }
    }

    /// Parses `.env` content held in memory.
    pub fn parse(text: &str) -> Result<Self, dotenvy::Error> {
        Self::collect(dotenvy::from_read_iter(text.as_bytes()))
    }

    fn collect(
        iter: impl Iterator<Item = dotenvy::Result<(String, String)>>,
    ) -> Result<Self, dotenvy::Error> {
        let vars = iter.collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { vars })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pairs() {
        let env = EnvFile::parse("KINVEY_APP_ID=kid_123\nKINVEY_APP_SECRET=abc\n").unwrap();
        assert_eq!(env.get("KINVEY_APP_ID"), Some("kid_123"));
        assert_eq!(env.get("KINVEY_APP_SECRET"), Some("abc"));
        assert_eq!(env.get("KINVEY_MASTER_SECRET"), None);
    }

    #[test]
    fn test_comments_and_export() {
        let env = EnvFile::parse("# platform settings\nexport PORT=9000\n\nHOST=127.0.0.1").unwrap();
        assert_eq!(env.get("PORT"), Some("9000"));
        assert_eq!(env.get("HOST"), Some("127.0.0.1"));
    }

    #[test]
    fn test_quoted_values() {
        let env = EnvFile::parse("A='literal \\n'\nB=\"line\\nnext\"").unwrap();
        assert_eq!(env.get("A"), Some("literal \\n"));
        assert_eq!(env.get("B"), Some("line\nnext"));
    }

    #[test]
    fn test_empty_value() {
        let env = EnvFile::parse("KINVEY_AUTH_HEADER=\n").unwrap();
        assert_eq!(env.get("KINVEY_AUTH_HEADER"), Some(""));
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        assert!(EnvFile::parse("KINVEY_APP_ID=kid\nnot a pair\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(EnvFile::load(&dir.path().join(".env")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PORT=9000\n=oops\n").unwrap();

        let err = EnvFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile { .. }));
        assert!(err.to_string().contains(".env"));
    }
}
