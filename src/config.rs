//! Runtime configuration read from the environment.
use crate::models::ranking::DEFAULT_LIMIT;
use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "VOCAB_REVIEW_DB";
pub const LIMIT_VAR: &str = "VOCAB_REVIEW_LIMIT";

const DEFAULT_DATABASE_PATH: &str = "db.sqlite3";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// Number of due items served when the caller does not ask for a count.
    pub default_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            default_limit: DEFAULT_LIMIT as i64,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; missing or empty values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_path: value(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            default_limit: value(LIMIT_VAR)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.default_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.database_path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.default_limit, 20);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            (DATABASE_PATH_VAR, "/tmp/reviews.sqlite3"),
            (LIMIT_VAR, " 35 "),
        ]));

        assert_eq!(config.database_path, PathBuf::from("/tmp/reviews.sqlite3"));
        assert_eq!(config.default_limit, 35);
    }

    #[test]
    fn test_bad_limit_falls_back() {
        let config = Config::from_lookup(lookup_from(&[(LIMIT_VAR, "lots"), (DATABASE_PATH_VAR, "")]));

        assert_eq!(config.default_limit, 20);
        assert_eq!(config.database_path, PathBuf::from("db.sqlite3"));
    }
}
