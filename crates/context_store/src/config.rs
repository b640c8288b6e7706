//! Environment configuration.

use std::env;
use std::path::{Path, PathBuf};

pub const DIR_ENV: &str = "SESSION_CTX_DIR";
pub const OVERWRITE_ENV: &str = "SESSION_CTX_OVERWRITE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: Option<PathBuf>,
    pub overwrite: bool,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            dir: env_string_opt(DIR_ENV).map(PathBuf::from),
            overwrite: env_flag(OVERWRITE_ENV),
        }
    }

    /// Directory holding the context files, resolved against `cwd`.
    #[must_use]
    pub fn root(&self, cwd: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DIR_ENV, OVERWRITE_ENV};
    use std::env;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Holds the process-wide env lock and puts both store variables back on
    /// drop.
    struct StoreEnv {
        saved: Vec<(&'static str, Option<String>)>,
        _lock: MutexGuard<'static, ()>,
    }

    impl StoreEnv {
        fn set(dir: Option<&str>, overwrite: Option<&str>) -> Self {
            let lock = ENV_LOCK
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut saved = Vec::new();
            for (key, value) in [(DIR_ENV, dir), (OVERWRITE_ENV, overwrite)] {
                saved.push((key, env::var(key).ok()));
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
            Self { saved, _lock: lock }
        }
    }

    impl Drop for StoreEnv {
        fn drop(&mut self) {
            for (key, value) in self.saved.drain(..) {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn defaults_use_cwd_without_overwrite() {
        let _env = StoreEnv::set(None, None);

        let config = StoreConfig::from_env();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.root(Path::new("/repo")), PathBuf::from("/repo"));
    }

    #[test]
    fn dir_and_overwrite_are_read() {
        let _env = StoreEnv::set(Some("ctx"), Some("1"));

        let config = StoreConfig::from_env();
        assert!(config.overwrite);
        assert_eq!(config.root(Path::new("/repo")), PathBuf::from("/repo/ctx"));
    }

    #[test]
    fn absolute_dir_replaces_cwd() {
        let _env = StoreEnv::set(Some("/elsewhere"), None);

        let config = StoreConfig::from_env();
        assert_eq!(config.root(Path::new("/repo")), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn blank_dir_and_other_flag_values_are_ignored() {
        let _env = StoreEnv::set(Some("  "), Some("yes"));

        let config = StoreConfig::from_env();
        assert!(config.dir.is_none());
        assert!(!config.overwrite);
    }
}
