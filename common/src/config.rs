//! Store location policy and the wake defaults.
//!
//! The paths are resolved once, at construction, and carried explicitly into
//! the registry store. Nothing in this crate reads the environment after
//! [`StoreConfig::from_env`] returns.

use std::env;
use std::path::PathBuf;

/// Limited-broadcast address used when a record does not carry its own.
pub const DEFAULT_IP: &str = "255.255.255.255";

/// Discard-protocol port, the conventional Wake-On-Lan target.
pub const DEFAULT_PORT: u16 = 9;

/// Environment variable overriding the directory that holds the store file.
pub const STORE_HOME_ENV: &str = "WAKEONLAN_HOME";

const STORE_FILE: &str = ".wakeonlan";
const STORE_TMP_FILE: &str = ".wakeonlan.tmp";

/// Resolved locations of the registry file and its write-side temp sibling.
///
/// The temp path is a fixed name beside the final path, not unique per
/// process. Two concurrent writers race on it; the last rename wins.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub tmp_path: PathBuf,
}

impl StoreConfig {
    /// Store paths under `$WAKEONLAN_HOME`, falling back to the user's home
    /// directory, then to the current directory.
    pub fn from_env() -> Self {
        let home = env::var_os(STORE_HOME_ENV)
            .map(PathBuf::from)
            .or_else(env::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self::in_dir(home)
    }

    /// Store paths under an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        StoreConfig {
            path: dir.join(STORE_FILE),
            tmp_path: dir.join(STORE_TMP_FILE),
        }
    }
}
