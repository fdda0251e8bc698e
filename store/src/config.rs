//! Configuration for the GameScout store
//!
//! Handles data directory configuration with the following precedence:
//! 1. GAMESCOUT_DATA_DIR environment variable
//! 2. ~/.config/gamescout/data (production default)
//! 3. ./data (fallback for development)

use std::path::PathBuf;

const DEFAULT_CONFIG_DIR: &str = ".config/gamescout/data";
const DEV_DATA_DIR: &str = "./data";

/// Get the data directory for the cache store.
///
/// Priority:
/// 1. GAMESCOUT_DATA_DIR env variable if set
/// 2. $HOME/.config/gamescout/data if HOME is set
/// 3. ./data as fallback
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GAMESCOUT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}
