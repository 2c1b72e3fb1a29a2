//! Path management for chatroom configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chatroom/          # Config directory (platform default via `dirs`)
//! └── config.toml              # Room configuration
//! ```

use chatroom_core::error::{ChatError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "chatroom";

pub struct ChatroomPaths;

impl ChatroomPaths {
    /// Returns the chatroom configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/chatroom/`)
    /// - `Err(ChatError::Config)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ChatError::config("Cannot find configuration directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
