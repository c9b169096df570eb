/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::error::*;
use std::path::{Path, PathBuf};

/// Directory, relative to the home directory, the vault lives in by default.
pub const APP_DIR: &str = ".pinvault";
pub const VAULT_FILE_NAME: &str = "data.json";

/// Where the vault file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl VaultConfig {
    /// `~/.pinvault/data.json`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self::with_dir(home.join(APP_DIR)))
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            file_name: VAULT_FILE_NAME.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}
