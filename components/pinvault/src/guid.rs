/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// An opaque record identifier.
///
/// Random guids are 12 characters of URL-safe base64, which is enough entropy that a
/// personal vault will never see a collision. An empty guid is valid but means "not yet
/// assigned", which is what records read from a hand-edited file without an `id` look like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(s: &str) -> Self {
        Guid(s.to_string())
    }

    pub fn random() -> Self {
        let mut bytes = [0u8; 9];
        rand::thread_rng().fill_bytes(&mut bytes);
        Guid(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn empty() -> Self {
        Guid(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Guid::new(s)
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Guid(s)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
