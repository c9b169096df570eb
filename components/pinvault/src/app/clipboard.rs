/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

/// Where selected logins and passwords end up. Write-only from our side.
pub trait Clipboard {
    fn copy(&mut self, text: &str);
    fn clear(&mut self);
}

/// A clipboard that just remembers what it was given.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }

    fn clear(&mut self) {
        self.contents = None;
    }
}

impl<C: Clipboard + ?Sized> Clipboard for Box<C> {
    fn copy(&mut self, text: &str) {
        (**self).copy(text)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}
