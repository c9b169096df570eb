/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use pinvault::Clipboard;

/// The OS clipboard. Headless sessions don't have one, in which case copies are dropped with a
/// warning rather than failing the selection.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::warn!("No system clipboard available: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) {
        match &mut self.inner {
            Some(clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    log::warn!("Failed to copy to the clipboard: {}", e);
                }
            }
            None => log::warn!("Nothing copied, there is no clipboard"),
        }
    }

    fn clear(&mut self) {
        if let Some(clipboard) = &mut self.inner {
            if let Err(e) = clipboard.clear() {
                log::warn!("Failed to clear the clipboard: {}", e);
            }
        }
    }
}
