/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The click-to-copy selection cycle.
//!
//! Clicking a record steps it through `Unselected -> Login -> Password -> Unselected`, copying
//! the login and then the password on the way. Only one record is ever selected; clicking a
//! different one quietly drops the old selection and starts the new record at `Login`.

use crate::guid::Guid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStage {
    Unselected,
    Login,
    Password,
}

impl SelectionStage {
    pub fn next(self) -> Self {
        match self {
            Self::Unselected => Self::Login,
            Self::Login => Self::Password,
            Self::Password => Self::Unselected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: Guid,
    pub stage: SelectionStage,
}

/// What a click means for the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardAction {
    CopyLogin,
    CopyPassword,
    Clear,
}

#[derive(Debug, Default)]
pub struct Selector {
    // Never holds `SelectionStage::Unselected`.
    current: Option<Selection>,
}

impl Selector {
    pub fn selected(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn stage_of(&self, id: &Guid) -> SelectionStage {
        match &self.current {
            Some(sel) if &sel.id == id => sel.stage,
            _ => SelectionStage::Unselected,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn click(&mut self, id: &Guid) -> ClipboardAction {
        let next = self.stage_of(id).next();
        match next {
            SelectionStage::Unselected => {
                self.current = None;
                ClipboardAction::Clear
            }
            stage => {
                self.current = Some(Selection {
                    id: id.clone(),
                    stage,
                });
                if stage == SelectionStage::Login {
                    ClipboardAction::CopyLogin
                } else {
                    ClipboardAction::CopyPassword
                }
            }
        }
    }
}
