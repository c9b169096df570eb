/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The application state machine.
//!
//! `App` sits between a front-end and the [`VaultStore`]. The front-end forwards user intents
//! (`submit_pin`, `select`, `save`, ...) and gets back a [`Signal`] it can show as a brief
//! success/failure indicator, plus an [`AppView`] snapshot to render. Errors never escape as
//! errors: they're logged, turned into `Signal::Failure`, and any state they invalidate (a stale
//! selection, a wrong PIN) is reset.
//!
//! ```text
//!            submit_pin(ok)
//!   Locked ─────────────────► Viewing ◄──► Searching
//!                                ▲  │
//!                                │  ▼
//!                               Adding
//! ```
//!
//! There's no way back to `Locked`; the process just exits.

mod clipboard;
mod input;
mod selection;

pub use clipboard::{Clipboard, MemoryClipboard};
pub use input::{FieldConfig, InputField, PinInput, RecordForm};
pub use selection::{Selection, SelectionStage};

use crate::error::{convert_log_error, handle_error, ApiResult, Error, VaultApiError};
use crate::guid::Guid;
use crate::record::{Record, RecordEntry, PIN_LENGTH};
use crate::store::VaultStore;
use selection::{ClipboardAction, Selector};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Locked,
    Viewing,
    Searching,
    Adding,
}

/// The outcome of an intent, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Success,
    Failure,
}

/// Everything a front-end needs to draw the current screen.
#[derive(Debug, Clone)]
pub struct AppView {
    pub screen: Screen,
    pub locked: bool,
    /// The filtered record list, most recently used first. Always empty while locked.
    pub records: Vec<Record>,
    pub selection: Option<Selection>,
    pub filter: String,
    pub form: RecordEntry,
    pub pin_entered: usize,
    pub pin_length: usize,
}

pub struct App<C> {
    store: Arc<VaultStore>,
    clipboard: C,
    screen: Screen,
    filter: String,
    selector: Selector,
    pin: PinInput,
    form: RecordForm,
}

impl<C: Clipboard> App<C> {
    pub fn new(store: Arc<VaultStore>, clipboard: C) -> Self {
        Self {
            store,
            clipboard,
            screen: Screen::Locked,
            filter: String::new(),
            selector: Selector::default(),
            pin: PinInput::new(PIN_LENGTH),
            form: RecordForm::default(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_locked(&self) -> bool {
        self.screen == Screen::Locked
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selector.selected()
    }

    pub fn stage_of(&self, id: &Guid) -> SelectionStage {
        self.selector.stage_of(id)
    }

    pub fn pin_input(&self) -> &PinInput {
        &self.pin
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RecordForm {
        &mut self.form
    }

    /// Try to unlock with `candidate`. A wrong PIN leaves us locked with the PIN input cleared.
    pub fn submit_pin(&mut self, candidate: &str) -> Signal {
        if !self.is_locked() {
            return Signal::Success;
        }
        let settings = match self.store.get_settings() {
            Ok(settings) => settings,
            Err(e) => return self.failure(e),
        };
        if !settings.pin_matches(candidate) {
            return self.failure(convert_log_error(Error::IncorrectPin));
        }
        self.pin.clear();
        self.screen = Screen::Viewing;
        log::info!("Vault unlocked");
        Signal::Success
    }

    /// Type one digit of the PIN. Filling the last box submits it, and the result of that
    /// submission is returned.
    pub fn enter_pin_digit(&mut self, digit: char) -> Option<Signal> {
        if !self.is_locked() || !self.pin.push_digit(digit) || !self.pin.is_filled() {
            return None;
        }
        let candidate = self.pin.pin();
        Some(self.submit_pin(&candidate))
    }

    pub fn clear_pin_digit(&mut self) {
        self.pin.pop_digit();
    }

    pub fn request_list(&mut self) {
        self.switch_to(Screen::Viewing);
    }

    pub fn request_search(&mut self) {
        self.switch_to(Screen::Searching);
    }

    pub fn request_add(&mut self) {
        if self.switch_to(Screen::Adding) {
            self.form.reset();
        }
    }

    /// Save a new record and go back to the list. An empty name is rejected and the input is
    /// kept in the form so it can be corrected.
    pub fn save(&mut self, entry: RecordEntry) -> Signal {
        if !self.expect_screen(Screen::Adding, "save") {
            return Signal::Failure;
        }
        self.form.fill(&entry);
        if let Err(e) = handle_error(|| entry.check_valid()) {
            return self.failure(e);
        }
        if let Err(e) = self.store.add_record(Record::new(entry)) {
            return self.failure(e);
        }
        self.form.reset();
        self.selector.clear();
        self.screen = Screen::Viewing;
        Signal::Success
    }

    /// `save` whatever is currently in the form.
    pub fn save_form(&mut self) -> Signal {
        let entry = self.form.entry();
        self.save(entry)
    }

    /// Show every record again. The selection is kept.
    pub fn clear_filter(&mut self) {
        if self.is_locked() {
            return;
        }
        self.filter.clear();
    }

    pub fn apply_filter(&mut self, text: &str) -> Signal {
        if !self.expect_screen(Screen::Searching, "apply_filter") {
            return Signal::Failure;
        }
        self.filter = text.to_string();
        self.selector.clear();
        self.screen = Screen::Viewing;
        Signal::Success
    }

    /// Click on a record. See the `selection` module for the cycle this steps through.
    pub fn select(&mut self, id: &Guid) -> Signal {
        if !self.expect_screen(Screen::Viewing, "select") {
            return Signal::Failure;
        }
        let record = match self.lookup(id) {
            Ok(record) => record,
            Err(e) => return self.failure(e),
        };
        match self.selector.click(id) {
            ClipboardAction::CopyLogin => self.clipboard.copy(&record.login),
            ClipboardAction::CopyPassword => {
                // Nothing is left selected or copied if the use can't be recorded.
                if let Err(e) = self.store.touch_record(id) {
                    self.selector.clear();
                    self.clipboard.clear();
                    return self.failure(e);
                }
                self.clipboard.copy(&record.password);
            }
            ClipboardAction::Clear => self.clipboard.clear(),
        }
        Signal::Success
    }

    /// Delete the selected record once `confirm` agrees to it.
    ///
    /// Returns `None` when there's nothing to report: we're locked, or the user said no.
    pub fn delete_selected(&mut self, confirm: impl FnOnce(&Record) -> bool) -> Option<Signal> {
        if self.is_locked() {
            return None;
        }
        if !self.expect_screen(Screen::Viewing, "delete_selected") {
            return Some(Signal::Failure);
        }
        let Some(id) = self.selector.selected().map(|sel| sel.id.clone()) else {
            log::debug!("Nothing selected to delete");
            return Some(Signal::Failure);
        };
        let record = match self.lookup(&id) {
            Ok(record) => record,
            Err(e) => return Some(self.failure(e)),
        };
        if !confirm(&record) {
            return None;
        }
        if let Err(e) = self.store.delete_record(&id) {
            return Some(self.failure(e));
        }
        self.selector.clear();
        Some(Signal::Success)
    }

    /// The records to show: everything matching the current filter, most recently used first.
    pub fn records(&self) -> ApiResult<Vec<Record>> {
        if self.is_locked() {
            return Ok(Vec::new());
        }
        let mut records = self.store.get_records()?;
        records.retain(|r| r.matches_filter(&self.filter));
        Ok(records)
    }

    pub fn view(&self) -> ApiResult<AppView> {
        Ok(AppView {
            screen: self.screen,
            locked: self.is_locked(),
            records: self.records()?,
            selection: self.selector.selected().cloned(),
            filter: self.filter.clone(),
            form: self.form.entry(),
            pin_entered: self.pin.entered(),
            pin_length: self.pin.len(),
        })
    }

    fn lookup(&self, id: &Guid) -> ApiResult<Record> {
        self.store.get_record(id)?.ok_or_else(|| {
            convert_log_error(Error::NoSuchRecord(id.to_string()))
        })
    }

    // Returns whether the switch happened.
    fn switch_to(&mut self, screen: Screen) -> bool {
        if self.is_locked() {
            return false;
        }
        self.screen = screen;
        true
    }

    fn expect_screen(&self, screen: Screen, intent: &str) -> bool {
        if self.screen != screen {
            log::debug!("Ignoring {} on the {:?} screen", intent, self.screen);
            return false;
        }
        true
    }

    fn failure(&mut self, err: VaultApiError) -> Signal {
        match err {
            VaultApiError::RecordNotFound { .. } => self.selector.clear(),
            VaultApiError::AuthFailure => self.pin.clear(),
            VaultApiError::StorageUnavailable { .. } | VaultApiError::ValidationFailure { .. } => {}
        }
        if self.is_locked() {
            self.pin.clear();
        }
        Signal::Failure
    }
}
