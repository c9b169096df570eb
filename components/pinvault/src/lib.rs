/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#![allow(unknown_lints)]
#![warn(rust_2018_idioms)]

//! A PIN-locked personal password vault.
//!
//! - [`VaultStore`] owns the vault file: settings plus a list of login/password records.
//! - [`App`] is the state machine a front-end drives: unlock, list, search, add, select and
//!   delete, reporting each outcome as a [`Signal`].
//!
//! The store is created explicitly and shared with the app by `Arc`; there is no global state.

pub mod app;
pub mod config;
mod error;
mod guid;
mod record;
mod store;

pub use crate::app::{
    App, AppView, Clipboard, MemoryClipboard, Screen, Selection, SelectionStage, Signal,
};
pub use crate::config::VaultConfig;
pub use crate::error::*;
pub use crate::guid::Guid;
pub use crate::record::{Record, RecordEntry, Settings, Vault, DEFAULT_PIN, PIN_LENGTH};
pub use crate::store::VaultStore;
