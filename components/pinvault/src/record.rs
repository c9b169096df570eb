/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Vault data types
//!
//! The whole vault lives in one JSON document:
//!
//! ```json
//! {
//!   "settings": {"pin": "0000", "web_mode": false},
//!   "records": [
//!     {"id": "Yb3JvJ0XxmdA", "name": "Mail", "login": "me@x.com", "password": "p1",
//!      "use_time": "2024-05-01 09:30:00"}
//!   ]
//! }
//! ```
//!
//! - `id`: a generated [`Guid`]. Everything that needs to find "this record again" (touching,
//!   deleting, selection) goes through it. Files edited by hand may omit it or repeat one, in
//!   which case the store assigns a fresh one on its next write.
//!
//! - `name`, `login`, `password`: the credential itself. `name` is required and may not be empty;
//!   the other two may be.
//!
//! - `use_time`: local wall-clock time the record was created or its password last used, with
//!   second precision.
//!
//! Two records are *equal* when their `(name, login, password)` match, regardless of `id` and
//! `use_time`. That equality is only used to detect duplicates; it is never used to find a
//! record.

use crate::error::*;
use crate::guid::Guid;
use chrono::{Local, NaiveDateTime, SubsecRound};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 4;

pub const DEFAULT_PIN: &str = "0000";

/// Current local time, truncated to the precision we persist.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// The user-supplied part of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEntry {
    pub name: String,
    pub login: String,
    pub password: String,
}

impl RecordEntry {
    pub fn new(
        name: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn check_valid(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(InvalidRecord::EmptyName.into());
        }
        Ok(())
    }
}

/// A stored credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Guid,
    pub name: String,
    pub login: String,
    pub password: String,
    #[serde(rename = "use_time", with = "use_time_format")]
    pub last_used: NaiveDateTime,
}

impl Record {
    /// Create a new record from an entry, with a fresh id and `last_used` set to now.
    pub fn new(entry: RecordEntry) -> Self {
        Self {
            id: Guid::random(),
            name: entry.name,
            login: entry.login,
            password: entry.password,
            last_used: now(),
        }
    }

    pub fn entry(&self) -> RecordEntry {
        RecordEntry {
            name: self.name.clone(),
            login: self.login.clone(),
            password: self.password.clone(),
        }
    }

    /// Structural equality against an entry, see the module docs.
    pub fn is_duplicate_of(&self, entry: &RecordEntry) -> bool {
        self.name == entry.name && self.login == entry.login && self.password == entry.password
    }

    /// Case-insensitive substring match against the name or login. An empty filter matches
    /// everything.
    pub fn matches_filter(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let filter = filter.to_lowercase();
        self.name.to_lowercase().contains(&filter) || self.login.to_lowercase().contains(&filter)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.is_duplicate_of(&other.entry())
    }
}

impl Eq for Record {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub pin: String,
    pub web_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin: DEFAULT_PIN.to_string(),
            web_mode: false,
        }
    }
}

impl Settings {
    pub fn check_valid(&self) -> Result<()> {
        if self.pin.len() != PIN_LENGTH || !self.pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidSettings::BadPin {
                expected: PIN_LENGTH,
            }
            .into());
        }
        Ok(())
    }

    /// Compare a candidate PIN against ours. Runs in time independent of where the first
    /// mismatching digit is.
    pub fn pin_matches(&self, candidate: &str) -> bool {
        let (a, b) = (self.pin.as_bytes(), candidate.as_bytes());
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

/// Settings plus every record; the unit the store reads and writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vault {
    pub settings: Settings,
    pub records: Vec<Record>,
}

impl Vault {
    /// Give a fresh id to every record that lacks one, or whose id is already used by an
    /// earlier record (a copy-pasted entry). Returns how many were fixed up.
    pub fn fix_up_ids(&mut self) -> usize {
        let mut seen = HashSet::with_capacity(self.records.len());
        let mut fixed = 0;
        for record in &mut self.records {
            if record.id.is_empty() || seen.contains(&record.id) {
                record.id = Guid::random();
                fixed += 1;
            }
            seen.insert(record.id.clone());
        }
        fixed
    }

    /// Whether `fix_up_ids` would change anything.
    pub fn needs_id_fix_up(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.records.len());
        self.records
            .iter()
            .any(|r| r.id.is_empty() || !seen.insert(&r.id))
    }

    pub fn find(&self, id: &Guid) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn position(&self, id: &Guid) -> Result<usize> {
        self.records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| Error::NoSuchRecord(id.to_string()))
    }

    /// Records, most recently used first. The sort is stable, so records with the same
    /// timestamp keep their file order.
    pub fn records_by_use(&self) -> Vec<Record> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        records
    }
}

mod use_time_format {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(D::Error::custom)
    }
}
