/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Input fields owned by the app: the PIN boxes and the add-record form.
//!
//! Fields are stamped out from a shared [`FieldConfig`], so sibling fields agree on their rules
//! while each keeps its own value.

use crate::record::RecordEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    pub max_len: Option<usize>,
    pub digits_only: bool,
}

impl FieldConfig {
    /// One digit per field, like a PIN pad.
    pub const fn digit() -> Self {
        Self {
            max_len: Some(1),
            digits_only: true,
        }
    }

    pub const fn text() -> Self {
        Self {
            max_len: None,
            digits_only: false,
        }
    }

    pub fn build(&self, label: &str) -> InputField {
        InputField {
            label: label.to_string(),
            config: self.clone(),
            value: String::new(),
        }
    }

    /// `n` unlabeled fields.
    pub fn build_many(&self, n: usize) -> Vec<InputField> {
        (0..n).map(|_| self.build("")).collect()
    }

    fn accepts(&self, value: &str) -> bool {
        if self.digits_only && !value.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        self.max_len.map_or(true, |max| value.chars().count() <= max)
    }
}

#[derive(Debug, Clone)]
pub struct InputField {
    label: String,
    config: FieldConfig,
    value: String,
}

impl InputField {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_filled(&self) -> bool {
        !self.value.is_empty()
    }

    /// Replace the value. Values the field's config doesn't allow are rejected and the old
    /// value is kept.
    pub fn set(&mut self, value: &str) -> bool {
        if !self.config.accepts(value) {
            return false;
        }
        self.value = value.to_string();
        true
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

/// A row of single-digit fields.
#[derive(Debug, Clone)]
pub struct PinInput {
    fields: Vec<InputField>,
}

impl PinInput {
    pub fn new(len: usize) -> Self {
        Self {
            fields: FieldConfig::digit().build_many(len),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entered() == 0
    }

    pub fn entered(&self) -> usize {
        self.fields.iter().filter(|f| f.is_filled()).count()
    }

    pub fn is_filled(&self) -> bool {
        self.fields.iter().all(InputField::is_filled)
    }

    /// Put a digit in the first empty field. Returns false if the digit was rejected or
    /// there was no room.
    pub fn push_digit(&mut self, digit: char) -> bool {
        let mut buf = [0u8; 4];
        match self.fields.iter_mut().find(|f| !f.is_filled()) {
            Some(field) => field.set(digit.encode_utf8(&mut buf)),
            None => false,
        }
    }

    pub fn pop_digit(&mut self) {
        if let Some(field) = self.fields.iter_mut().rev().find(|f| f.is_filled()) {
            field.clear();
        }
    }

    pub fn clear(&mut self) {
        self.fields.iter_mut().for_each(InputField::clear);
    }

    pub fn pin(&self) -> String {
        self.fields.iter().map(InputField::value).collect()
    }
}

/// The name, login and password fields of the add screen.
#[derive(Debug, Clone)]
pub struct RecordForm {
    pub name: InputField,
    pub login: InputField,
    pub password: InputField,
}

impl Default for RecordForm {
    fn default() -> Self {
        let config = FieldConfig::text();
        Self {
            name: config.build("Name"),
            login: config.build("Login"),
            password: config.build("Password"),
        }
    }
}

impl RecordForm {
    pub fn entry(&self) -> RecordEntry {
        RecordEntry::new(self.name.value(), self.login.value(), self.password.value())
    }

    pub fn fill(&mut self, entry: &RecordEntry) {
        // Text fields accept anything.
        self.name.set(&entry.name);
        self.login.set(&entry.login);
        self.password.set(&entry.password);
    }

    pub fn reset(&mut self) {
        self.name.clear();
        self.login.clear();
        self.password.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_are_independent() {
        let mut fields = FieldConfig::digit().build_many(3);
        assert!(fields[0].set("1"));
        assert_eq!(fields[0].value(), "1");
        assert_eq!(fields[1].value(), "");
        assert!(!fields[1].set("12"));
        assert!(!fields[1].set("x"));
        assert_eq!(fields[1].value(), "");
    }

    #[test]
    fn test_pin_input() {
        let mut pin = PinInput::new(4);
        assert!(pin.is_empty());
        assert!(!pin.push_digit('a'));
        for d in ['1', '2', '3'] {
            assert!(pin.push_digit(d));
        }
        assert_eq!(pin.entered(), 3);
        assert!(!pin.is_filled());
        pin.pop_digit();
        assert_eq!(pin.pin(), "12");
        assert!(pin.push_digit('9'));
        assert!(pin.push_digit('0'));
        assert!(pin.is_filled());
        assert!(!pin.push_digit('5'));
        assert_eq!(pin.pin(), "1290");
        pin.clear();
        assert_eq!(pin.pin(), "");
        assert_eq!(pin.len(), 4);
    }

    #[test]
    fn test_record_form() {
        let mut form = RecordForm::default();
        assert_eq!(form.name.label(), "Name");
        form.fill(&RecordEntry::new("Mail", "me", "pw"));
        assert_eq!(form.entry(), RecordEntry::new("Mail", "me", "pw"));
        form.reset();
        assert_eq!(form.entry(), RecordEntry::default());
    }
}
