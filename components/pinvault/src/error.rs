/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Error handling for the vault.
//!
//! There are two error enums. `Error` is used by the implementation and can carry whatever
//! detail is useful for logging. `VaultApiError` is what consumers see, and has one variant per
//! kind of failure they can act on. `GetErrorHandling` decides how an internal error becomes a
//! public one, and at which level it gets logged on the way.

use std::ffi::OsString;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;
// Functions which are part of the public API should use this Result.
pub type ApiResult<T> = std::result::Result<T, VaultApiError>;

// Errors we return via the public interface.
#[derive(Debug, thiserror::Error)]
pub enum VaultApiError {
    /// The vault file is missing, unreadable or not valid vault data.
    #[error("Vault storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// A lookup by id found nothing. Usually means a stale selection.
    #[error("No record with guid exists (when one was required): {reason:?}")]
    RecordNotFound { reason: String },

    #[error("Invalid input: {reason}")]
    ValidationFailure { reason: String },

    #[error("Incorrect PIN")]
    AuthFailure,
}

/// Internal error type. Never returned to consumers directly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Vault file does not exist: {0:?}")]
    VaultMissing(PathBuf),

    #[error("Error parsing vault data: {0}")]
    MalformedVault(#[from] serde_json::Error),

    #[error("IOError: {0}")]
    IOError(#[from] std::io::Error),

    #[error("No record with guid exists (when one was required): {0:?}")]
    NoSuchRecord(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] InvalidRecord),

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] InvalidSettings),

    #[error("Incorrect PIN")]
    IncorrectPin,

    #[error("Invalid path: {0:?}")]
    InvalidPath(OsString),

    #[error("Unable to locate the home directory")]
    NoHomeDir,
}

/// Error::InvalidRecord subtypes
#[derive(Debug, thiserror::Error)]
pub enum InvalidRecord {
    #[error("Name is empty")]
    EmptyName,
}

/// Error::InvalidSettings subtypes
#[derive(Debug, thiserror::Error)]
pub enum InvalidSettings {
    #[error("PIN must be exactly {expected} digits")]
    BadPin { expected: usize },
}

/// Specifies how an internal error is converted to a public one, and whether it is logged.
pub struct ErrorHandling<E> {
    pub err: E,
    log_level: Option<log::Level>,
}

impl<E> ErrorHandling<E> {
    /// Just convert the error without any logging.
    pub fn convert(err: E) -> Self {
        Self {
            err,
            log_level: None,
        }
    }

    pub fn log_info(self) -> Self {
        self.log(log::Level::Info)
    }

    pub fn log_warning(self) -> Self {
        self.log(log::Level::Warn)
    }

    pub fn log_error(self) -> Self {
        self.log(log::Level::Error)
    }

    fn log(self, level: log::Level) -> Self {
        Self {
            log_level: Some(level),
            ..self
        }
    }
}

/// A trait to define how errors are converted and logged.
pub trait GetErrorHandling {
    type ExternalError;

    fn get_error_handling(&self) -> ErrorHandling<Self::ExternalError>;
}

impl GetErrorHandling for Error {
    type ExternalError = VaultApiError;

    fn get_error_handling(&self) -> ErrorHandling<Self::ExternalError> {
        match self {
            // A vault we can't read is never expected and there's no auto-repair, so these are
            // always logged loudly.
            Self::VaultMissing(_)
            | Self::MalformedVault(_)
            | Self::IOError(_)
            | Self::InvalidPath(_)
            | Self::NoHomeDir => ErrorHandling::convert(VaultApiError::StorageUnavailable {
                reason: self.to_string(),
            })
            .log_error(),
            Self::NoSuchRecord(guid) => ErrorHandling::convert(VaultApiError::RecordNotFound {
                reason: guid.to_string(),
            })
            .log_warning(),
            // User mistakes.
            Self::InvalidRecord(why) => ErrorHandling::convert(VaultApiError::ValidationFailure {
                reason: why.to_string(),
            })
            .log_info(),
            Self::InvalidSettings(why) => {
                ErrorHandling::convert(VaultApiError::ValidationFailure {
                    reason: why.to_string(),
                })
                .log_info()
            }
            Self::IncorrectPin => ErrorHandling::convert(VaultApiError::AuthFailure).log_info(),
        }
    }
}

/// Convert an internal error to its public form, logging it as `get_error_handling` says.
pub fn convert_log_error<IE, EE>(e: IE) -> EE
where
    IE: GetErrorHandling<ExternalError = EE> + std::error::Error,
{
    let handling = e.get_error_handling();
    if let Some(level) = handling.log_level {
        log::log!(level, "{}", e);
    }
    handling.err
}

/// Run `f`, converting any internal error it returns into a `VaultApiError`.
pub fn handle_error<T>(f: impl FnOnce() -> Result<T>) -> ApiResult<T> {
    f().map_err(convert_log_error)
}
