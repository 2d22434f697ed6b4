//! Crate-wide error taxonomy.
//!
//! Mirrors the three-kind classification used throughout this library's
//! stream and codec layers: malformed input (`BadFormat`), OS-level failure
//! (`System`), and internal misuse (`Logic`). Modeled on the hand-rolled
//! error enums the rest of this crate's ancestry uses (manual `Display` +
//! `std::error::Error`, no `anyhow`/`thiserror`) since every fallible
//! operation here is a library boundary, not a CLI-ergonomics boundary.

use core::fmt;
use std::error::Error as StdError;

/// A single error value covering every failure mode this crate raises.
#[derive(Debug, Clone)]
pub enum SamError {
    /// Malformed SAM text, a truncated or invalid BGZF/BAM block, an
    /// unrecognised flag string, an unknown sequence base, a duplicate
    /// reference name, or a lookup of a reference/read-group that does not
    /// exist.
    BadFormat {
        message: String,
        filename: Option<String>,
        record: Option<u64>,
    },
    /// An OS-level failure: a failed syscall in the raw file buffer, or a
    /// failed `flate2` inflate/deflate call.
    System {
        operation: &'static str,
        errno: Option<i32>,
        path: Option<String>,
    },
    /// Use of a closed stream, or a request for functionality the raw
    /// buffer deliberately does not provide (character-oriented I/O).
    Logic { message: &'static str },
}

impl SamError {
    pub fn bad_format(message: impl Into<String>) -> Self {
        SamError::BadFormat {
            message: message.into(),
            filename: None,
            record: None,
        }
    }

    /// Attach a filename to an existing error, if it doesn't already carry one.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        if let SamError::BadFormat { filename: f, .. } = &mut self {
            if f.is_none() {
                *f = Some(filename.into());
            }
        }
        self
    }

    /// Attach a record number to an existing error, if it doesn't already carry one.
    pub fn with_record(mut self, record: u64) -> Self {
        if let SamError::BadFormat { record: r, .. } = &mut self {
            if r.is_none() {
                *r = Some(record);
            }
        }
        self
    }

    pub fn system(operation: &'static str, errno: Option<i32>, path: Option<String>) -> Self {
        SamError::System {
            operation,
            errno,
            path,
        }
    }

    pub fn logic(message: &'static str) -> Self {
        SamError::Logic { message }
    }

    /// True for the `BadFormat` variant (maps to the `fail` stream state flag).
    pub fn is_bad_format(&self) -> bool {
        matches!(self, SamError::BadFormat { .. })
    }

    /// True for `System`/`Logic` (maps to the `bad` stream state flag).
    pub fn is_bad(&self) -> bool {
        matches!(self, SamError::System { .. } | SamError::Logic { .. })
    }
}

impl fmt::Display for SamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamError::BadFormat {
                message,
                filename,
                record,
            } => {
                write!(f, "{}", message)?;
                if let Some(name) = filename {
                    write!(f, " for \"{}\"", name)?;
                }
                if let Some(n) = record {
                    write!(f, " at record {}", n)?;
                }
                Ok(())
            }
            SamError::System {
                operation,
                errno,
                path,
            } => {
                write!(f, "{}", operation)?;
                if let Some(p) = path {
                    write!(f, " for \"{}\"", p)?;
                }
                if let Some(code) = errno {
                    let errno = nix::errno::Errno::from_raw(*code);
                    write!(f, ": {}", errno)?;
                }
                Ok(())
            }
            SamError::Logic { message } => write!(f, "{}", message),
        }
    }
}

impl StdError for SamError {}

impl From<nix::Error> for SamError {
    fn from(e: nix::Error) -> Self {
        SamError::System {
            operation: "syscall",
            errno: Some(e as i32),
            path: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SamError>;
