//! Reply classification
//!
//! Every command returns a numeric code:
//! - `0` is success
//! - `> 0` is a reader status: a condition such as "no transponder", not a fault
//! - `< 0` is an error: the call failed and should not be retried blindly

use std::fmt;

use crate::error::Result;

/// Class of a reply code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Success,
    Status,
    Error,
}

/// Classify a reply code
pub fn classify(code: i32) -> Classification {
    match code {
        0 => Classification::Success,
        c if c > 0 => Classification::Status,
        _ => Classification::Error,
    }
}

/// Result of one protocol operation
///
/// `text` is filled in by the status/error resolver; it stays `None` when
/// the lookup itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Command succeeded with its payload
    Success(T),

    /// Non-fatal reader status
    Status { code: i32, text: Option<String> },

    /// Fatal error for this call
    Error { code: i32, text: Option<String> },
}

impl<T> Outcome<T> {
    /// Build an outcome from a reply code, decoding the payload only on success
    ///
    /// # Examples
    ///
    /// ```
    /// use obidrfid_core::Outcome;
    ///
    /// let ok: Outcome<u8> = Outcome::from_code(0, || Ok(7)).unwrap();
    /// assert_eq!(ok, Outcome::Success(7));
    ///
    /// let status: Outcome<u8> = Outcome::from_code(5, || unreachable!()).unwrap();
    /// assert!(status.is_status());
    /// ```
    pub fn from_code<F>(code: i32, decode: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T>,
    {
        match classify(code) {
            Classification::Success => decode().map(Self::Success),
            Classification::Status => Ok(Self::Status { code, text: None }),
            Classification::Error => Ok(Self::Error { code, text: None }),
        }
    }

    /// Attach resolved text to a Status/Error outcome; Success is unchanged
    pub fn with_text(self, text: Option<String>) -> Self {
        match self {
            Self::Success(v) => Self::Success(v),
            Self::Status { code, .. } => Self::Status { code, text },
            Self::Error { code, .. } => Self::Error { code, text },
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            Self::Success(_) => Classification::Success,
            Self::Status { .. } => Classification::Status,
            Self::Error { .. } => Classification::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Reply code (`0` for success)
    pub fn code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Status { code, .. } | Self::Error { code, .. } => *code,
        }
    }

    /// Resolved text of a Status/Error outcome
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Status { text, .. } | Self::Error { text, .. } => text.as_deref(),
        }
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(v) => Outcome::Success(f(v)),
            Self::Status { code, text } => Outcome::Status { code, text },
            Self::Error { code, text } => Outcome::Error { code, text },
        }
    }

    /// Payload of a successful outcome
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_success(&self) -> Option<&T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    /// Payload on success, `T::default()` otherwise (e.g. an empty inventory)
    pub fn success_or_default(self) -> T
    where
        T: Default,
    {
        self.success().unwrap_or_default()
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, code, text) = match self {
            Self::Success(_) => return write!(f, "Success"),
            Self::Status { code, text } => ("Status", code, text),
            Self::Error { code, text } => ("Error", code, text),
        };

        match text {
            Some(text) => write!(f, "{}({}: {})", kind, code, text),
            None => write!(f, "{}({})", kind, code),
        }
    }
}
