/*
 * Copyright (c) 2021. Erik Escher. PortuLock Keyserver. GPL-3.0-only.
 * SPDX-License-Identifier: GPL-3.0-only
 */

use thiserror::Error;

/// Errors returned by the HKP client.
#[derive(Error, Debug)]
pub enum HkpError {
    /// A record field could not be interpreted.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// An index line carried the wrong number of fields for its tag.
    #[error("malformed {tag} record: expected {expected} fields, found {found}")]
    FieldCount {
        tag: &'static str,
        expected: usize,
        found: usize,
    },

    /// A record in an index response failed to parse.
    #[error("index line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<HkpError>,
    },

    /// The transport failed; the underlying error is passed through as is.
    #[error(transparent)]
    Transport(anyhow::Error),

    /// A key response did not contain the named armor marker.
    #[error("key response does not contain {0:?}")]
    MissingArmorMarker(&'static str),
}

impl HkpError {
    pub(crate) fn invalid_field(field: &'static str, value: &str, reason: impl ToString) -> Self {
        HkpError::InvalidField {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Malformed numeric fields or wrong field counts.
    pub fn is_validation(&self) -> bool {
        match self {
            HkpError::InvalidField { .. } | HkpError::FieldCount { .. } => true,
            HkpError::Line { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, HkpError::Transport(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, HkpError::MissingArmorMarker(_))
    }
}

pub type Result<T> = std::result::Result<T, HkpError>;

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::HkpError;

    #[test]
    fn line_errors_keep_their_category() {
        let inner = HkpError::FieldCount {
            tag: "pub",
            expected: 6,
            found: 2,
        };
        let error = HkpError::Line {
            line: 3,
            source: Box::new(inner),
        };
        assert!(error.is_validation());
        assert_eq!(
            error.to_string(),
            "index line 3: malformed pub record: expected 6 fields, found 2"
        );
    }

    #[test]
    fn transport_error_is_passed_through() {
        let error = HkpError::Transport(anyhow!("connection refused"));
        assert!(error.is_transport());
        assert!(!error.is_validation());
        assert_eq!(error.to_string(), "connection refused");
    }
}
