//! Error types for cut construction, wiring and evaluation.
//!
//! Every variant is a configuration or programming error: raised
//! synchronously where it is detected and never retried internally.

use crate::params::ParamError;

/// Errors raised by cuts, the cut dictionary, the factory and the manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CutError {
    /// `initialize` was called twice without an intervening `reset`.
    #[error("{subject} is already initialized")]
    AlreadyInitialized { subject: String },

    /// An operation requiring initialization was called too early.
    #[error("{subject} is not initialized")]
    NotInitialized { subject: String },

    /// A combinator names a sibling cut that the dictionary does not hold.
    #[error("{cut} references unknown cut '{reference}'")]
    MissingReference { cut: String, reference: String },

    /// A cut name is already taken in the dictionary.
    #[error("duplicate cut name: '{0}'")]
    DuplicateName(String),

    /// A type identifier is already registered in the factory.
    #[error("duplicate cut type id: '{0}'")]
    DuplicateTypeId(String),

    /// The factory has no constructor for this type identifier.
    #[error("unknown cut type id: '{type_id}'")]
    UnknownTypeId { type_id: String },

    /// Lookup of a cut name that the manager does not hold.
    #[error("unknown cut name: '{0}'")]
    UnknownCutName(String),

    /// A combinator child slot was never resolved, or the handle does not
    /// belong to the dictionary it was dereferenced against.
    #[error("{cut} has an unbound handle in slot {slot}")]
    UnboundHandle { cut: String, slot: String },

    /// The reference graph loops back on itself.
    #[error("cyclic cut reference: {}", path.join(" -> "))]
    CyclicReference { path: Vec<String> },

    /// A mandatory parameter is absent.
    #[error("{cut} is missing mandatory parameter '{key}'")]
    MissingParameter { cut: String, key: String },

    /// A parameter is present but unusable.
    #[error("{cut} has invalid parameter '{key}': {message}")]
    InvalidParameter {
        cut: String,
        key: String,
        message: String,
    },

    /// A multi-cut was configured without any child.
    #[error("{cut} needs at least one cut name in 'cuts'")]
    EmptyCutList { cut: String },
}

impl CutError {
    /// Attach the owning cut's label to a parameter lookup failure.
    pub fn parameter(cut: impl Into<String>, err: ParamError) -> Self {
        let cut = cut.into();
        match err {
            ParamError::Missing { key } => Self::MissingParameter { cut, key },
            ParamError::WrongType {
                key,
                expected,
                found,
            } => Self::InvalidParameter {
                cut,
                key,
                message: format!("expected {expected}, found {found}"),
            },
        }
    }

    /// Build an `InvalidParameter` error.
    pub fn invalid_parameter(
        cut: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            cut: cut.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_reference_renders_the_path() {
        let err = CutError::CyclicReference {
            path: vec!["x".into(), "y".into(), "x".into()],
        };
        assert_eq!(err.to_string(), "cyclic cut reference: x -> y -> x");
    }

    #[test]
    fn parameter_errors_carry_the_cut_label() {
        let err = CutError::parameter(
            "cut 'both'",
            ParamError::Missing {
                key: "cut_1".into(),
            },
        );
        assert_eq!(
            err,
            CutError::MissingParameter {
                cut: "cut 'both'".into(),
                key: "cut_1".into(),
            }
        );

        let err = CutError::parameter(
            "cut 'both'",
            ParamError::WrongType {
                key: "cut_2".into(),
                expected: "string",
                found: "integer",
            },
        );
        assert_eq!(
            err.to_string(),
            "cut 'both' has invalid parameter 'cut_2': expected string, found integer"
        );
    }
}
