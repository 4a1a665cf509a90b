//! Structured elaboration errors.
//!
//! Every fallible operation in this crate returns one of these variants,
//! never a bare string. Downstream callers match on `Error` instead of
//! grepping a message.

/// Error produced while elaborating an AST into a type model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`{name}` is already defined as {kind}")]
    AlreadyDefined { name: String, kind: &'static str },

    #[error("undefined {kind} `{name}`")]
    Undefined { name: String, kind: &'static str },

    #[error("{entity} is missing mandatory field `{field}`")]
    MissingMandatory {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid attribute `{attr}`: {reason}")]
    InvalidAttribute { attr: String, reason: String },

    #[error("invalid structure in {context}: {reason}")]
    InvalidStructure {
        context: &'static str,
        reason: String,
    },

    #[error("unsupported feature: {0}")]
    Unsupported(&'static str),

    #[error("failed to parse {kind} from `{raw}`")]
    ParseValue { kind: &'static str, raw: String },
}

pub type Result<T> = std::result::Result<T, Error>;
