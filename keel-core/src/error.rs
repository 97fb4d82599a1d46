use crate::Error;
use std::{
    fmt::{self, Display},
    time::Duration,
};

/// Failure categories callers can tell apart.
///
/// Errors are returned as [`Error`] (`anyhow::Error`), the kind is attached either
/// as the error itself or as its context. Use [`ErrorKind::of`] to recover it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No backend implements the requested dialect.
    UnsupportedDialect(String),
    /// The dialect is known but its driver does not exist yet.
    NotImplemented(String),
    /// No entity definition is registered under this name.
    UnknownEntity(String),
    UnknownField { entity: String, field: String },
    /// A fetch expecting at least one row found none.
    EmptyResult { table: String },
    /// A write failed and the transaction was rolled back, the source is the driver error.
    TransactionFailed,
    /// Following the relations would never terminate.
    CyclicRelation(String),
    Timeout(Duration),
}

impl ErrorKind {
    /// Outermost kind attached to `error`.
    pub fn of(error: &Error) -> Option<&ErrorKind> {
        error.downcast_ref::<ErrorKind>()
    }

    /// Innermost kind that caused `error`, skipping the ones attached as context.
    pub fn root_of(error: &Error) -> Option<&ErrorKind> {
        error
            .chain()
            .filter_map(|e| e.downcast_ref::<ErrorKind>())
            .last()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnsupportedDialect(v) => {
                write!(f, "Database type `{}` is not supported", v)
            }
            ErrorKind::NotImplemented(v) => {
                write!(f, "Database type `{}` is not implemented yet", v)
            }
            ErrorKind::UnknownEntity(v) => write!(f, "Entity `{}` is not registered", v),
            ErrorKind::UnknownField { entity, field } => {
                write!(f, "Entity `{}` does not have a field `{}`", entity, field)
            }
            ErrorKind::EmptyResult { table } => {
                write!(f, "The query on `{}` did not return any row", table)
            }
            ErrorKind::TransactionFailed => {
                f.write_str("The transaction failed and was rolled back")
            }
            ErrorKind::CyclicRelation(v) => {
                write!(f, "Cyclic relation detected while following `{}`", v)
            }
            ErrorKind::Timeout(v) => {
                write!(f, "The statement did not complete within {}ms", v.as_millis())
            }
        }
    }
}

impl std::error::Error for ErrorKind {}
