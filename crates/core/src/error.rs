//! Error kinds shared by every subsystem, generalized from the teacher
//! pallets' closed `#[pallet::error] enum Error<T>` convention onto a single
//! `Result<T, PamlogixError>` return type (see `spec.md` §7).

use std::fmt;

/// The abstract error families named in `spec.md` §7. A subsystem never
/// invents a tenth kind; it only adds new stable `sentinel` values within
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    PreconditionFailed,
    Conflict,
    NotFound,
    InsufficientFunds,
    InsufficientItems,
    Unavailable,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::InsufficientItems => "insufficient_items",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A stable, named error value. `sentinel` is the thing callers match on
/// (e.g. `"AuctionVersionMismatch"`); `detail` carries the human-readable
/// context for logs.
#[derive(Debug, Clone)]
pub struct PamlogixError {
    pub kind: ErrorKind,
    pub sentinel: &'static str,
    pub detail: String,
}

impl PamlogixError {
    pub fn new(kind: ErrorKind, sentinel: &'static str, detail: impl Into<String>) -> Self {
        Self { kind, sentinel, detail: detail.into() }
    }
}

impl fmt::Display for PamlogixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}: {}", self.kind, self.sentinel)
        } else {
            write!(f, "{}: {} ({})", self.kind, self.sentinel, self.detail)
        }
    }
}

impl std::error::Error for PamlogixError {}

pub type Result<T> = std::result::Result<T, PamlogixError>;

/// Shorthand constructors used throughout subsystem crates, analogous to the
/// teacher's per-variant `Error::<T>::Foo` but not tied to a generic pallet
/// type parameter.
pub fn invalid_input(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::InvalidInput, sentinel, detail)
}

pub fn unauthorized(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::Unauthorized, sentinel, detail)
}

pub fn precondition_failed(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::PreconditionFailed, sentinel, detail)
}

pub fn conflict(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::Conflict, sentinel, detail)
}

pub fn not_found(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::NotFound, sentinel, detail)
}

pub fn insufficient_funds(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::InsufficientFunds, sentinel, detail)
}

pub fn insufficient_items(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::InsufficientItems, sentinel, detail)
}

pub fn unavailable(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::Unavailable, sentinel, detail)
}

pub fn internal(sentinel: &'static str, detail: impl Into<String>) -> PamlogixError {
    PamlogixError::new(ErrorKind::Internal, sentinel, detail)
}
