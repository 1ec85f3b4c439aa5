//! Boundary error codes (`spec.md` §6) and the mapping from
//! [`pamlogix_core::ErrorKind`] onto them.

use pamlogix_core::{ErrorKind, PamlogixError};

/// The five codes a caller outside the process ever sees. Everything a
/// subsystem can return collapses onto one of these at the RPC boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorCode {
    InvalidArgument,
    PermissionDenied,
    FailedPrecondition,
    Unimplemented,
    Internal,
}

impl std::fmt::Display for RpcErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RpcErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            RpcErrorCode::PermissionDenied => "PERMISSION_DENIED",
            RpcErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
            RpcErrorCode::Unimplemented => "UNIMPLEMENTED",
            RpcErrorCode::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

/// A boundary-shaped error: the five-way code plus the subsystem's own
/// sentinel and detail, preserved for logging (`spec.md` §7 propagation
/// policy: "all other errors surface to the caller unchanged").
#[derive(Debug, Clone)]
pub struct RpcError {
    pub code: RpcErrorCode,
    pub sentinel: &'static str,
    pub detail: String,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.code, self.sentinel, self.detail)
    }
}

impl std::error::Error for RpcError {}

impl From<PamlogixError> for RpcError {
    fn from(err: PamlogixError) -> Self {
        let code = match err.kind {
            ErrorKind::InvalidInput => RpcErrorCode::InvalidArgument,
            ErrorKind::NotFound => RpcErrorCode::InvalidArgument,
            ErrorKind::Unauthorized => RpcErrorCode::PermissionDenied,
            ErrorKind::PreconditionFailed => RpcErrorCode::FailedPrecondition,
            ErrorKind::Conflict => RpcErrorCode::FailedPrecondition,
            ErrorKind::InsufficientFunds => RpcErrorCode::FailedPrecondition,
            ErrorKind::InsufficientItems => RpcErrorCode::FailedPrecondition,
            ErrorKind::Unavailable => RpcErrorCode::Unimplemented,
            ErrorKind::Internal => RpcErrorCode::Internal,
        };
        RpcError { code, sentinel: err.sentinel, detail: err.detail }
    }
}

pub(crate) fn unimplemented(sentinel: &'static str, detail: impl Into<String>) -> RpcError {
    RpcError { code: RpcErrorCode::Unimplemented, sentinel, detail: detail.into() }
}
