//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use printvend_core::domain::DomainError;
use printvend_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const PRECONDITION_FAILED: i32 = 4002;
    pub const AUTHENTICATION_FAILED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Precondition(msg) => {
            ErrorObjectOwned::owned(code::PRECONDITION_FAILED, msg, None::<()>)
        }
        AppError::Authentication(msg) => {
            ErrorObjectOwned::owned(code::AUTHENTICATION_FAILED, msg, None::<()>)
        }
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Domain(e) => domain_error(e),
        AppError::Gateway(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Io(e) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>),
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Config(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
        AppError::Internal(msg) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>),
    }
}

fn domain_error(err: DomainError) -> ErrorObjectOwned {
    let code = match &err {
        DomainError::InvalidStatusTransition { .. } | DomainError::MachineOffline(_) => {
            code::PRECONDITION_FAILED
        }
        DomainError::JobNotFound(_) | DomainError::MachineNotFound(_) => code::NOT_FOUND,
        DomainError::InvalidPriority(_) | DomainError::ValidationError(_) => code::VALIDATION_ERROR,
        DomainError::Internal(_) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}
