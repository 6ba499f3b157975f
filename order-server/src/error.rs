//! Unified service-layer error type
//!
//! `ServiceError` bridges the gap between storage errors and the API-layer
//! error (`AppError`). It enables `?` propagation without manual
//! `.map_err(|e| { tracing::error!(...); AppError::new(...) })` boilerplate.

use shared::error::{AppError, ErrorCode};

use crate::BoxError;
use crate::db::StorageError;

/// Service-layer error: only two variants, keeps things simple.
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::App(AppError::new(ErrorCode::TableNotFound)).into();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[test]
    fn storage_errors_are_masked() {
        let err: AppError = ServiceError::from(StorageError::Corrupt("bad status".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("bad status"));
    }
}
