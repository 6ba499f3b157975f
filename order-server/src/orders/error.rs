use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use thiserror::Error;

use crate::db::StorageError;

/// Order engine errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Table not found")]
    TableNotFound,

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order item not found: {0}")]
    LineNotFound(i64),

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("{name} is out of stock")]
    OutOfStock { menu_item_id: i64, name: String },

    #[error("Order must contain at least one item")]
    Empty,

    #[error("{0}")]
    Invalid(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {order_id} is {status} and can no longer be modified")]
    NotEditable { order_id: i64, status: OrderStatus },

    #[error("Order already paid: {0}")]
    AlreadyPaid(i64),

    #[error("Table has no active orders")]
    NoActiveOrders,

    #[error("Order {0} was modified concurrently, reload and retry")]
    VersionConflict(i64),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for OrderError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::VersionConflict { order_id } => OrderError::VersionConflict(order_id),
            other => OrderError::Storage(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::TableNotFound => AppError::new(ErrorCode::TableNotFound),
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            OrderError::LineNotFound(id) => {
                AppError::with_message(ErrorCode::OrderItemNotFound, message)
                    .with_detail("item_id", id)
            }
            OrderError::MenuItemNotFound(id) => {
                AppError::with_message(ErrorCode::ProductNotFound, message)
                    .with_detail("menu_item_id", id)
            }
            OrderError::OutOfStock { menu_item_id, .. } => {
                AppError::with_message(ErrorCode::ProductOutOfStock, message)
                    .with_detail("menu_item_id", menu_item_id)
            }
            OrderError::Empty => AppError::new(ErrorCode::OrderEmpty),
            OrderError::Invalid(_) => AppError::with_message(ErrorCode::ValidationFailed, message),
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::NotEditable { status, .. } => {
                AppError::with_message(ErrorCode::OrderNotEditable, message)
                    .with_detail("status", status.as_str())
            }
            OrderError::AlreadyPaid(_) => AppError::with_message(ErrorCode::OrderAlreadyPaid, message),
            OrderError::NoActiveOrders => AppError::new(ErrorCode::NoActiveOrders),
            OrderError::VersionConflict(_) => {
                AppError::with_message(ErrorCode::OrderVersionConflict, message)
            }
            OrderError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn taxonomy_statuses() {
        let cases = [
            (OrderError::OrderNotFound(1), StatusCode::NOT_FOUND),
            (OrderError::TableNotFound, StatusCode::NOT_FOUND),
            (
                OrderError::InvalidTransition {
                    from: OrderStatus::Served,
                    to: OrderStatus::Cancelled,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (OrderError::NoActiveOrders, StatusCode::UNPROCESSABLE_ENTITY),
            (
                OrderError::OutOfStock {
                    menu_item_id: 1,
                    name: "Pho".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (OrderError::VersionConflict(1), StatusCode::CONFLICT),
            (OrderError::Empty, StatusCode::BAD_REQUEST),
            (OrderError::Invalid("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).http_status(), status);
        }
    }

    #[test]
    fn storage_conflict_becomes_version_conflict() {
        let err: OrderError = StorageError::VersionConflict { order_id: 4 }.into();
        assert!(matches!(err, OrderError::VersionConflict(4)));
    }
}
