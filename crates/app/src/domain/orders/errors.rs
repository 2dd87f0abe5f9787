//! Orders service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::orders::{OrderError, TransitionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The order changed while the update was being applied.
    #[error("order was modified concurrently")]
    Conflict,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use storefront::orders::OrderStatus;

    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let error = OrdersServiceError::from(Error::RowNotFound);

        assert!(
            matches!(error, OrdersServiceError::NotFound),
            "expected NotFound, got {error:?}"
        );
    }

    #[test]
    fn transition_errors_are_wrapped() {
        let error = OrdersServiceError::from(TransitionError::NotCancellable(OrderStatus::Shipped));

        assert_eq!(
            error.to_string(),
            "order is shipped and can no longer be cancelled"
        );
    }
}
