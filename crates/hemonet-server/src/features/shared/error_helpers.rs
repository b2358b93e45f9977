//! Database error handling utilities
//!
//! Helpers for recognizing constraint violations so commands can map them to
//! their own error variants instead of surfacing raw database errors.

use sqlx::Error as SqlxError;

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Check if the error is a foreign key violation
pub fn is_foreign_key_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_foreign_key_violation();
    }
    false
}

/// Map a unique constraint violation to a custom error
///
/// If the error is a unique violation, returns `unique_error`; otherwise
/// wraps the original error with `default_wrapper`.
pub fn map_unique_violation<E, F>(error: SqlxError, unique_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_unique_violation(&error) {
        unique_error
    } else {
        default_wrapper(error)
    }
}

/// Map a foreign key violation to a custom error
pub fn map_foreign_key_violation<E, F>(error: SqlxError, fk_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_foreign_key_violation(&error) {
        fk_error
    } else {
        default_wrapper(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Constraint-specific sqlx errors can't be constructed without a live
    // database; these cover the non-violation paths.

    #[test]
    fn test_non_database_error_is_not_a_violation() {
        let err = SqlxError::RowNotFound;
        assert!(!is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
    }

    #[test]
    fn test_map_unique_violation_falls_through() {
        #[derive(Debug, PartialEq)]
        enum TestError {
            Duplicate,
            Database,
        }

        let mapped = map_unique_violation(SqlxError::RowNotFound, TestError::Duplicate, |_| {
            TestError::Database
        });
        assert_eq!(mapped, TestError::Database);
    }
}
