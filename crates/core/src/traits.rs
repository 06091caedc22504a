//! Core traits for FloorGraph
//!
//! Shared behaviour implemented by the graph entities.

use crate::error::GraphResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use floorgraph_core::{Validatable, GraphResult, GraphError};
///
/// struct Label {
///     text: String,
/// }
///
/// impl Validatable for Label {
///     fn validate(&self) -> GraphResult<()> {
///         if self.text.is_empty() {
///             return Err(GraphError::validation("Label cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `GraphError` describing the problem.
    fn validate(&self) -> GraphResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    struct Level(i32);

    impl Validatable for Level {
        fn validate(&self) -> GraphResult<()> {
            if self.0 < -10 {
                return Err(GraphError::validation("Level too deep"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_default_methods() {
        assert!(Level(0).is_valid());
        assert!(Level(-3).validation_errors().is_empty());
        assert_eq!(
            Level(-11).validation_errors(),
            vec!["Validation error: Level too deep".to_string()]
        );
    }
}
