//! Validation helper traits for hand-written handlers.
//!
//! The declarative [`Schema`](crate::schema::Schema) layer covers the
//! generic operations; these traits cover the ad-hoc checks hand-written
//! handlers still need.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use paddock_api::validation::ValidateNonEmpty;
///
/// fn rename_stall(name: &str) -> ApiResult<()> {
///     name.validate_non_empty("name")?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is empty or
    /// whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating numeric ranges.
///
/// # Example
/// ```ignore
/// use paddock_api::validation::ValidateRange;
///
/// fn set_capacity(head_count: i32) -> ApiResult<()> {
///     head_count.validate_positive("head_count")?;
///     head_count.validate_range("head_count", 1, 500)?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateRange {
    /// Validate that the value is positive (> 0).
    fn validate_positive(&self, field_name: &str) -> ApiResult<()>;

    /// Validate that the value is within an inclusive range.
    fn validate_range(&self, field_name: &str, min: Self, max: Self) -> ApiResult<()>
    where
        Self: Sized;
}

macro_rules! impl_validate_range {
    ($($t:ty),*) => {
        $(
            impl ValidateRange for $t {
                fn validate_positive(&self, field_name: &str) -> ApiResult<()> {
                    if *self <= 0 as $t {
                        return Err(ApiError::invalid_range(field_name, 1, <$t>::MAX as i64));
                    }
                    Ok(())
                }

                fn validate_range(&self, field_name: &str, min: Self, max: Self) -> ApiResult<()> {
                    if *self < min || *self > max {
                        return Err(ApiError::invalid_range(field_name, min as i64, max as i64));
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_validate_range!(i16, i32, i64);

/// Trait for checking if an update request has any fields set.
///
/// Implement this on update request types to provide a unified
/// "has any updates" check. The generic update operation calls
/// `validate_has_updates` before touching storage, so an empty PATCH body
/// fails as invalid input rather than running a no-op UPDATE.
pub trait HasUpdates {
    /// Check if any update fields are set.
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::invalid_input(
                "At least one field must be provided for update",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_rejects_whitespace() {
        assert!("Juniper".validate_non_empty("name").is_ok());
        assert!("".validate_non_empty("name").is_err());
        assert!("   ".validate_non_empty("name").is_err());
        assert!("  ok  ".validate_non_empty("name").is_ok());
    }

    #[test]
    fn non_empty_option_requires_presence() {
        let present: Option<&str> = Some("barn");
        let empty: Option<&str> = Some("");
        let absent: Option<&str> = None;

        assert!(present.validate_non_empty("barn").is_ok());
        assert!(empty.validate_non_empty("barn").is_err());
        assert!(absent.validate_non_empty("barn").is_err());
    }

    #[test]
    fn positive_and_range() {
        assert!(5i32.validate_positive("count").is_ok());
        assert!(0i32.validate_positive("count").is_err());
        assert!(5i32.validate_range("count", 1, 10).is_ok());
        assert!(11i32.validate_range("count", 1, 10).is_err());
    }

    #[test]
    fn has_updates_default_check() {
        struct Patch {
            name: Option<String>,
        }
        impl HasUpdates for Patch {
            fn has_any_updates(&self) -> bool {
                self.name.is_some()
            }
        }

        assert!(Patch { name: None }.validate_has_updates().is_err());
        assert!(Patch {
            name: Some("x".into())
        }
        .validate_has_updates()
        .is_ok());
    }
}
