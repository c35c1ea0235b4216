use std::fmt;

use deep_clone::{Diagnostics, Value};
use thiserror::Error;

use crate::diagnostics;

/// A requested size or size change, as accepted by the resizing operations of
/// [`CachePool`][crate::CachePool].
///
/// Sizes arrive in many shapes: as Rust integers, as floating point numbers that may be
/// fractional or negative, as dynamically typed [`Value`]s or not at all. Every shape converts
/// into a `SizeInput`, which is validated when the operation runs:
///
/// * negative, infinite, `NaN` and non-numeric inputs are rejected and the operation does nothing;
/// * fractional inputs are floored;
/// * [`SizeInput::Unspecified`] selects the default behavior of the operation, if it has one.
///
/// # Example
///
/// ```
/// use cache_pool::SizeInput;
///
/// assert_eq!(SizeInput::from(4_usize), SizeInput::Count(4));
/// assert_eq!(SizeInput::from(None::<u32>), SizeInput::Unspecified);
/// assert_eq!(SizeInput::from(2.5), SizeInput::Number(2.5));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub enum SizeInput {
    /// No size was given.
    #[default]
    Unspecified,

    /// A whole number of slots.
    Count(usize),

    /// A number that may be fractional, negative or not finite.
    Number(f64),

    /// Something that is not a number at all, described by the contained text.
    NotANumber(String),
}

impl SizeInput {
    /// Validates the input on behalf of the operation that sets `field`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSize`] if the input is negative, not finite or not a number.
    pub fn resolve(&self, field: &'static str) -> Result<Resolution, InvalidSize> {
        match self {
            Self::Unspecified => Ok(Resolution::Unspecified),
            Self::Count(count) => Ok(Resolution::Exact(*count)),
            Self::Number(number) if number.is_finite() && *number >= 0.0 => {
                let count = saturating_floor(*number);

                if number.fract() == 0.0 {
                    Ok(Resolution::Exact(count))
                } else {
                    Ok(Resolution::Floored {
                        requested: *number,
                        count,
                    })
                }
            }
            Self::Number(_) | Self::NotANumber(_) => Err(InvalidSize::new(field, self)),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the number is finite and non-negative and the conversion saturates at usize::MAX"
)]
fn saturating_floor(number: f64) -> usize {
    number.floor() as usize
}

impl fmt::Display for SizeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("unspecified"),
            Self::Count(count) => write!(f, "{count}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::NotANumber(text) => f.write_str(text),
        }
    }
}

impl From<usize> for SizeInput {
    fn from(value: usize) -> Self {
        Self::Count(value)
    }
}

impl From<u32> for SizeInput {
    fn from(value: u32) -> Self {
        Self::Count(usize::try_from(value).unwrap_or(usize::MAX))
    }
}

impl From<u64> for SizeInput {
    fn from(value: u64) -> Self {
        Self::Count(usize::try_from(value).unwrap_or(usize::MAX))
    }
}

impl From<i32> for SizeInput {
    fn from(value: i32) -> Self {
        match usize::try_from(value) {
            Ok(count) => Self::Count(count),
            Err(_) => Self::Number(f64::from(value)),
        }
    }
}

impl From<i64> for SizeInput {
    #[expect(
        clippy::cast_precision_loss,
        reason = "only reached for negative values, which are rejected whatever their magnitude"
    )]
    fn from(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(count) => Self::Count(count),
            Err(_) => Self::Number(value as f64),
        }
    }
}

impl From<f32> for SizeInput {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for SizeInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SizeInput {
    fn from(value: &str) -> Self {
        Self::NotANumber(format!("{value:?}"))
    }
}

impl<T: Into<Self>> From<Option<T>> for SizeInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unspecified, Into::into)
    }
}

impl From<&Value> for SizeInput {
    /// `undefined` and `null` are unspecified, numbers are numbers and anything else is not a
    /// number.
    fn from(value: &Value) -> Self {
        if value.is_nullish() {
            return Self::Unspecified;
        }

        match value.as_number() {
            Some(number) => Self::Number(number),
            None => Self::NotANumber(format!("{value:?}")),
        }
    }
}

/// The outcome of validating a [`SizeInput`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Resolution {
    /// No size was given.
    Unspecified,

    /// The input was a whole number.
    Exact(usize),

    /// The input was fractional and has been floored to `count`.
    Floored {
        /// The input as given.
        requested: f64,

        /// The floored count.
        count: usize,
    },
}

impl Resolution {
    /// The resolved count, if a size was given.
    #[must_use]
    pub fn count(self) -> Option<usize> {
        match self {
            Self::Unspecified => None,
            Self::Exact(count) | Self::Floored { count, .. } => Some(count),
        }
    }
}

/// A size that cannot be applied to a cache pool because it is negative, not finite or not a
/// number.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot set {field} of cache pool to a negative or non-number value: {value}")]
#[non_exhaustive]
pub struct InvalidSize {
    /// The pool property that was being set.
    pub field: &'static str,

    /// The rejected input.
    pub value: String,
}

impl InvalidSize {
    pub(crate) fn new(field: &'static str, input: &SizeInput) -> Self {
        Self {
            field,
            value: input.to_string(),
        }
    }
}

/// Validates an optional size, reporting diagnostics for rejected and floored inputs.
///
/// `Ok(None)` means no size was given.
pub(crate) fn validate(
    diagnostics: Diagnostics,
    field: &'static str,
    input: &SizeInput,
) -> Result<Option<usize>, InvalidSize> {
    match input.resolve(field) {
        Ok(resolution) => {
            if let Resolution::Floored { requested, count } = resolution {
                diagnostics::floored_size(diagnostics, field, requested, count);
            }

            Ok(resolution.count())
        }
        Err(error) => {
            diagnostics::invalid_size(diagnostics, &error);
            Err(error)
        }
    }
}

/// Validates a size that must be given.
pub(crate) fn validate_required(
    diagnostics: Diagnostics,
    field: &'static str,
    input: &SizeInput,
) -> Result<usize, InvalidSize> {
    match validate(diagnostics, field, input)? {
        Some(count) => Ok(count),
        None => {
            let error = InvalidSize::new(field, input);
            diagnostics::invalid_size(diagnostics, &error);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_are_exact() {
        assert_eq!(SizeInput::from(3_usize).resolve("x"), Ok(Resolution::Exact(3)));
        assert_eq!(SizeInput::from(3.0).resolve("x"), Ok(Resolution::Exact(3)));
        assert_eq!(SizeInput::from(0_i32).resolve("x"), Ok(Resolution::Exact(0)));
        assert_eq!(SizeInput::from(-0.0).resolve("x"), Ok(Resolution::Exact(0)));
    }

    #[test]
    fn fractions_are_floored() {
        let resolution = SizeInput::from(15.5).resolve("max capacity").unwrap();

        assert_eq!(
            resolution,
            Resolution::Floored {
                requested: 15.5,
                count: 15
            }
        );
        assert_eq!(resolution.count(), Some(15));
    }

    #[test]
    fn negative_and_non_numbers_are_rejected() {
        for input in [
            SizeInput::from(-1_i32),
            SizeInput::from(-1_i64),
            SizeInput::from(-0.5),
            SizeInput::from(f64::NAN),
            SizeInput::from(f64::INFINITY),
            SizeInput::from("ten"),
            SizeInput::from(&Value::from(true)),
        ] {
            let error = input.resolve("expand").unwrap_err();
            assert_eq!(error.field, "expand");
        }
    }

    #[test]
    fn error_describes_field_and_value() {
        let error = SizeInput::from(-2_i32).resolve("shrink").unwrap_err();

        assert_eq!(
            error.to_string(),
            "cannot set shrink of cache pool to a negative or non-number value: -2"
        );
    }

    #[test]
    fn unspecified_sources() {
        assert_eq!(SizeInput::from(None::<usize>), SizeInput::Unspecified);
        assert_eq!(SizeInput::from(&Value::Undefined), SizeInput::Unspecified);
        assert_eq!(SizeInput::from(&Value::Null), SizeInput::Unspecified);
        assert_eq!(SizeInput::default().resolve("x"), Ok(Resolution::Unspecified));
        assert_eq!(Resolution::Unspecified.count(), None);
    }

    #[test]
    fn values_convert_by_type() {
        assert_eq!(SizeInput::from(&Value::from(7)), SizeInput::Number(7.0));
        assert!(matches!(
            SizeInput::from(&Value::from("7")),
            SizeInput::NotANumber(_)
        ));
    }

    #[test]
    fn required_rejects_unspecified() {
        let error =
            validate_required(Diagnostics::Suppress, "capacity", &SizeInput::Unspecified)
                .unwrap_err();

        assert_eq!(error.value, "unspecified");
        assert_eq!(
            validate_required(Diagnostics::Suppress, "capacity", &SizeInput::from(2.9)),
            Ok(2)
        );
    }
}
