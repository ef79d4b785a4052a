//! Input checks shared by every node.
//!
//! All of these run before any upload or API call, so a failing check never
//! costs a network round trip.

use std::ops::RangeInclusive;

use crate::error::ValidationError;

/// Maximum length of any prompt field, in characters.
pub const MAX_PROMPT_CHARS: usize = 600;

pub const POLYCOUNT_RANGE: RangeInclusive<u32> = 100..=300_000;
pub const HEIGHT_METERS_RANGE: RangeInclusive<f64> = 0.1..=15.0;
pub const SEED_RANGE: RangeInclusive<u32> = 0..=2_147_483_647;
pub const ACTION_ID_RANGE: RangeInclusive<u32> = 0..=696;
pub const MULTI_IMAGE_COUNT: RangeInclusive<usize> = 2..=4;

/// Validate a prompt and normalize it to `Option`.
///
/// Only the empty string counts as "not provided": it yields `Ok(None)` when
/// optional and [`ValidationError::Required`] when required. A required
/// prompt must also contain something besides whitespace. The length limit
/// applies to the prompt with surrounding whitespace stripped; the value is
/// returned as given.
pub fn validate_prompt(
    field: &'static str,
    value: &str,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    if value.is_empty() {
        return if required {
            Err(ValidationError::Required { field })
        } else {
            Ok(None)
        };
    }
    let stripped = value.trim();
    if required && stripped.is_empty() {
        return Err(ValidationError::Required { field });
    }
    let len = stripped.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(ValidationError::TooLong {
            field,
            len,
            max: MAX_PROMPT_CHARS,
        });
    }
    Ok(Some(value.to_string()))
}

/// Reject values outside a closed interval. NaN is always rejected.
pub fn check_range<T>(
    field: &'static str,
    value: T,
    bounds: &RangeInclusive<T>,
) -> Result<T, ValidationError>
where
    T: PartialOrd + Copy + Into<f64>,
{
    if bounds.contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: (*bounds.start()).into(),
            max: (*bounds.end()).into(),
            value: value.into(),
        })
    }
}

/// Fail when both of two exclusive inputs are present.
pub fn exclusive(
    first: &'static str,
    first_set: bool,
    second: &'static str,
    second_set: bool,
) -> Result<(), ValidationError> {
    if first_set && second_set {
        Err(ValidationError::MutuallyExclusive { first, second })
    } else {
        Ok(())
    }
}

/// Check the number of images passed to a multi-image node.
pub fn check_image_count(count: usize) -> Result<usize, ValidationError> {
    if MULTI_IMAGE_COUNT.contains(&count) {
        Ok(count)
    } else {
        Err(ValidationError::OutOfRange {
            field: "images",
            min: *MULTI_IMAGE_COUNT.start() as f64,
            max: *MULTI_IMAGE_COUNT.end() as f64,
            value: count as f64,
        })
    }
}
