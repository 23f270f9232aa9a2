// 📐 Record Validator - pure checks over the four raw form fields
// Rules run in order and stop at the first failure. No I/O.

use crate::car::{CarInput, NewCar};
use crate::error::Rejection;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2026;

/// Validate raw form text into a `NewCar`.
///
/// 1. every field must be non-empty after trimming
/// 2. brand may only hold letters and spaces
/// 3. year must parse as an integer and price as a finite float
/// 4. year must lie in `MIN_YEAR..=MAX_YEAR`
pub fn validate(input: &CarInput) -> Result<NewCar, Rejection> {
    let brand = input.brand.trim();
    let model = input.model.trim();
    let year_text = input.year.trim();
    let price_text = input.price.trim();

    if brand.is_empty() || model.is_empty() || year_text.is_empty() || price_text.is_empty() {
        return Err(Rejection::MissingField);
    }

    // Letter numbers such as Roman numerals are alphabetic but not letters
    if !brand.chars().all(|c| c == ' ' || (c.is_alphabetic() && !c.is_numeric())) {
        return Err(Rejection::InvalidBrand);
    }

    let year: i32 = year_text.parse().map_err(|_| Rejection::NotANumber)?;
    let price: f64 = price_text.parse().map_err(|_| Rejection::NotANumber)?;

    // NaN and infinities parse but cannot be stored as REAL
    if !price.is_finite() {
        return Err(Rejection::NotANumber);
    }

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Rejection::YearOutOfRange);
    }

    Ok(NewCar {
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        price,
    })
}
