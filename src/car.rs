// 🚗 Car records - the single entity this tool manages
// Raw form input, validated tuple, and stored row

use serde::{Deserialize, Serialize};

// ============================================================================
// STORED ROW
// ============================================================================

/// A row of the `cars` table. `id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
}

// ============================================================================
// RAW INPUT
// ============================================================================

/// The four form fields exactly as the operator typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CarInput {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub price: String,
}

impl CarInput {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        year: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            year: year.into(),
            price: price.into(),
        }
    }

    /// Empty all four fields (done after a successful add).
    pub fn clear(&mut self) {
        self.brand.clear();
        self.model.clear();
        self.year.clear();
        self.price.clear();
    }
}

// ============================================================================
// VALIDATED TUPLE
// ============================================================================

/// A car that passed every validator rule but has no id yet.
/// Only `validator::validate` builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub(crate) brand: String,
    pub(crate) model: String,
    pub(crate) year: i32,
    pub(crate) price: f64,
}

impl NewCar {
    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Attach the id the store assigned.
    pub fn into_car(self, id: i64) -> Car {
        Car {
            id,
            brand: self.brand,
            model: self.model,
            year: self.year,
            price: self.price,
        }
    }
}
