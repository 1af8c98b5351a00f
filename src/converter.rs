//! Unit conversion
//!
//! Converts a drink's volume and strength into grams of pure alcohol using a
//! fixed ethanol density.

/// Density of ethanol in grams per millilitre
pub const ALCOHOL_DENSITY_G_PER_ML: f64 = 0.789;

/// Grams of pure alcohol in `volume_ml` of a drink at `percentage_abv`.
///
/// The result is rounded to one decimal place. Inputs are expected to be
/// range-checked already (`volume_ml >= 0`, `percentage_abv` in `[0, 100]`).
///
/// # Example
/// ```
/// use alcohol_ledger::converter::grams_of_alcohol;
/// assert_eq!(grams_of_alcohol(350.0, 5.0), 13.8);
/// ```
pub fn grams_of_alcohol(volume_ml: f64, percentage_abv: f64) -> f64 {
    round_to_tenth(volume_ml * (percentage_abv / 100.0) * ALCOHOL_DENSITY_G_PER_ML)
}

/// Round to one decimal place, halves away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
