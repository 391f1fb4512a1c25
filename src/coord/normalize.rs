//! Cache key normalization
//!
//! Coordinates are bucketed by rounding each component to a fixed number of
//! decimal places. Nearby points deliberately share a key so repeated lookups
//! from roughly the same spot hit the cache.

use crate::constants::cache::KEY_PRECISION;

/// Round `n` half away from zero to `precision` decimal digits
///
/// Rounds on the scaled value rather than on a string rendering, so the
/// result only carries ordinary IEEE-754 error. Negative zero is folded
/// into positive zero.
pub fn round(n: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (n * factor).round() / factor + 0.0
}

/// Cache key for a coordinate pair at the default precision
pub fn key_for(lat: f64, lon: f64) -> String {
    key_for_with_precision(lat, lon, KEY_PRECISION)
}

/// Cache key for a coordinate pair at an explicit precision
///
/// Produces `"{lat}:{lon}"` using the shortest decimal form of each rounded
/// component. `f64`'s `Display` never switches to exponent notation, so the
/// output is stable across platforms and locales.
pub fn key_for_with_precision(lat: f64, lon: f64, precision: u32) -> String {
    format!("{}:{}", round(lat, precision), round(lon, precision))
}
