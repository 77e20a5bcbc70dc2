//! Cyclical Encoding of Calendar Fields

use std::f64::consts::PI;

pub const DAY_OF_WEEK_PERIOD: f64 = 7.0;
pub const MONTH_PERIOD: f64 = 12.0;
pub const DAY_OF_MONTH_PERIOD: f64 = 30.0;
pub const WEEK_OF_YEAR_PERIOD: f64 = 52.0;

/// `(sin, cos)` of `value` on a circle of circumference `period`
pub fn encode(value: f64, period: f64) -> (f64, f64) {
    let angle = value * (2.0 * PI / period);
    (angle.sin(), angle.cos())
}
