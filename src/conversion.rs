//! Conversions between user-facing units and the lamp's raw fields.
//!
//! The lamp stores its white temperature as a "percent warm" value where 100 is
//! the warmest setting (3000K) and 0 the coolest (5000K).

/// Warmest supported color temperature
pub const KELVIN_MIN: u16 = 3000;

/// Coolest supported color temperature
pub const KELVIN_MAX: u16 = 5000;

/// Upper bound for every percentage field (brightness, warm percent, aux RGB)
pub const PERCENT_MAX: u8 = 100;

/// Linearly rescale `x` from `[in_min, in_max]` into `[out_min, out_max]`.
///
/// The arithmetic is done in floating point and the result truncated toward
/// zero, so `map_value(4501, 3000, 5000, 100, 0)` is 24, not 25. Results
/// beyond the `i32` range saturate.
pub fn map_value(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let scaled = (f64::from(x) - f64::from(in_min)) * (f64::from(out_max) - f64::from(out_min))
        / (f64::from(in_max) - f64::from(in_min));
    (scaled + f64::from(out_min)) as i32
}

/// Saturate `x` into `[lo, hi]`.
///
/// Unlike `Ord::clamp` this never panics; with `lo > hi` the lower bound wins.
pub fn clamp<T: PartialOrd>(x: T, lo: T, hi: T) -> T {
    let upper = if x > hi { hi } else { x };
    if upper < lo {
        lo
    } else {
        upper
    }
}

/// Convert a raw warm percentage (0 = coolest) to Kelvin
pub fn percent_warm_to_kelvin(percent: i32) -> u16 {
    let kelvin = map_value(
        percent,
        0,
        i32::from(PERCENT_MAX),
        i32::from(KELVIN_MAX),
        i32::from(KELVIN_MIN),
    );
    clamp(kelvin, i32::from(KELVIN_MIN), i32::from(KELVIN_MAX)) as u16
}

/// Convert Kelvin to a raw warm percentage (100 = warmest)
pub fn kelvin_to_percent_warm(kelvin: i32) -> u8 {
    let percent = map_value(
        kelvin,
        i32::from(KELVIN_MIN),
        i32::from(KELVIN_MAX),
        i32::from(PERCENT_MAX),
        0,
    );
    clamp(percent, 0, i32::from(PERCENT_MAX)) as u8
}

/// Clamp an arbitrary integer into a percentage
pub(crate) fn clamp_percent(value: i32) -> u8 {
    clamp(value, 0, i32::from(PERCENT_MAX)) as u8
}

/// Clamp an arbitrary integer into the supported Kelvin range
pub(crate) fn clamp_kelvin(value: i32) -> u16 {
    clamp(value, i32::from(KELVIN_MIN), i32::from(KELVIN_MAX)) as u16
}
