use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64, rounding to nearest and saturating at the
/// representable range. Use only at the API boundary, never in the sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and accessors.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// One Q32.32 step, as an f64 scale factor.
const FRAC_SCALE: f64 = 4_294_967_296.0;

/// Slack, in Q32.32 steps, under which an f64 is treated as sitting on a
/// grid point rather than just above it.
const GRID_SNAP: f64 = 1.0 / 1024.0;

/// Convert a non-negative f64 to Fixed64, rounding up to the next grid point.
///
/// Values within [`GRID_SNAP`] of a grid point land on it, so f64 noise
/// such as `1.0 + f64::EPSILON` does not bump a whole value up a step.
/// Negative and NaN inputs yield zero; large inputs saturate.
#[inline]
pub fn f64_to_fixed64_ceil(v: f64) -> Fixed64 {
    if v.is_nan() || v <= 0.0 {
        return Fixed64::ZERO;
    }
    // `as` saturates at i64::MAX.
    Fixed64::from_bits((v * FRAC_SCALE - GRID_SNAP).ceil() as i64)
}

/// Progress made in one update: `per_second / tick_rate * elapsed`.
///
/// Computed in f64 and rounded up onto the Q32.32 grid once. Summing the
/// steps never falls short of the exact total, so `n` updates complete
/// exactly the units that `n * rate` covers, and `rate * (1 / rate)` lands
/// on one whole unit.
#[inline]
pub fn progress_for(per_second: f64, tick_rate: f64, elapsed: f64) -> Fixed64 {
    f64_to_fixed64_ceil(per_second / tick_rate * elapsed)
}
