//! Integer helpers behind the parameter generator.
//!
//! Seeds are handled with 32-bit wrapping semantics so the same seed basis
//! produces the same streams as the browser build of the visualization.

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_31: f64 = 2_147_483_648.0;

/// Truncates to a signed 32-bit integer, wrapping modulo 2^32.
///
/// Non-finite inputs map to 0.
pub fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(TWO_POW_32);
    if wrapped >= TWO_POW_31 {
        (wrapped - TWO_POW_32) as i32
    } else {
        wrapped as i32
    }
}

/// One xorshift32 round.
pub fn xorshift32(seed: i32) -> u32 {
    let mut s = seed as u32;
    s ^= s << 13;
    s ^= s >> 17;
    s ^= s << 5;
    s
}

/// Maps a seed to [0, 1).
pub fn unit_random(seed: i32) -> f64 {
    (xorshift32(seed) as f64 / 4_294_967_295.0) % 1.0
}

/// Maps a seed to `[min, max)`.
pub fn remap(seed: i32, min: f64, max: f64) -> f64 {
    min + (max - min) * unit_random(seed)
}
