// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fixed-point integer helpers.
//!
//! Pure, allocation-free primitives shared by the pipeline stages.
//! Values follow the pipeline's working scale: signed 16-bit samples,
//! 32-bit accumulators, and an implicit power-of-two scaling factor
//! wherever a fractional quantity is involved.

/// Integer square root: `floor(sqrt(x))` for any `u32`.
///
/// Bit-by-bit construction from the most significant result bit down:
/// each candidate bit is kept only if the squared candidate does not
/// exceed the input. The result always fits 16 bits
/// (`isqrt(u32::MAX) == 65535`).
///
/// # Examples
/// ```
/// use spectrabar_dsp::fixed::isqrt;
///
/// assert_eq!(isqrt(0), 0);
/// assert_eq!(isqrt(1000), 31);
/// assert_eq!(isqrt(u32::MAX), 65535);
/// ```
pub fn isqrt(x: u32) -> u16 {
    let mut res: u16 = 0;
    let mut add: u16 = 0x8000;
    for _ in 0..16 {
        let candidate = res | add;
        let squared = u32::from(candidate) * u32::from(candidate);
        if x >= squared {
            res = candidate;
        }
        add >>= 1;
    }
    res
}

/// Squared magnitude of a complex bin: `re*re + im*im`.
///
/// The worst case (`re == im == i16::MIN`) is `2^31`, which still
/// fits the unsigned 32-bit result.
pub fn amplitude_squared(re: i16, im: i16) -> u32 {
    let r = i32::from(re) * i32::from(re);
    let i = i32::from(im) * i32::from(im);
    r as u32 + i as u32
}

/// Binary logarithm with 8 fractional bits: `round-ish(log2(x) * 256)`.
///
/// Integer part from the position of the most significant bit,
/// fractional part by repeated squaring of the normalized mantissa.
fn log2_q8(x: u32) -> u32 {
    debug_assert!(x > 0);
    let msb = 31 - x.leading_zeros();
    // Mantissa in [1.0, 2.0) as Q31.
    let mut m = u64::from(x) << (31 - msb);
    let mut frac = 0u32;
    for _ in 0..8 {
        m = (m * m) >> 31;
        frac <<= 1;
        if m >= 1 << 32 {
            frac |= 1;
            m >>= 1;
        }
    }
    (msb << 8) | frac
}

/// Fixed-point `20 * log10(x)`, rounded to the nearest whole decibel.
///
/// Defined as 0 for `x == 0` (the column smoother treats silence as
/// the floor rather than negative infinity). Maximum output is
/// `20 * log10(2^32) ≈ 192`, so the result always fits 16 bits.
///
/// # Examples
/// ```
/// use spectrabar_dsp::fixed::db_from_magnitude;
///
/// assert_eq!(db_from_magnitude(0), 0);
/// assert_eq!(db_from_magnitude(1), 0);
/// assert_eq!(db_from_magnitude(100), 40);
/// ```
pub fn db_from_magnitude(x: u32) -> u16 {
    if x == 0 {
        return 0;
    }
    // db = log2(x) * 20*log10(2); 6.0206 / 256 ≈ 24660 / 2^20.
    (((u64::from(log2_q8(x)) * 24_660) + (1 << 19)) >> 20) as u16
}
