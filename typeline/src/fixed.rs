// Copyright 2025 the Typeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 26.6 fixed-point arithmetic helpers.
//!
//! Glyph advances and offsets are carried in the font engine's native 26.6
//! format (64 units per pixel) and only converted to integer pixels at the
//! point where rectangles are produced.

/// A 26.6 fixed-point value: 26 integer bits, 6 fractional bits.
pub type F26Dot6 = i32;

/// One pixel in 26.6 units.
pub(crate) const ONE: F26Dot6 = 64;

/// Converts whole pixels to 26.6 units.
#[inline]
pub(crate) fn from_pixels(px: i32) -> F26Dot6 {
    px << 6
}

/// Rounds a 26.6 value to the nearest whole pixel.
#[inline]
pub(crate) fn round_to_pixels(v: F26Dot6) -> i32 {
    (v + 32) >> 6
}

/// Truncates a 26.6 value towards negative infinity.
#[inline]
pub(crate) fn floor_to_pixels(v: F26Dot6) -> i32 {
    v >> 6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_whole_pixels() {
        for px in [-3, 0, 1, 127] {
            assert_eq!(round_to_pixels(from_pixels(px)), px);
            assert_eq!(floor_to_pixels(from_pixels(px)), px);
        }
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to_pixels(ONE + 31), 1);
        assert_eq!(round_to_pixels(ONE + 32), 2);
        assert_eq!(floor_to_pixels(ONE + 63), 1);
    }
}
