// src/scale.rs

//! Mapping between standard units and device pixels.
//!
//! Callers draw on a fixed "standard" canvas (for example 400x300 units). The
//! window has its own pixel size (for example 800x600). As long as both share
//! the same width-height ratio, one scalar `ratio = device_width / standard_width`
//! converts lengths in either direction, so the window size can change between
//! runs without touching any drawing code.
//!
//! Conversions round to the nearest integer with ties going to the even
//! neighbour (`2.5 -> 2`, `3.5 -> 4`). Pixel output depends on this, so it is
//! fixed here rather than left to whatever `as` casts do.

use crate::backends::{PixelPoint, PixelRect};
use crate::error::ConfigurationError;

/// An integer point in standard units, as reported by the pointer channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StandardPoint {
    pub x: i32,
    pub y: i32,
}

impl StandardPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Immutable converter between standard units and device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    device_width: u32,
    device_height: u32,
    standard_width: u32,
    standard_height: u32,
    /// Pixels per standard unit.
    ratio: f64,
}

impl ScaleTransform {
    /// Builds the transform, rejecting any pair of sizes whose aspect ratios differ.
    ///
    /// The ratio check is exact: `device_width * standard_height` must equal
    /// `device_height * standard_width`.
    pub fn new(
        device_width: u32,
        device_height: u32,
        standard_width: u32,
        standard_height: u32,
    ) -> Result<Self, ConfigurationError> {
        for (value, what) in [
            (device_width, "window width"),
            (device_height, "window height"),
            (standard_width, "standard width"),
            (standard_height, "standard height"),
        ] {
            if value == 0 {
                return Err(ConfigurationError::ZeroDimension { what });
            }
        }

        // Widened so the cross products can't overflow.
        let device_cross = u64::from(device_width) * u64::from(standard_height);
        let standard_cross = u64::from(device_height) * u64::from(standard_width);
        if device_cross != standard_cross {
            return Err(ConfigurationError::AspectRatioMismatch {
                device_width,
                device_height,
                standard_width,
                standard_height,
            });
        }

        Ok(Self {
            device_width,
            device_height,
            standard_width,
            standard_height,
            ratio: f64::from(device_width) / f64::from(standard_width),
        })
    }

    /// Pixels per standard unit.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// `(width, height)` of the window in pixels.
    pub fn device_size(&self) -> (u32, u32) {
        (self.device_width, self.device_height)
    }

    /// `(width, height)` of the canvas in standard units.
    pub fn standard_size(&self) -> (u32, u32) {
        (self.standard_width, self.standard_height)
    }

    /// Scales a standard-unit length or coordinate to pixels.
    pub fn to_device(&self, k: f64) -> i32 {
        round_half_even(k * self.ratio)
    }

    /// Scales a pixel length or coordinate back to standard units.
    pub fn to_standard(&self, k: i32) -> i32 {
        round_half_even(f64::from(k) / self.ratio)
    }

    /// Scales a standard-unit length that must not be negative, such as a font
    /// size or a line width.
    pub fn to_device_extent(&self, k: f64) -> u32 {
        self.to_device(k).max(0) as u32
    }

    pub fn to_device_point(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(self.to_device(x), self.to_device(y))
    }

    /// Scales each of the four rectangle values on its own, the same way the
    /// individual coordinates would be scaled.
    pub fn to_device_rect(&self, x: f64, y: f64, width: f64, height: f64) -> PixelRect {
        PixelRect::new(
            self.to_device(x),
            self.to_device(y),
            self.to_device(width),
            self.to_device(height),
        )
    }

    pub fn to_standard_point(&self, point: PixelPoint) -> StandardPoint {
        StandardPoint::new(self.to_standard(point.x), self.to_standard(point.y))
    }
}

/// Rounds to the nearest integer, ties to even. Out-of-range values saturate.
fn round_half_even(value: f64) -> i32 {
    value.round_ties_even() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn matching_ratios_construct_with_width_ratio() {
        let cases = [
            (800, 600, 400, 300, 2.0),
            (400, 300, 800, 600, 0.5),
            (1920, 1080, 160, 90, 12.0),
            (1000, 1000, 3, 3, 1000.0 / 3.0),
            (640, 480, 640, 480, 1.0),
        ];
        for (dw, dh, sw, sh, expected) in cases {
            let scale = ScaleTransform::new(dw, dh, sw, sh)
                .unwrap_or_else(|e| panic!("{}x{} / {}x{} rejected: {}", dw, dh, sw, sh, e));
            assert_eq!(scale.ratio(), expected);
            assert_eq!(scale.device_size(), (dw, dh));
            assert_eq!(scale.standard_size(), (sw, sh));
        }
    }

    #[test]
    fn mismatched_ratios_are_a_configuration_error() {
        let err = ScaleTransform::new(800, 600, 400, 200).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::AspectRatioMismatch {
                device_width: 800,
                device_height: 600,
                standard_width: 400,
                standard_height: 200,
            }
        );
        assert!(ScaleTransform::new(801, 600, 400, 300).is_err());
        assert!(ScaleTransform::new(1920, 1080, 4, 3).is_err());
    }

    #[test]
    fn ratio_check_is_exact_for_nearly_equal_ratios() {
        // 1000/999 and 1001/1000 differ only far past the third decimal place.
        assert!(ScaleTransform::new(1000, 999, 1001, 1000).is_err());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert_eq!(
            ScaleTransform::new(0, 600, 400, 300).unwrap_err(),
            ConfigurationError::ZeroDimension {
                what: "window width"
            }
        );
        assert_eq!(
            ScaleTransform::new(800, 600, 400, 0).unwrap_err(),
            ConfigurationError::ZeroDimension {
                what: "standard height"
            }
        );
    }

    #[test]
    fn ties_round_half_to_even() {
        let unit = ScaleTransform::new(100, 100, 100, 100).unwrap();
        assert_eq!(unit.to_device(2.5), 2);
        assert_eq!(unit.to_device(3.5), 4);
        assert_eq!(unit.to_device(-2.5), -2);
        assert_eq!(unit.to_device(2.4), 2);
        assert_eq!(unit.to_device(2.6), 3);

        let half = ScaleTransform::new(400, 300, 800, 600).unwrap();
        assert_eq!(half.to_device(1.0), 0);
        assert_eq!(half.to_device(3.0), 2);
        assert_eq!(half.to_device(5.0), 2);

        let double = ScaleTransform::new(800, 600, 400, 300).unwrap();
        assert_eq!(double.to_standard(101), 50);
        assert_eq!(double.to_standard(51), 26);
    }

    #[test]
    fn round_trip_is_exact_for_integer_ratios() {
        let scale = ScaleTransform::new(1200, 900, 400, 300).unwrap();
        for k in -500..=500 {
            assert_eq!(scale.to_standard(scale.to_device(f64::from(k))), k);
        }
    }

    #[test]
    fn round_trip_stays_within_one_unit() {
        for (dw, dh, sw, sh) in [(400, 300, 800, 600), (1000, 1000, 3, 3), (500, 300, 300, 180)] {
            let scale = ScaleTransform::new(dw, dh, sw, sh).unwrap();
            for k in -1000..=1000 {
                let back = scale.to_standard(scale.to_device(f64::from(k)));
                assert!(
                    (back - k).abs() <= 1,
                    "k={} came back as {} at ratio {}",
                    k,
                    back,
                    scale.ratio()
                );
            }
        }
    }

    #[test]
    fn rect_scales_every_component() {
        let scale = ScaleTransform::new(800, 600, 400, 300).unwrap();
        assert_eq!(
            scale.to_device_rect(10.0, 10.0, 50.0, 20.0),
            PixelRect::new(20, 20, 100, 40)
        );
        assert_eq!(scale.to_device_point(1.25, 7.0), PixelPoint::new(2, 14));
        assert_eq!(
            scale.to_standard_point(PixelPoint::new(101, 51)),
            StandardPoint::new(50, 26)
        );
    }

    #[test]
    fn negative_extents_clamp_to_zero() {
        let scale = ScaleTransform::new(800, 600, 400, 300).unwrap();
        assert_eq!(scale.to_device_extent(-3.0), 0);
        assert_eq!(scale.to_device_extent(12.0), 24);
    }
}
