//! 航向
//!
//! 以度为单位、限制在 `[min, max]` 区间内的角度，默认区间 0–359。

use std::fmt;
use std::ops::RangeInclusive;

use crate::core::config::HeadingConfig;
use crate::core::math::{rotation_z_degrees, Matrix4};

/// 航向角
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    degrees: f32,
    min: f32,
    max: f32,
}

impl Heading {
    pub const DEFAULT_MIN: f32 = 0.0;
    pub const DEFAULT_MAX: f32 = 359.0;

    /// 区间两端颠倒时交换；任一端为 NaN 时使用默认区间
    pub fn new(min: f32, max: f32, initial: f32) -> Self {
        let (min, max) = if min.is_nan() || max.is_nan() {
            (Self::DEFAULT_MIN, Self::DEFAULT_MAX)
        } else if min > max {
            (max, min)
        } else {
            (min, max)
        };
        let mut heading = Self {
            degrees: min,
            min,
            max,
        };
        heading.set(initial);
        heading
    }

    pub fn from_config(config: &HeadingConfig) -> Self {
        Self::new(config.min, config.max, config.initial)
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    /// 设置角度，超出区间时截断；NaN 被忽略
    ///
    /// 返回值表示角度是否变化。
    pub fn set(&mut self, degrees: f32) -> bool {
        if degrees.is_nan() {
            return false;
        }
        let clamped = degrees.clamp(self.min, self.max);
        let changed = clamped != self.degrees;
        self.degrees = clamped;
        changed
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        self.min..=self.max
    }

    /// 绕 +Z 轴旋转当前角度的矩阵
    pub fn rotation(&self) -> Matrix4 {
        rotation_z_degrees(self.degrees)
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN, Self::DEFAULT_MAX, Self::DEFAULT_MIN)
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range() {
        let heading = Heading::default();
        assert_eq!(heading.degrees(), 0.0);
        assert_eq!(heading.range(), 0.0..=359.0);
    }

    #[test]
    fn test_set_clamps() {
        let mut heading = Heading::default();
        assert!(heading.set(400.0));
        assert_eq!(heading.degrees(), 359.0);
        assert!(heading.set(-10.0));
        assert_eq!(heading.degrees(), 0.0);
        assert!(!heading.set(-5.0));
    }

    #[test]
    fn test_nan_is_ignored() {
        let mut heading = Heading::new(0.0, 359.0, 45.0);
        assert!(!heading.set(f32::NAN));
        assert_eq!(heading.degrees(), 45.0);
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let heading = Heading::new(0.0, 359.0, 720.0);
        assert_eq!(heading.degrees(), 359.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Heading::new(0.0, 359.0, 90.0).to_string(), "90.0°");
        assert_eq!(Heading::new(0.0, 359.0, 12.34).to_string(), "12.3°");
    }

    #[test]
    fn test_rotation_over_full_range() {
        let mut heading = Heading::default();
        for tenth in (0..=3590).step_by(7) {
            let degrees = tenth as f32 / 10.0;
            heading.set(degrees);
            let radians = degrees.to_radians();
            let m = heading.rotation();

            assert!((m[(0, 0)] - radians.cos()).abs() < 1e-5);
            assert!((m[(1, 0)] - radians.sin()).abs() < 1e-5);
            assert!((m[(0, 1)] + radians.sin()).abs() < 1e-5);
            assert!((m[(3, 3)] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rotation_matches_angle() {
        let heading = Heading::new(0.0, 359.0, 180.0);
        let m = heading.rotation();
        assert!((m[(0, 0)] + 1.0).abs() < 1e-6);
        assert!((m[(1, 1)] + 1.0).abs() < 1e-6);
        assert!((m[(2, 2)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_range_is_normalised() {
        let heading = Heading::new(10.0, 0.0, 5.0);
        assert_eq!(heading.range(), 0.0..=10.0);
        assert_eq!(heading.degrees(), 5.0);

        let heading = Heading::new(f32::NAN, 90.0, 45.0);
        assert_eq!(heading.range(), 0.0..=359.0);
        assert_eq!(heading.degrees(), 45.0);
    }
}
