// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between the fixed-size display surface and source image
//! pixels. The image is scaled uniformly and centered on the surface, so
//! the mapping is a scale plus an offset on each axis.

use crate::error::{MaskError, MaskResult};
use crate::models::region::ImagePoint;
use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How the image is fitted into the display surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalePolicy {
    /// Scale to fill the surface along the limiting axis, up or down.
    #[default]
    Fit,
    /// Like `Fit`, but never enlarge images smaller than the surface.
    NoUpscale,
}

/// Scale and letterbox offsets for one (display, image) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    scaled_width: f64,
    scaled_height: f64,
}

impl Projection {
    /// Compute the projection of `image` onto `display`.
    ///
    /// Fails with [`MaskError::InvalidDimensions`] when either size has a
    /// zero side.
    pub fn new(display: Size, image: Size, policy: ScalePolicy) -> MaskResult<Self> {
        if image.is_empty() {
            return Err(MaskError::InvalidDimensions {
                width: image.width,
                height: image.height,
            });
        }
        if display.is_empty() {
            return Err(MaskError::InvalidDimensions {
                width: display.width,
                height: display.height,
            });
        }

        let scale_x = display.width as f64 / image.width as f64;
        let scale_y = display.height as f64 / image.height as f64;
        let mut scale = scale_x.min(scale_y);
        if policy == ScalePolicy::NoUpscale {
            scale = scale.min(1.0);
        }

        let scaled_width = image.width as f64 * scale;
        let scaled_height = image.height as f64 * scale;

        Ok(Self {
            scale,
            offset_x: (display.width as f64 - scaled_width) / 2.0,
            offset_y: (display.height as f64 - scaled_height) / 2.0,
            scaled_width,
            scaled_height,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn scaled_size(&self) -> (f64, f64) {
        (self.scaled_width, self.scaled_height)
    }

    /// Whether a display-space position lies on the image (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.offset_x
            && x <= self.offset_x + self.scaled_width
            && y >= self.offset_y
            && y <= self.offset_y + self.scaled_height
    }

    /// Map an image-space position to display space.
    pub fn to_display(&self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    /// Map a display-space position to the nearest image pixel.
    ///
    /// Returns `None` for positions in the letterbox margin.
    pub fn to_image(&self, x: f64, y: f64) -> Option<ImagePoint> {
        if !self.contains(x, y) {
            return None;
        }
        let image_x = ((x - self.offset_x) / self.scale).round() as i32;
        let image_y = ((y - self.offset_y) / self.scale).round() as i32;
        Some(ImagePoint::new(image_x, image_y))
    }
}

/// Correct a pointer position for a surface drawn at a different size than
/// its internal resolution.
///
/// `raw_x`/`raw_y` are relative to the surface's on-screen top-left corner.
pub fn normalize_pointer(
    raw_x: f64,
    raw_y: f64,
    internal: Size,
    rendered_width: f64,
    rendered_height: f64,
) -> (f64, f64) {
    if rendered_width <= 0.0 || rendered_height <= 0.0 {
        return (raw_x, raw_y);
    }
    (
        raw_x * internal.width as f64 / rendered_width,
        raw_y * internal.height as f64 / rendered_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISPLAY: Size = Size { width: 800, height: 600 };

    #[test]
    fn test_identity_projection() {
        let proj = Projection::new(DISPLAY, Size::new(800, 600), ScalePolicy::Fit).unwrap();
        assert_eq!(proj.scale(), 1.0);
        assert_eq!(proj.offset(), (0.0, 0.0));
        assert_eq!(proj.to_image(100.0, 50.0), Some(ImagePoint::new(100, 50)));
    }

    #[test]
    fn test_downscaled_projection() {
        let proj = Projection::new(DISPLAY, Size::new(1600, 1200), ScalePolicy::Fit).unwrap();
        assert_eq!(proj.scale(), 0.5);
        assert_eq!(proj.offset(), (0.0, 0.0));
        assert_eq!(proj.to_image(400.0, 300.0), Some(ImagePoint::new(800, 600)));
    }

    #[test]
    fn test_pillarbox_offsets() {
        // Tall image: height is the limiting axis.
        let proj = Projection::new(DISPLAY, Size::new(600, 1200), ScalePolicy::Fit).unwrap();
        assert_eq!(proj.scale(), 0.5);
        assert_eq!(proj.scaled_size(), (300.0, 600.0));
        assert_eq!(proj.offset(), (250.0, 0.0));
        assert_eq!(proj.to_image(250.0, 0.0), Some(ImagePoint::new(0, 0)));
    }

    #[test]
    fn test_letterbox_margin_rejected() {
        let proj = Projection::new(DISPLAY, Size::new(1600, 600), ScalePolicy::Fit).unwrap();
        let (_, offset_y) = proj.offset();
        assert_eq!(offset_y, 150.0);
        assert_eq!(proj.to_image(400.0, 100.0), None);
        assert_eq!(proj.to_image(400.0, 460.0), None);
        assert!(proj.to_image(400.0, 150.0).is_some());
        assert!(proj.to_image(400.0, 450.0).is_some());
    }

    #[test]
    fn test_scale_is_min_and_fits() {
        let images = [
            (1, 1),
            (3, 7),
            (800, 600),
            (1024, 768),
            (4000, 300),
            (250, 5000),
            (1920, 1080),
            (333, 777),
        ];
        for &(w, h) in &images {
            let proj = Projection::new(DISPLAY, Size::new(w, h), ScalePolicy::Fit).unwrap();
            let expected = (800.0 / w as f64).min(600.0 / h as f64);
            assert_eq!(proj.scale(), expected);
            let (sw, sh) = proj.scaled_size();
            assert!(sw <= 800.0 + 1e-9, "{}x{} width {}", w, h, sw);
            assert!(sh <= 600.0 + 1e-9, "{}x{} height {}", w, h, sh);
        }
    }

    #[test]
    fn test_no_upscale_policy() {
        let proj = Projection::new(DISPLAY, Size::new(400, 300), ScalePolicy::NoUpscale).unwrap();
        assert_eq!(proj.scale(), 1.0);
        assert_eq!(proj.offset(), (200.0, 150.0));

        let fit = Projection::new(DISPLAY, Size::new(400, 300), ScalePolicy::Fit).unwrap();
        assert_eq!(fit.scale(), 2.0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Projection::new(DISPLAY, Size::new(0, 600), ScalePolicy::Fit),
            Err(MaskError::InvalidDimensions { width: 0, height: 600 })
        ));
        assert!(Projection::new(Size::new(800, 0), Size::new(10, 10), ScalePolicy::Fit).is_err());
    }

    #[test]
    fn test_display_image_display_roundtrip() {
        let images = [(1600, 1200), (333, 777), (4000, 300), (123, 45)];
        for &(w, h) in &images {
            let proj = Projection::new(DISPLAY, Size::new(w, h), ScalePolicy::Fit).unwrap();
            let (ox, oy) = proj.offset();
            let (sw, sh) = proj.scaled_size();
            for step in 0..=10 {
                let t = step as f64 / 10.0;
                let x = ox + sw * t;
                let y = oy + sh * t;
                let point = proj.to_image(x, y).unwrap();
                let (back_x, back_y) = proj.to_display(point.x as f64, point.y as f64);
                // Rounding to a whole image pixel moves at most half a pixel,
                // which is at most `scale / 2` on the display.
                let tolerance = (proj.scale() / 2.0).max(1.0);
                assert!((back_x - x).abs() <= tolerance, "{}x{} x={} back={}", w, h, x, back_x);
                assert!((back_y - y).abs() <= tolerance, "{}x{} y={} back={}", w, h, y, back_y);
            }
        }
    }

    #[test]
    fn test_normalize_pointer_css_scaling() {
        // Surface rendered at half its internal size.
        let (x, y) = normalize_pointer(200.0, 150.0, DISPLAY, 400.0, 300.0);
        assert!((x - 400.0).abs() < 0.0001);
        assert!((y - 300.0).abs() < 0.0001);

        let (x, y) = normalize_pointer(10.0, 20.0, DISPLAY, 800.0, 600.0);
        assert_eq!((x, y), (10.0, 20.0));
    }
}
