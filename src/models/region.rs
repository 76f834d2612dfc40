// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Masking region data structures.
//!
//! Regions are stored in source-image pixel space so they can be sent to
//! the backend unchanged, regardless of how the image was displayed.

use serde::{Deserialize, Serialize};

/// A point in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: i32,
    pub y: i32,
}

impl ImagePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned masking rectangle with `x1 <= x2` and `y1 <= y2`.
///
/// The ordering is established when the rectangle is built and cannot be
/// broken afterwards: fields are private and there are no setters.
/// Deserialized records are normalized the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegionRecord")]
pub struct Rectangle {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

/// Wire form of a rectangle, possibly with unordered corners.
#[derive(Deserialize)]
struct RegionRecord {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

impl From<RegionRecord> for Rectangle {
    fn from(r: RegionRecord) -> Self {
        Rectangle::from_corners(ImagePoint::new(r.x1, r.y1), ImagePoint::new(r.x2, r.y2))
    }
}

impl Rectangle {
    /// Build a rectangle from two clicked corners in any order.
    pub fn from_corners(a: ImagePoint, b: ImagePoint) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) → ({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_reversed_click_order() {
        let rect = Rectangle::from_corners(ImagePoint::new(10, 10), ImagePoint::new(5, 5));
        assert_eq!((rect.x1(), rect.y1(), rect.x2(), rect.y2()), (5, 5, 10, 10));
    }

    #[test]
    fn test_from_corners_mixed_diagonal() {
        let rect = Rectangle::from_corners(ImagePoint::new(40, 3), ImagePoint::new(7, 90));
        assert_eq!((rect.x1(), rect.y1()), (7, 3));
        assert_eq!((rect.x2(), rect.y2()), (40, 90));
        assert_eq!(rect.width(), 33);
        assert_eq!(rect.height(), 87);
    }

    #[test]
    fn test_corner_orderings_always_normalized() {
        let corners = [(0, 0), (12, 0), (0, 12), (12, 12), (6, 3)];
        for &(ax, ay) in &corners {
            for &(bx, by) in &corners {
                let rect = Rectangle::from_corners(ImagePoint::new(ax, ay), ImagePoint::new(bx, by));
                assert!(rect.x1() <= rect.x2());
                assert!(rect.y1() <= rect.y2());
            }
        }
    }

    #[test]
    fn test_deserialize_normalizes_corners() {
        let rect: Rectangle =
            serde_json::from_str(r#"{"x1": 250, "y1": 1330, "x2": 92, "y2": 882}"#).unwrap();
        assert_eq!(rect, Rectangle::from_corners(ImagePoint::new(92, 882), ImagePoint::new(250, 1330)));
    }

    #[test]
    fn test_serialize_field_names() {
        let rect = Rectangle::from_corners(ImagePoint::new(1, 2), ImagePoint::new(3, 4));
        let json = serde_json::to_value(rect).unwrap();
        assert_eq!(json, serde_json::json!({"x1": 1, "y1": 2, "x2": 3, "y2": 4}));
    }
}
