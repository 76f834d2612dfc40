// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Two-click rectangle selection over a projected image.
//!
//! A [`RegionSelector`] is bound to one image. It owns the projection from
//! the display surface to image pixels, the list of finished regions and at
//! most one pending corner. Every change to the region list is reported to
//! the registered observer with the complete list.

use super::region::{ImagePoint, Rectangle};
use crate::error::MaskError;
use crate::util::geometry::{Projection, ScalePolicy, Size};

/// Receives the full region list after every add, undo or clear.
pub trait RegionObserver {
    fn regions_changed(&mut self, regions: &[Rectangle]);
}

impl<F> RegionObserver for F
where
    F: FnMut(&[Rectangle]),
{
    fn regions_changed(&mut self, regions: &[Rectangle]) {
        self(regions)
    }
}

/// Corner recorded while waiting for the second click.
///
/// A second corner never persists: it is turned into a rectangle as soon as
/// it arrives, so only zero or one point can be held here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSelection {
    first: Option<ImagePoint>,
}

impl PendingSelection {
    pub fn len(&self) -> usize {
        usize::from(self.first.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn points(&self) -> impl Iterator<Item = ImagePoint> {
        self.first.into_iter()
    }

    /// Add a corner; returns the rectangle if this was the second one.
    fn push(&mut self, point: ImagePoint) -> Option<Rectangle> {
        match self.first.take() {
            None => {
                self.first = Some(point);
                None
            }
            Some(first) => Some(Rectangle::from_corners(first, point)),
        }
    }

    fn clear(&mut self) {
        self.first = None;
    }
}

/// Whether the bound image can accept clicks.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready(Projection),
    Failed(String),
}

/// Why a click did not record a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The image has not loaded (or failed to).
    NotReady,
    /// The click landed in the letterbox margin.
    OutsideImage,
}

/// Result of feeding one click into the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Rejected(Rejection),
    /// First corner recorded.
    PointAdded(ImagePoint),
    /// Second corner recorded and a region appended.
    RegionCompleted(Rectangle),
}

/// Selection state for a single image.
pub struct RegionSelector {
    image_id: String,
    image_size: Size,
    display: Size,
    policy: ScalePolicy,
    state: LoadState,
    regions: Vec<Rectangle>,
    pending: PendingSelection,
    observer: Option<Box<dyn RegionObserver>>,
}

impl std::fmt::Debug for RegionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionSelector")
            .field("image_id", &self.image_id)
            .field("image_size", &self.image_size)
            .field("display", &self.display)
            .field("state", &self.state)
            .field("regions", &self.regions)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl RegionSelector {
    /// Create a selector for an image whose pixels are still loading.
    ///
    /// `initial` restores regions drawn earlier for the same image.
    pub fn new(
        image_id: impl Into<String>,
        image_size: Size,
        display: Size,
        policy: ScalePolicy,
        initial: Vec<Rectangle>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            image_size,
            display,
            policy,
            state: LoadState::Loading,
            regions: initial,
            pending: PendingSelection::default(),
            observer: None,
        }
    }

    /// Register the observer notified on region list changes.
    pub fn subscribe(&mut self, observer: impl RegionObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn display(&self) -> Size {
        self.display
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn regions(&self) -> &[Rectangle] {
        &self.regions
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    /// Projection of the loaded image, if ready.
    pub fn projection(&self) -> Option<&Projection> {
        match &self.state {
            LoadState::Ready(projection) => Some(projection),
            _ => None,
        }
    }

    /// The image pixels arrived with the given natural size.
    ///
    /// The projection uses the dimensions reported at upload time; a
    /// mismatch with the decoded size is logged. Zero-sized images move the
    /// selector into the failed state instead.
    pub fn image_loaded(&mut self, natural: Size) -> Result<(), MaskError> {
        if natural != self.image_size {
            log::warn!(
                "Decoded size {}x{} of {} differs from reported {}x{}",
                natural.width,
                natural.height,
                self.image_id,
                self.image_size.width,
                self.image_size.height
            );
        }

        match Projection::new(self.display, self.image_size, self.policy) {
            Ok(projection) => {
                log::debug!(
                    "Projection for {}: scale {:.4}, offset ({:.1}, {:.1})",
                    self.image_id,
                    projection.scale(),
                    projection.offset().0,
                    projection.offset().1
                );
                self.state = LoadState::Ready(projection);
                Ok(())
            }
            Err(err) => {
                self.state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// The image could not be fetched or decoded.
    pub fn image_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Image {} failed to load: {}", self.image_id, reason);
        self.pending.clear();
        self.state = LoadState::Failed(reason);
    }

    /// Handle a click given in display-surface coordinates.
    pub fn click(&mut self, display_x: f64, display_y: f64) -> ClickOutcome {
        let Some(projection) = self.projection() else {
            log::debug!("Click ignored, image {} not ready", self.image_id);
            return ClickOutcome::Rejected(Rejection::NotReady);
        };

        let Some(point) = projection.to_image(display_x, display_y) else {
            log::debug!("Click outside image area at ({:.1}, {:.1})", display_x, display_y);
            return ClickOutcome::Rejected(Rejection::OutsideImage);
        };

        match self.pending.push(point) {
            None => {
                log::debug!("First corner at ({}, {})", point.x, point.y);
                ClickOutcome::PointAdded(point)
            }
            Some(rect) => {
                self.regions.push(rect);
                log::info!("Added region {}, total: {}", rect, self.regions.len());
                self.notify();
                ClickOutcome::RegionCompleted(rect)
            }
        }
    }

    /// Click given relative to a surface drawn at `rendered` size on screen.
    pub fn click_rendered(
        &mut self,
        raw_x: f64,
        raw_y: f64,
        rendered_width: f64,
        rendered_height: f64,
    ) -> ClickOutcome {
        let (x, y) = crate::util::geometry::normalize_pointer(
            raw_x,
            raw_y,
            self.display,
            rendered_width,
            rendered_height,
        );
        self.click(x, y)
    }

    /// Drop the pending corner, keeping finished regions.
    pub fn cancel_selection(&mut self) {
        self.pending.clear();
    }

    /// Remove the most recent region. Returns it, or `None` if there was none.
    pub fn undo_last(&mut self) -> Option<Rectangle> {
        let removed = self.regions.pop();
        if let Some(rect) = removed {
            log::info!("Removed region {}, total: {}", rect, self.regions.len());
        }
        self.notify();
        removed
    }

    /// Remove all regions and the pending corner.
    pub fn clear_all(&mut self) {
        self.regions.clear();
        self.pending.clear();
        log::info!("Cleared all regions of {}", self.image_id);
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.regions_changed(&self.regions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DISPLAY: Size = Size { width: 800, height: 600 };

    fn ready_selector(width: u32, height: u32) -> RegionSelector {
        let size = Size::new(width, height);
        let mut selector = RegionSelector::new("scan.png", size, DISPLAY, ScalePolicy::Fit, Vec::new());
        selector.image_loaded(size).unwrap();
        selector
    }

    fn recorded(selector: &mut RegionSelector) -> Rc<RefCell<Vec<Vec<Rectangle>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        selector.subscribe(move |regions: &[Rectangle]| sink.borrow_mut().push(regions.to_vec()));
        log
    }

    fn rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Rectangle {
        Rectangle::from_corners(ImagePoint::new(x1, y1), ImagePoint::new(x2, y2))
    }

    #[test]
    fn test_click_before_load_ignored() {
        let mut selector =
            RegionSelector::new("scan.png", Size::new(800, 600), DISPLAY, ScalePolicy::Fit, Vec::new());
        assert_eq!(selector.click(10.0, 10.0), ClickOutcome::Rejected(Rejection::NotReady));
        assert!(selector.pending().is_empty());
    }

    #[test]
    fn test_two_clicks_make_rectangle() {
        let mut selector = ready_selector(800, 600);
        let log = recorded(&mut selector);

        assert_eq!(selector.click(10.0, 10.0), ClickOutcome::PointAdded(ImagePoint::new(10, 10)));
        assert_eq!(selector.pending().len(), 1);
        assert!(log.borrow().is_empty());

        let outcome = selector.click(5.0, 5.0);
        assert_eq!(outcome, ClickOutcome::RegionCompleted(rect(5, 5, 10, 10)));
        assert!(selector.pending().is_empty());
        assert_eq!(selector.regions(), &[rect(5, 5, 10, 10)]);
        assert_eq!(*log.borrow(), vec![vec![rect(5, 5, 10, 10)]]);
    }

    #[test]
    fn test_clicks_map_through_scale() {
        let mut selector = ready_selector(1600, 1200);
        assert_eq!(selector.click(400.0, 300.0), ClickOutcome::PointAdded(ImagePoint::new(800, 600)));
    }

    #[test]
    fn test_click_in_margin_keeps_pending_count() {
        // 1600x600 is letterboxed with 150px bands top and bottom.
        let mut selector = ready_selector(1600, 600);
        assert_eq!(selector.click(100.0, 20.0), ClickOutcome::Rejected(Rejection::OutsideImage));
        assert_eq!(selector.pending().len(), 0);

        selector.click(100.0, 200.0);
        assert_eq!(selector.click(100.0, 590.0), ClickOutcome::Rejected(Rejection::OutsideImage));
        assert_eq!(selector.pending().len(), 1);
        assert!(selector.regions().is_empty());
    }

    #[test]
    fn test_rendered_click_normalized() {
        let mut selector = ready_selector(800, 600);
        // Surface shown at 400x300 on screen.
        let outcome = selector.click_rendered(50.0, 25.0, 400.0, 300.0);
        assert_eq!(outcome, ClickOutcome::PointAdded(ImagePoint::new(100, 50)));
    }

    #[test]
    fn test_cancel_selection_keeps_regions() {
        let mut selector = ready_selector(800, 600);
        selector.click(1.0, 1.0);
        selector.click(20.0, 20.0);
        selector.click(30.0, 30.0);
        let log = recorded(&mut selector);

        selector.cancel_selection();
        assert!(selector.pending().is_empty());
        assert_eq!(selector.regions().len(), 1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_undo_last_removes_final_region() {
        let mut selector = ready_selector(800, 600);
        for (a, b) in [((1.0, 1.0), (5.0, 5.0)), ((10.0, 10.0), (50.0, 40.0)), ((60.0, 7.0), (70.0, 3.0))] {
            selector.click(a.0, a.1);
            selector.click(b.0, b.1);
        }
        let before = selector.regions().to_vec();
        let log = recorded(&mut selector);

        assert_eq!(selector.undo_last(), Some(rect(60, 3, 70, 7)));
        assert_eq!(selector.regions(), &before[..2]);
        assert_eq!(*log.borrow(), vec![before[..2].to_vec()]);
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut selector = ready_selector(800, 600);
        assert_eq!(selector.undo_last(), None);
        assert!(selector.regions().is_empty());
    }

    #[test]
    fn test_clear_all_empties_everything() {
        let mut selector = ready_selector(800, 600);
        selector.click(1.0, 1.0);
        selector.click(5.0, 5.0);
        selector.click(9.0, 9.0);
        let log = recorded(&mut selector);

        selector.clear_all();
        assert!(selector.regions().is_empty());
        assert!(selector.pending().is_empty());
        assert_eq!(*log.borrow(), vec![Vec::<Rectangle>::new()]);
    }

    #[test]
    fn test_initial_regions_restored() {
        let initial = vec![rect(1, 2, 3, 4)];
        let selector =
            RegionSelector::new("a.png", Size::new(800, 600), DISPLAY, ScalePolicy::Fit, initial.clone());
        assert_eq!(selector.regions(), &initial[..]);
    }

    #[test]
    fn test_zero_sized_image_fails() {
        let mut selector =
            RegionSelector::new("empty.png", Size::new(0, 0), DISPLAY, ScalePolicy::Fit, Vec::new());
        assert!(selector.image_loaded(Size::new(0, 0)).is_err());
        assert!(matches!(selector.state(), LoadState::Failed(_)));
        assert_eq!(selector.click(1.0, 1.0), ClickOutcome::Rejected(Rejection::NotReady));
    }

    #[test]
    fn test_load_failure_blocks_clicks() {
        let mut selector =
            RegionSelector::new("gone.png", Size::new(800, 600), DISPLAY, ScalePolicy::Fit, Vec::new());
        selector.image_failed("404 Not Found");
        assert_eq!(selector.state(), &LoadState::Failed("404 Not Found".to_string()));
        assert_eq!(selector.click(1.0, 1.0), ClickOutcome::Rejected(Rejection::NotReady));
    }
}
