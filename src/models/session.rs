// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Multi-image masking session.
//!
//! Tracks the regions drawn on each uploaded image, which images the user
//! has marked complete, and which image is currently active.

use super::payload::{ImageMaskData, ImageRef};
use super::region::Rectangle;
use super::selector::RegionSelector;
use crate::error::{MaskError, MaskResult};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Masking progress of a single image, for the tab strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Empty,
    InProgress,
    Complete,
}

/// Outcome of marking the active image complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Marked; `advanced_to` holds the new active index if auto-advance moved.
    Marked { advanced_to: Option<usize> },
    /// Was already complete; nothing changed.
    AlreadyComplete,
}

/// State of a batch of uploaded images.
#[derive(Debug, Clone)]
pub struct MaskSession {
    images: Vec<ImageRef>,
    masks: HashMap<String, Vec<Rectangle>>,
    completed: HashSet<String>,
    active: usize,
    auto_advance: bool,
}

impl MaskSession {
    /// Start a session over images in upload order.
    pub fn new(images: Vec<ImageRef>, auto_advance: bool) -> MaskResult<Self> {
        let mut masks = HashMap::with_capacity(images.len());
        for image in &images {
            if masks.insert(image.filename.clone(), Vec::new()).is_some() {
                return Err(MaskError::DuplicateImage(image.filename.clone()));
            }
        }

        Ok(Self {
            images,
            masks,
            completed: HashSet::new(),
            active: 0,
            auto_advance,
        })
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_image(&self) -> Option<&ImageRef> {
        self.images.get(self.active)
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    /// Make the image at `index` active.
    pub fn select(&mut self, index: usize) -> MaskResult<()> {
        if index >= self.images.len() {
            return Err(MaskError::IndexOutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    /// Step to the previous image. Returns false at the first image.
    pub fn select_previous(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }

    /// Step to the next image. Returns false at the last image.
    pub fn select_next(&mut self) -> bool {
        if self.active + 1 >= self.images.len() {
            return false;
        }
        self.active += 1;
        true
    }

    /// Regions recorded for an image.
    pub fn regions(&self, image_id: &str) -> &[Rectangle] {
        self.masks.get(image_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_regions(&self) -> &[Rectangle] {
        self.active_image()
            .map(|image| self.regions(&image.filename))
            .unwrap_or(&[])
    }

    /// Replace the region list of an image with its current full state.
    ///
    /// Unknown identifiers are ignored, since entries only exist for
    /// uploaded images.
    pub fn record_regions(&mut self, image_id: &str, regions: &[Rectangle]) {
        match self.masks.get_mut(image_id) {
            Some(entry) => {
                entry.clear();
                entry.extend_from_slice(regions);
            }
            None => log::warn!("Ignoring regions for unknown image {}", image_id),
        }
    }

    pub fn is_complete(&self, image_id: &str) -> bool {
        self.completed.contains(image_id)
    }

    pub fn status(&self, image_id: &str) -> ImageStatus {
        if self.is_complete(image_id) {
            ImageStatus::Complete
        } else if self.regions(image_id).is_empty() {
            ImageStatus::Empty
        } else {
            ImageStatus::InProgress
        }
    }

    /// `(completed, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.completed.len(), self.images.len())
    }

    pub fn all_complete(&self) -> bool {
        !self.is_empty() && self.completed.len() == self.images.len()
    }

    /// First image in upload order that is not complete.
    pub fn next_incomplete(&self) -> Option<usize> {
        self.images
            .iter()
            .position(|image| !self.completed.contains(&image.filename))
    }

    /// Mark the active image complete.
    ///
    /// Refused while the image has no regions. With auto-advance enabled the
    /// next incomplete image becomes active.
    pub fn mark_active_complete(&mut self) -> MaskResult<Completion> {
        let image_id = match self.active_image() {
            Some(image) => image.filename.clone(),
            None => {
                return Err(MaskError::IndexOutOfRange {
                    index: self.active,
                    len: self.images.len(),
                })
            }
        };

        if self.completed.contains(&image_id) {
            return Ok(Completion::AlreadyComplete);
        }
        if self.regions(&image_id).is_empty() {
            return Err(MaskError::EmptyRegions(image_id));
        }

        self.completed.insert(image_id.clone());
        log::info!(
            "Marked {} complete ({}/{})",
            image_id,
            self.completed.len(),
            self.images.len()
        );

        let mut advanced_to = None;
        if self.auto_advance {
            if let Some(next) = self.next_incomplete() {
                self.active = next;
                advanced_to = Some(next);
            }
        }
        Ok(Completion::Marked { advanced_to })
    }

    /// Build the batch payload, one entry per image in upload order.
    ///
    /// Only allowed once every image is complete and still has regions.
    pub fn finalize(&self) -> MaskResult<Vec<ImageMaskData>> {
        let (completed, total) = self.progress();
        if !self.all_complete() {
            return Err(MaskError::IncompleteBatch { completed, total });
        }

        self.images
            .iter()
            .map(|image| {
                let regions = self.regions(&image.filename);
                if regions.is_empty() {
                    return Err(MaskError::EmptyRegions(image.filename.clone()));
                }
                Ok(ImageMaskData {
                    filename: image.filename.clone(),
                    mask_regions: regions.to_vec(),
                })
            })
            .collect()
    }
}

/// Mirror every change to `selector`'s region list into the session entry
/// of its image.
pub fn bind(session: &Rc<RefCell<MaskSession>>, selector: &mut RegionSelector) {
    let session = Rc::clone(session);
    let image_id = selector.image_id().to_string();
    selector.subscribe(move |regions: &[Rectangle]| {
        session.borrow_mut().record_regions(&image_id, regions);
    });
}
