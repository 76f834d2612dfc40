// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Masking canvas.
//!
//! The canvas is a fixed-resolution display surface (the configured
//! display size) scaled to fit the panel. The image is letterboxed inside
//! the surface by the selector's projection; masking regions and the
//! pending corner are drawn on top.

use crate::models::selector::{LoadState, RegionSelector};
use crate::util::geometry::Projection;

const REGION_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(67, 19, 19, 71);
const REGION_STROKE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const POINT_FILL: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const POINT_LABEL: egui::Color32 = egui::Color32::from_rgb(29, 78, 216);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Click relative to the surface's on-screen top-left corner.
    Click {
        raw_x: f64,
        raw_y: f64,
        rendered_width: f64,
        rendered_height: f64,
    },
}

/// Display the canvas and report clicks on the surface.
pub fn show(
    ui: &mut egui::Ui,
    selector: Option<&RegionSelector>,
    image_texture: Option<&egui::TextureHandle>,
) -> CanvasAction {
    let Some(selector) = selector else {
        show_welcome(ui);
        return CanvasAction::None;
    };

    match selector.state() {
        LoadState::Loading => {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.label(format!("Loading image... {}", selector.image_id()));
                });
            });
            CanvasAction::None
        }
        LoadState::Failed(reason) => {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.heading(egui::RichText::new("Image failed to load").color(REGION_STROKE));
                ui.label(format!("Could not load image: {}", selector.image_id()));
                ui.label(egui::RichText::new(reason).weak());
                ui.label(egui::RichText::new("Check that the backend server is running.").small());
            });
            CanvasAction::None
        }
        LoadState::Ready(projection) => show_surface(ui, selector, projection, image_texture),
    }
}

fn show_surface(
    ui: &mut egui::Ui,
    selector: &RegionSelector,
    projection: &Projection,
    image_texture: Option<&egui::TextureHandle>,
) -> CanvasAction {
    let display = selector.display();
    let internal = egui::vec2(display.width as f32, display.height as f32);

    // Shrink the surface to the panel, never enlarge it past native size.
    let available = ui.available_size();
    let fit = (available.x / internal.x).min(available.y / internal.y).min(1.0);
    let (surface, response) = ui.allocate_exact_size(internal * fit, egui::Sense::click());

    let to_screen = |x: f64, y: f64| {
        egui::pos2(
            surface.min.x + x as f32 * fit,
            surface.min.y + y as f32 * fit,
        )
    };

    let painter = ui.painter_at(surface);
    painter.rect_filled(surface, 0.0, egui::Color32::WHITE);

    let (offset_x, offset_y) = projection.offset();
    let (scaled_width, scaled_height) = projection.scaled_size();
    let image_rect = egui::Rect::from_min_max(
        to_screen(offset_x, offset_y),
        to_screen(offset_x + scaled_width, offset_y + scaled_height),
    );
    if let Some(texture) = image_texture {
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    for (index, region) in selector.regions().iter().enumerate() {
        let (x1, y1) = projection.to_display(region.x1() as f64, region.y1() as f64);
        let (x2, y2) = projection.to_display(region.x2() as f64, region.y2() as f64);
        let rect = egui::Rect::from_min_max(to_screen(x1, y1), to_screen(x2, y2));
        painter.rect_filled(rect, 0.0, REGION_FILL);
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, REGION_STROKE));
        painter.text(
            rect.min + egui::vec2(5.0, 4.0),
            egui::Align2::LEFT_TOP,
            format!("{}", index + 1),
            egui::FontId::proportional(16.0),
            REGION_STROKE,
        );
    }

    for (index, point) in selector.pending().points().enumerate() {
        let (x, y) = projection.to_display(point.x as f64, point.y as f64);
        let center = to_screen(x, y);
        painter.circle_filled(center, 8.0 * fit.max(0.5), POINT_FILL);
        painter.text(
            center + egui::vec2(12.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{}", index + 1),
            egui::FontId::proportional(14.0),
            POINT_LABEL,
        );
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            return CanvasAction::Click {
                raw_x: (pos.x - surface.min.x) as f64,
                raw_y: (pos.y - surface.min.y) as f64,
                rendered_width: surface.width() as f64,
                rendered_height: surface.height() as f64,
            };
        }
    }

    CanvasAction::None
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Tablemask")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Mask image regions before table extraction")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Upload an image to begin masking")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Upload Images...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
