// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region list panel.
//!
//! Shows image and canvas dimensions and the coordinates of every region
//! of the active image.

use crate::models::selector::RegionSelector;

/// Display the panel for the active selector.
pub fn show(ui: &mut egui::Ui, selector: Option<&RegionSelector>) {
    ui.heading("Regions");
    ui.separator();

    let Some(selector) = selector else {
        ui.label(egui::RichText::new("No image loaded").weak());
        return;
    };

    egui::Grid::new("image_info").num_columns(2).show(ui, |ui| {
        let image = selector.image_size();
        let display = selector.display();
        ui.label("Image:");
        ui.label(format!("{} × {}", image.width, image.height));
        ui.end_row();
        ui.label("Canvas:");
        ui.label(format!("{} × {}", display.width, display.height));
        ui.end_row();
        if let Some(projection) = selector.projection() {
            ui.label("Scale:");
            ui.label(format!("{:.3}", projection.scale()));
            ui.end_row();
        }
        ui.label("Pending points:");
        ui.label(selector.pending().len().to_string());
        ui.end_row();
        ui.label("Regions:");
        ui.label(selector.regions().len().to_string());
        ui.end_row();
    });

    ui.separator();

    if selector.regions().is_empty() {
        ui.label(egui::RichText::new("No regions yet").weak());
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, region) in selector.regions().iter().enumerate() {
            ui.label(format!(
                "Region {}: {}  [{}×{}]",
                index + 1,
                region,
                region.width(),
                region.height()
            ));
        }
    });
}
