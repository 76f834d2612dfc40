// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Selection toolbar.
//!
//! Buttons for removing regions and cancelling the pending corner, plus a
//! hint for the next click.

use crate::models::selector::RegionSelector;

/// Toolbar button pressed this frame.
pub enum ToolbarAction {
    None,
    UndoLast,
    ClearAll,
    CancelSelection,
}

/// Display the toolbar for the active selector.
pub fn show(ui: &mut egui::Ui, selector: Option<&RegionSelector>) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let region_count = selector.map_or(0, |s| s.regions().len());
    let pending_count = selector.map_or(0, |s| s.pending().len());

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui
            .add_enabled(region_count > 0, egui::Button::new(format!("↶ Undo last ({})", region_count)))
            .on_hover_text("Ctrl+Z")
            .clicked()
        {
            action = ToolbarAction::UndoLast;
        }

        if ui
            .add_enabled(region_count > 0, egui::Button::new("✖ Clear all"))
            .on_hover_text("Delete")
            .clicked()
        {
            action = ToolbarAction::ClearAll;
        }

        if ui
            .add_enabled(
                pending_count > 0,
                egui::Button::new(format!("Cancel selection ({})", pending_count)),
            )
            .on_hover_text("Escape")
            .clicked()
        {
            action = ToolbarAction::CancelSelection;
        }

        ui.separator();

        let hint = match pending_count {
            0 => "Click the top-left corner of the area to mask",
            _ => "Click the bottom-right corner to finish the region",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
