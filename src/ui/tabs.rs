// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image tab strip for multi-image sessions.
//!
//! One tab per uploaded image with its masking status, a progress bar and
//! the completion and navigation controls.

use crate::models::session::{ImageStatus, MaskSession};

/// Tab strip interaction this frame.
pub enum TabsAction {
    None,
    Select(usize),
    Previous,
    Next,
    MarkComplete,
    SetAutoAdvance(bool),
    ProcessBatch,
}

fn status_glyph(status: ImageStatus) -> (&'static str, egui::Color32) {
    match status {
        ImageStatus::Complete => ("✓", egui::Color32::from_rgb(22, 163, 74)),
        ImageStatus::InProgress => ("◐", egui::Color32::from_rgb(202, 138, 4)),
        ImageStatus::Empty => ("○", egui::Color32::GRAY),
    }
}

/// Display the tab strip. `busy` disables batch submission.
pub fn show(ui: &mut egui::Ui, session: &MaskSession, busy: bool) -> TabsAction {
    let mut action = TabsAction::None;
    let active = session.active_index();

    egui::ScrollArea::horizontal().show(ui, |ui| {
        ui.horizontal(|ui| {
            for (index, image) in session.images().iter().enumerate() {
                let (glyph, color) = status_glyph(session.status(&image.filename));
                let text = egui::RichText::new(format!("{} {}", image.original_name, glyph)).color(color);
                if ui.selectable_label(index == active, text).clicked() {
                    action = TabsAction::Select(index);
                }
            }
        });
    });

    let (completed, total) = session.progress();
    ui.horizontal(|ui| {
        ui.label(format!("Progress: {} / {} complete", completed, total));
        let fraction = if total == 0 { 0.0 } else { completed as f32 / total as f32 };
        ui.add(egui::ProgressBar::new(fraction).desired_width(200.0));
    });

    ui.horizontal(|ui| {
        let is_complete = session
            .active_image()
            .is_some_and(|image| session.is_complete(&image.filename));
        let label = if is_complete { "Completed" } else { "Mark complete" };
        if ui
            .add_enabled(!is_complete, egui::Button::new(label))
            .on_hover_text("Enter")
            .clicked()
        {
            action = TabsAction::MarkComplete;
        }

        if active > 0 && ui.button("◀ Previous image").clicked() {
            action = TabsAction::Previous;
        }
        if active + 1 < session.len() && ui.button("Next image ▶").clicked() {
            action = TabsAction::Next;
        }

        let mut auto_advance = session.auto_advance();
        if ui
            .checkbox(&mut auto_advance, "Auto-advance")
            .on_hover_text("Jump to the next incomplete image after marking one complete")
            .changed()
        {
            action = TabsAction::SetAutoAdvance(auto_advance);
        }

        if session.all_complete() {
            ui.separator();
            if ui
                .add_enabled(!busy, egui::Button::new("Process batch"))
                .clicked()
            {
                action = TabsAction::ProcessBatch;
            }
        }
    });

    action
}
