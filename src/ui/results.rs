// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Extracted table view.

use crate::models::payload::ResultTable;

/// Display the table returned by the backend.
pub fn show(ui: &mut egui::Ui, table: &ResultTable) {
    ui.heading("Extracted data");
    ui.horizontal(|ui| {
        if let Some(summary) = &table.summary {
            ui.label(summary);
        }
        if ui
            .add_enabled(!table.rows.is_empty(), egui::Button::new("📋 Copy table"))
            .on_hover_text("Copy as tab-separated text")
            .clicked()
        {
            ui.ctx().copy_text(table.to_tsv());
            log::info!("Copied {} row(s) to the clipboard", table.rows.len());
        }
    });
    ui.separator();

    if table.rows.is_empty() {
        ui.label(egui::RichText::new("No rows extracted").weak());
    } else {
        egui::ScrollArea::both()
            .id_source("result_rows")
            .max_height(240.0)
            .show(ui, |ui| {
                egui::Grid::new("result_table").striped(true).show(ui, |ui| {
                    for header in &table.headers {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for row in &table.rows {
                        for cell in row {
                            ui.label(cell);
                        }
                        ui.end_row();
                    }
                });
            });
    }

    if let Some(raw) = &table.raw {
        egui::CollapsingHeader::new("Raw response").show(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_source("result_raw")
                .max_height(200.0)
                .show(ui, |ui| {
                    ui.monospace(raw);
                });
        });
    }
}
