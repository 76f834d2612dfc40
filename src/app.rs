// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the masking session, the selector of the
//! active image and the background jobs, and routes UI actions between
//! them.

use crate::config::AppConfig;
use crate::error::MaskError;
use crate::io::backend::{self, BackendClient, InFlight};
use crate::io::media::{self, ImageLoader, LoadToken};
use crate::io::serialization;
use crate::models::payload::{BatchRequest, ImageMaskData, ImageRef, ProcessRequest, ResultTable};
use crate::models::selector::{ClickOutcome, RegionSelector};
use crate::models::session::{Completion, MaskSession};
use crate::ui::{canvas, properties, results, tabs, toolbar};
use crate::util::geometry::Size;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Single image or batch workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Multiple,
}

/// Message shown in the status bar.
enum Notice {
    Info(String),
    Warning(String),
}

/// The image being masked.
struct ActiveImage {
    selector: RegionSelector,
    texture: Option<egui::TextureHandle>,
    token: LoadToken,
}

/// Shortcut keys pressed this frame.
#[derive(Debug, Default, PartialEq, Eq)]
struct Shortcuts {
    previous: bool,
    next: bool,
    complete: bool,
    cancel: bool,
    undo: bool,
    clear: bool,
}

impl Shortcuts {
    /// Enter is left to the focused widget, if any, which egui clicks on
    /// Enter itself.
    fn read(input: &egui::InputState, widget_focused: bool) -> Self {
        Self {
            previous: input.key_pressed(egui::Key::ArrowLeft),
            next: input.key_pressed(egui::Key::ArrowRight),
            complete: !widget_focused && input.key_pressed(egui::Key::Enter),
            cancel: input.key_pressed(egui::Key::Escape),
            undo: input.modifiers.command && input.key_pressed(egui::Key::Z),
            clear: input.key_pressed(egui::Key::Delete),
        }
    }
}

type UploadResults = Vec<Result<ImageRef, MaskError>>;

/// Main application state.
pub struct MaskApp {
    config: AppConfig,
    backend: BackendClient,
    mode: Mode,

    /// Uploaded images and their regions; shared with the selector's observer
    session: Option<Rc<RefCell<MaskSession>>>,

    /// Selector and texture of the active image
    active: Option<ActiveImage>,

    loader: ImageLoader,
    uploads: InFlight<UploadResults>,
    processing: InFlight<Result<ResultTable, MaskError>>,

    /// Table from the last successful processing request
    result: Option<ResultTable>,
    notice: Option<Notice>,
}

impl MaskApp {
    /// Create a new application instance.
    pub fn new(config: AppConfig, backend: BackendClient) -> Self {
        Self {
            config,
            backend,
            mode: Mode::Single,
            session: None,
            active: None,
            loader: ImageLoader::new(),
            uploads: InFlight::new(),
            processing: InFlight::new(),
            result: None,
            notice: None,
        }
    }

    fn warn(&mut self, message: impl std::fmt::Display) {
        let message = message.to_string();
        log::warn!("{}", message);
        self.notice = Some(Notice::Warning(message));
    }

    fn info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Info(message.into()));
    }

    fn is_busy(&self) -> bool {
        self.uploads.is_busy() || self.processing.is_busy()
    }

    /// Drop the session, the active image and any pending load.
    fn reset(&mut self) {
        self.loader.cancel();
        self.session = None;
        self.active = None;
        self.result = None;
    }

    fn switch_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        if self.is_busy() {
            self.warn(MaskError::SubmissionInFlight);
            return;
        }
        self.reset();
        self.mode = mode;
        log::info!("Switched to {:?} mode", mode);
    }

    /// Ask for image files and upload them in the background.
    fn pick_and_upload(&mut self) {
        if self.uploads.is_busy() {
            self.warn(MaskError::SubmissionInFlight);
            return;
        }

        let dialog = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"]);
        let paths: Vec<PathBuf> = match self.mode {
            Mode::Single => dialog.pick_file().into_iter().collect(),
            Mode::Multiple => dialog.pick_files().unwrap_or_default(),
        };
        if paths.is_empty() {
            return;
        }

        if let Some(err) = paths.iter().find_map(|p| media::ensure_image(p).err()) {
            self.warn(err);
            return;
        }

        let client = self.backend.clone();
        let label = format!("Uploading {} image(s)...", paths.len());
        let job = move || paths.iter().map(|path| client.upload(path)).collect();
        if let Err(err) = self.uploads.start(label, job) {
            self.warn(err);
        }
    }

    fn finish_uploads(&mut self, results: UploadResults) {
        let mut images = Vec::new();
        let mut failures = 0;
        for result in results {
            match result {
                Ok(image) => images.push(image),
                Err(err) => {
                    log::error!("Upload failed: {}", err);
                    failures += 1;
                }
            }
        }
        if images.is_empty() {
            self.warn("Error while uploading files");
            return;
        }

        self.reset();
        match MaskSession::new(images, self.config.auto_advance) {
            Ok(session) => {
                log::info!("Started session with {} image(s)", session.len());
                self.session = Some(Rc::new(RefCell::new(session)));
                self.activate(0);
                if failures > 0 {
                    self.warn(format!("{} file(s) failed to upload", failures));
                } else {
                    self.notice = None;
                }
            }
            Err(err) => self.warn(err),
        }
    }

    /// Bind a fresh selector to image `index` and start loading its pixels.
    fn activate(&mut self, index: usize) {
        let Some(session) = self.session.clone() else {
            return;
        };

        let (image, initial) = {
            let mut s = session.borrow_mut();
            if let Err(err) = s.select(index) {
                self.warn(err);
                return;
            }
            let Some(image) = s.active_image().cloned() else {
                return;
            };
            let initial = s.regions(&image.filename).to_vec();
            (image, initial)
        };

        let client = self.backend.clone();
        let filename = image.filename.clone();
        let token = self
            .loader
            .request(image.filename.clone(), move || client.fetch_image(&filename));

        let mut selector = RegionSelector::new(
            image.filename.clone(),
            image.size(),
            self.config.display,
            self.config.scale_policy,
            initial,
        );
        crate::models::session::bind(&session, &mut selector);

        self.active = Some(ActiveImage {
            selector,
            texture: None,
            token,
        });
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(outcome) = self.loader.poll() else {
            return;
        };
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if outcome.token != active.token {
            return;
        }

        match outcome.result {
            Ok(decoded) => {
                let size = [decoded.width as usize, decoded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &decoded.pixels);
                active.texture = Some(ctx.load_texture(
                    active.selector.image_id().to_string(),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                if let Err(err) = active
                    .selector
                    .image_loaded(Size::new(decoded.width, decoded.height))
                {
                    self.warn(err);
                }
            }
            Err(err) => {
                active.selector.image_failed(err.to_string());
                self.warn(err);
            }
        }
    }

    fn poll_jobs(&mut self) {
        if let Some(results) = self.uploads.poll() {
            self.finish_uploads(results);
        }
        if let Some(result) = self.processing.poll() {
            match result {
                Ok(table) => {
                    log::info!("Received {} extracted row(s)", table.rows.len());
                    self.result = Some(table);
                    self.info("Processing complete");
                }
                Err(err) => {
                    log::error!("Processing failed: {}", err);
                    self.warn("An error occurred while processing");
                }
            }
        }
    }

    fn handle_canvas(&mut self, action: canvas::CanvasAction) {
        let canvas::CanvasAction::Click {
            raw_x,
            raw_y,
            rendered_width,
            rendered_height,
        } = action
        else {
            return;
        };
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if let ClickOutcome::Rejected(reason) =
            active
                .selector
                .click_rendered(raw_x, raw_y, rendered_width, rendered_height)
        {
            log::debug!("Click rejected: {:?}", reason);
        }
    }

    fn handle_toolbar(&mut self, action: toolbar::ToolbarAction) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        match action {
            toolbar::ToolbarAction::UndoLast => {
                active.selector.undo_last();
            }
            toolbar::ToolbarAction::ClearAll => active.selector.clear_all(),
            toolbar::ToolbarAction::CancelSelection => active.selector.cancel_selection(),
            toolbar::ToolbarAction::None => {}
        }
    }

    fn mark_complete(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let outcome = session.borrow_mut().mark_active_complete();
        match outcome {
            Ok(Completion::Marked { advanced_to: Some(next) }) => self.activate(next),
            Ok(Completion::Marked { advanced_to: None }) => {
                let all_done = session.borrow().all_complete();
                if all_done {
                    self.info("All images masked, ready for batch processing");
                }
            }
            Ok(Completion::AlreadyComplete) => {}
            Err(err) => self.warn(err),
        }
    }

    fn navigate(&mut self, forward: bool) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let moved = {
            let mut s = session.borrow_mut();
            let moved = if forward { s.select_next() } else { s.select_previous() };
            let index = s.active_index();
            moved.then_some(index)
        };
        if let Some(index) = moved {
            self.activate(index);
        }
    }

    fn handle_tabs(&mut self, action: tabs::TabsAction) {
        match action {
            tabs::TabsAction::Select(index) => {
                let current = self.session.as_ref().map(|s| s.borrow().active_index());
                if current != Some(index) {
                    self.activate(index);
                }
            }
            tabs::TabsAction::Previous => self.navigate(false),
            tabs::TabsAction::Next => self.navigate(true),
            tabs::TabsAction::MarkComplete => self.mark_complete(),
            tabs::TabsAction::SetAutoAdvance(enabled) => {
                if let Some(session) = &self.session {
                    session.borrow_mut().set_auto_advance(enabled);
                }
            }
            tabs::TabsAction::ProcessBatch => self.process_batch(),
            tabs::TabsAction::None => {}
        }
    }

    /// Submit the active image of a single-image session.
    fn process_single(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let request = {
            let s = session.borrow();
            let Some(image) = s.active_image() else {
                return;
            };
            ProcessRequest {
                filename: image.filename.clone(),
                mask_regions: s.active_regions().to_vec(),
                session_name: Some(backend::session_name("Single Processing")),
            }
        };
        if request.mask_regions.is_empty() {
            self.warn(MaskError::NoRegions);
            return;
        }

        let client = self.backend.clone();
        let job = move || client.process(&request).map(ResultTable::from);
        match self.processing.start("Extracting table data...", job) {
            Ok(()) => self.result = None,
            Err(err) => self.warn(err),
        }
    }

    /// Submit every image once the whole session is complete.
    fn process_batch(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let finalized = session.borrow().finalize();
        let images = match finalized {
            Ok(images) => images,
            Err(err) => {
                self.warn(err);
                return;
            }
        };

        let request = BatchRequest {
            images,
            session_name: Some(backend::session_name("Batch Processing")),
        };
        let client = self.backend.clone();
        let job = move || client.process_multiple(&request).map(ResultTable::from);
        match self.processing.start("Processing batch...", job) {
            Ok(()) => self.result = None,
            Err(err) => self.warn(err),
        }
    }

    /// Current regions of every image, complete or not.
    fn current_payload(&self) -> Option<BatchRequest> {
        let session = self.session.as_ref()?.borrow();
        let images = session
            .images()
            .iter()
            .map(|image| ImageMaskData {
                filename: image.filename.clone(),
                mask_regions: session.regions(&image.filename).to_vec(),
            })
            .collect();
        Some(BatchRequest {
            images,
            session_name: None,
        })
    }

    fn export_regions(&mut self, path: PathBuf) {
        let Some(payload) = self.current_payload() else {
            return;
        };
        match serialization::export(&payload, &path) {
            Ok(()) => {
                log::info!("Exported regions to {}", path.display());
                self.info(format!("Exported regions to {}", path.display()));
            }
            Err(e) => self.warn(format!("Failed to export regions: {:#}", e)),
        }
    }

    /// Restore regions for images of the current session from a file.
    fn import_regions(&mut self, path: PathBuf) {
        let Some(session) = self.session.clone() else {
            self.warn("Upload images before importing regions");
            return;
        };
        let payload = match serialization::import(&path) {
            Ok(payload) => payload,
            Err(e) => {
                self.warn(format!("{:#}", e));
                return;
            }
        };

        let (matched, active_index) = {
            let mut s = session.borrow_mut();
            let mut matched = 0;
            for entry in &payload.images {
                if s.images().iter().any(|image| image.filename == entry.filename) {
                    s.record_regions(&entry.filename, &entry.mask_regions);
                    matched += 1;
                }
            }
            (matched, s.active_index())
        };
        log::info!("Imported regions for {} image(s) from {}", matched, path.display());

        if matched == 0 {
            self.warn("No images in the file match this session");
        } else {
            self.activate(active_index);
            self.info(format!("Imported regions for {} image(s)", matched));
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let widget_focused = ctx.memory(|m| m.focused().is_some());
        let keys = ctx.input(|i| Shortcuts::read(i, widget_focused));

        if let Some(active) = self.active.as_mut() {
            if keys.cancel {
                active.selector.cancel_selection();
            }
            if keys.undo {
                active.selector.undo_last();
            }
            if keys.clear {
                active.selector.clear_all();
            }
        }

        if self.mode == Mode::Multiple {
            if keys.previous {
                self.navigate(false);
            }
            if keys.next {
                self.navigate(true);
            }
            if keys.complete {
                self.mark_complete();
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    let upload_label = match self.mode {
                        Mode::Single => "Upload Image...",
                        Mode::Multiple => "Upload Images...",
                    };
                    if ui
                        .add_enabled(!self.uploads.is_busy(), egui::Button::new(upload_label))
                        .clicked()
                    {
                        self.pick_and_upload();
                        ui.close_menu();
                    }
                    let has_session = self.session.is_some();
                    if ui
                        .add_enabled(has_session, egui::Button::new("Import Regions..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Regions", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.import_regions(path);
                        }
                        ui.close_menu();
                    }
                    ui.add_enabled_ui(has_session, |ui| {
                        ui.menu_button("Export Regions", |ui| {
                            if ui.button("Export as YAML...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("YAML", &["yaml", "yml"])
                                    .set_file_name("regions.yaml")
                                    .save_file()
                                {
                                    self.export_regions(path);
                                }
                                ui.close_menu();
                            }
                            if ui.button("Export as JSON...").clicked() {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter("JSON", &["json"])
                                    .set_file_name("regions.json")
                                    .save_file()
                                {
                                    self.export_regions(path);
                                }
                                ui.close_menu();
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let regions = self.active.as_ref().map_or(0, |a| a.selector.regions().len());
                    let pending = self.active.as_ref().map_or(0, |a| a.selector.pending().len());
                    if ui
                        .add_enabled(regions > 0, egui::Button::new("Undo Last Region (Ctrl+Z)"))
                        .clicked()
                    {
                        self.handle_toolbar(toolbar::ToolbarAction::UndoLast);
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(regions > 0, egui::Button::new("Clear All Regions (Del)"))
                        .clicked()
                    {
                        self.handle_toolbar(toolbar::ToolbarAction::ClearAll);
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(pending > 0, egui::Button::new("Cancel Selection (Esc)"))
                        .clicked()
                    {
                        self.handle_toolbar(toolbar::ToolbarAction::CancelSelection);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Mode", |ui| {
                    if ui.selectable_label(self.mode == Mode::Single, "Single Image").clicked() {
                        self.switch_mode(Mode::Single);
                        ui.close_menu();
                    }
                    if ui.selectable_label(self.mode == Mode::Multiple, "Multiple Images").clicked() {
                        self.switch_mode(Mode::Multiple);
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

impl eframe::App for MaskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);
        self.poll_jobs();

        // Keep polling background work
        if self.loader.is_loading() || self.is_busy() {
            ctx.request_repaint();
        }

        self.menu_bar(ctx);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.active.as_ref().map(|a| &a.selector)))
            .inner;
        self.handle_toolbar(toolbar_action);

        if self.mode == Mode::Multiple {
            if let Some(session) = self.session.clone() {
                let busy = self.is_busy();
                let tabs_action = egui::TopBottomPanel::top("image_tabs")
                    .show(ctx, |ui| tabs::show(ui, &session.borrow(), busy))
                    .inner;
                self.handle_tabs(tabs_action);
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Mode: {:?}", self.mode));
                ui.separator();
                if let Some(label) = self.uploads.label().or(self.processing.label()) {
                    ui.spinner();
                    ui.label(label);
                    ui.separator();
                }
                match &self.notice {
                    Some(Notice::Warning(message)) => {
                        ui.colored_label(egui::Color32::from_rgb(239, 68, 68), message);
                    }
                    Some(Notice::Info(message)) => {
                        ui.label(message);
                    }
                    None => {
                        ui.label("Ready");
                    }
                }
            });
        });

        if self.mode == Mode::Single && self.session.is_some() {
            let regions = self.active.as_ref().map_or(0, |a| a.selector.regions().len());
            let busy = self.processing.is_busy();
            let clicked = egui::TopBottomPanel::bottom("actions")
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        let label = if busy { "Processing..." } else { "Extract table data" };
                        ui.add_enabled(regions > 0 && !busy, egui::Button::new(label))
                            .clicked()
                    })
                    .inner
                })
                .inner;
            if clicked {
                self.process_single();
            }
        }

        if let Some(table) = &self.result {
            egui::TopBottomPanel::bottom("results")
                .resizable(true)
                .show(ctx, |ui| results::show(ui, table));
        }

        egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, self.active.as_ref().map(|a| &a.selector)));

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let active = self.active.as_ref();
                canvas::show(
                    ui,
                    active.map(|a| &a.selector),
                    active.and_then(|a| a.texture.as_ref()),
                )
            })
            .inner;
        self.handle_canvas(canvas_action);

        self.handle_keyboard(ctx);
    }
}
