use std::time::Duration;

use client_core::{filter_stock_options, ControllerEvent, UploadLifecycle, ViewState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::StockOption;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi"];
const MAX_PAGE_BUTTONS: usize = 7;
const CELEBRATION_COLOR: egui::Color32 = egui::Color32::from_rgb(46, 160, 67);

pub struct ReelsApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: Option<ViewState>,
    caption_input: String,
    stock_query: String,
    status: String,
    alert: Option<String>,
}

impl ReelsApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: None,
            caption_input: String::new(),
            stock_query: String::new(),
            status: "Loading stocks and reels...".to_string(),
            alert: None,
        };
        app.queue(BackendCommand::Initialize);
        app
    }

    fn queue(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::Snapshot(view) => self.view = Some(*view),
                UiEvent::Controller(event) => self.apply_controller_event(event),
                UiEvent::Error(err) => {
                    tracing::debug!(
                        category = ?err.category(),
                        context = ?err.context(),
                        message = err.message(),
                        "surfacing error to user"
                    );
                    self.alert = Some(err.alert_text());
                }
            }
        }
    }

    fn apply_controller_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::DirectoryLoaded { directory, count } => {
                self.status = format!("Loaded {count} entries from the {}", directory.label());
            }
            ControllerEvent::DirectoryUnavailable { directory, .. } => {
                self.status = format!("The {} is unavailable right now", directory.label());
            }
            ControllerEvent::UploadStarted => self.status = "Uploading reel...".to_string(),
            ControllerEvent::UploadSucceeded => self.status = String::new(),
            ControllerEvent::UploadFailed { .. } => self.status = "Upload failed".to_string(),
            ControllerEvent::CelebrationEnded | ControllerEvent::PageChanged { .. } => {}
        }
    }

    fn show_upload_form(&mut self, ui: &mut egui::Ui, view: &ViewState) {
        ui.group(|ui| {
            ui.label("Caption");
            let caption = ui.add(
                egui::TextEdit::singleline(&mut self.caption_input)
                    .desired_width(f32::INFINITY)
                    .hint_text("Say something about this reel"),
            );
            if caption.changed() {
                self.queue(BackendCommand::SetCaption(self.caption_input.clone()));
            }
            ui.add_space(8.0);

            self.show_stock_picker(ui, view);
            ui.add_space(8.0);

            if ui
                .add_sized([ui.available_width(), 28.0], egui::Button::new("Choose File"))
                .clicked()
            {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Video", VIDEO_EXTENSIONS)
                    .pick_file()
                {
                    self.queue(BackendCommand::AttachFile(path));
                }
            }
            if let Some(file_name) = view.draft.file_name() {
                ui.weak(format!("Selected File: {file_name}"));
            }

            match &view.lifecycle {
                UploadLifecycle::InFlight => {
                    ui.add(egui::ProgressBar::new(0.0).animate(true));
                }
                UploadLifecycle::Succeeded => {
                    ui.colored_label(CELEBRATION_COLOR, "🎉 Reel uploaded successfully!");
                }
                UploadLifecycle::Idle | UploadLifecycle::Failed(_) => {}
            }

            ui.add_space(8.0);
            let upload = ui.add_enabled(
                view.can_submit(),
                egui::Button::new("Upload Reel").min_size(egui::vec2(ui.available_width(), 32.0)),
            );
            if upload.clicked() {
                self.queue(BackendCommand::Submit);
            }
        });
    }

    fn show_stock_picker(&mut self, ui: &mut egui::Ui, view: &ViewState) {
        ui.label("Stock Identifier");
        ui.add(
            egui::TextEdit::singleline(&mut self.stock_query)
                .desired_width(f32::INFINITY)
                .hint_text("Type to filter"),
        );

        let selected_text = view
            .draft
            .selected_stock
            .as_ref()
            .map(stock_display)
            .unwrap_or_else(|| "Select a stock".to_string());
        let mut picked: Option<Option<StockOption>> = None;
        egui::ComboBox::from_label("")
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                if view.draft.selected_stock.is_some() && ui.selectable_label(false, "Clear").clicked()
                {
                    picked = Some(None);
                }
                for option in filter_stock_options(&view.stocks, &self.stock_query) {
                    let is_selected = view.draft.selected_stock.as_ref() == Some(option);
                    if ui
                        .selectable_label(is_selected, stock_display(option))
                        .clicked()
                    {
                        picked = Some(Some(option.clone()));
                    }
                }
            });
        if let Some(choice) = picked {
            self.queue(BackendCommand::SelectStock(choice));
        }
    }

    fn show_reel_list(&mut self, ui: &mut egui::Ui, view: &ViewState) {
        ui.heading("Latest Reels");
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 48.0)
            .show(ui, |ui| {
                if view.reels.is_empty() {
                    ui.weak("No reels yet.");
                }
                for reel in view.current_page_reels() {
                    ui.group(|ui| {
                        ui.set_width(ui.available_width());
                        ui.strong(format!("🎬 {}", reel.caption));
                        ui.label(format!("URL: {}", reel.media_url));
                        ui.label(format!("Stock Identifier: {}", reel.stock_identifier));
                        ui.weak(format!("Likes: {}", reel.like_count));
                    });
                }
            });

        let current = view.current_page();
        let total = view.total_pages();
        let mut requested: Option<usize> = None;
        ui.horizontal(|ui| {
            if ui.add_enabled(current > 1, egui::Button::new("‹")).clicked() {
                requested = Some(current - 1);
            }
            for page in page_window(current, total, MAX_PAGE_BUTTONS) {
                if ui
                    .selectable_label(page == current, page.to_string())
                    .clicked()
                {
                    requested = Some(page);
                }
            }
            if ui.add_enabled(current < total, egui::Button::new("›")).clicked() {
                requested = Some(current + 1);
            }
        });
        if let Some(page) = requested.filter(|page| *page != current) {
            self.queue(BackendCommand::ChangePage(page as i64));
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for ReelsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.weak(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Upload Your Reel");
            });
            ui.add_space(12.0);

            let Some(view) = self.view.clone() else {
                ui.spinner();
                return;
            };
            self.show_upload_form(ui, &view);
            ui.add_space(16.0);
            self.show_reel_list(ui, &view);
        });

        self.show_alert(ctx);
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

fn stock_display(option: &StockOption) -> String {
    format!("{} ({})", option.label, option.value)
}

/// Page numbers to render as buttons: at most `max_buttons`, centered on
/// `current` and shifted to stay inside `[1, total]`.
fn page_window(current: usize, total: usize, max_buttons: usize) -> Vec<usize> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let span = max_buttons.max(1).min(total);
    let half = span / 2;
    let start = current.saturating_sub(half).max(1).min(total + 1 - span);
    (start..start + span).collect()
}
