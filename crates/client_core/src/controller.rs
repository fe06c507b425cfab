//! Orchestrates the directory fetches, the upload lifecycle, and paging over
//! a single [`ViewState`].

use std::{path::Path, sync::Arc, time::Duration};

use shared::{
    domain::{StockOption, VideoFile},
    error::ReelsApiError,
};
use tokio::sync::{broadcast, Mutex, OnceCell};
use tracing::{debug, error, info, warn};

use crate::{
    api::ReelsApi,
    config::ClientSettings,
    media::load_video_file,
    state::{
        abandon_upload, apply_reel_directory, apply_stock_directory, begin_submit, change_page, end_celebration,
        filter_stock_options, finish_upload, CelebrationTicket, SubmitRejection, ViewState,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Stocks,
    Reels,
}

impl Directory {
    pub fn label(self) -> &'static str {
        match self {
            Directory::Stocks => "stock directory",
            Directory::Reels => "reel directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    DirectoryLoaded { directory: Directory, count: usize },
    DirectoryUnavailable { directory: Directory, reason: String },
    UploadStarted,
    UploadSucceeded,
    UploadFailed { reason: String },
    CelebrationEnded,
    PageChanged { page: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Uploaded,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub stock_count: usize,
    pub reel_count: usize,
    pub failures: Vec<(Directory, String)>,
}

pub struct ReelController {
    api: Arc<dyn ReelsApi>,
    state: Arc<Mutex<ViewState>>,
    events: broadcast::Sender<ControllerEvent>,
    startup: OnceCell<StartupReport>,
    celebration: Duration,
    refresh_after_upload: bool,
}

impl ReelController {
    pub fn new(api: Arc<dyn ReelsApi>, settings: &ClientSettings) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            api,
            state: Arc::new(Mutex::new(ViewState::new(settings.page_size))),
            events,
            startup: OnceCell::new(),
            celebration: settings.celebration,
            refresh_after_upload: settings.refresh_after_upload,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    /// Fetches both directories concurrently, once. Later calls return the
    /// first report without touching the network.
    pub async fn initialize(&self) -> StartupReport {
        self.startup
            .get_or_init(|| async {
                let (stocks, reels) = futures::join!(self.load_stocks(), self.load_reels());
                let mut report = StartupReport::default();
                match stocks {
                    Ok(count) => report.stock_count = count,
                    Err(err) => report.failures.push((Directory::Stocks, err.to_string())),
                }
                match reels {
                    Ok(count) => report.reel_count = count,
                    Err(err) => report.failures.push((Directory::Reels, err.to_string())),
                }
                info!(
                    stocks = report.stock_count,
                    reels = report.reel_count,
                    failures = report.failures.len(),
                    "startup directories settled"
                );
                report
            })
            .await
            .clone()
    }

    /// Re-reads the reel directory. On failure the current snapshot is kept.
    pub async fn refresh_reels(&self) -> Result<usize, ReelsApiError> {
        self.load_reels().await
    }

    async fn load_stocks(&self) -> Result<usize, ReelsApiError> {
        match self.api.fetch_stocks().await {
            Ok(stocks) => {
                let count = stocks.len();
                apply_stock_directory(&mut *self.state.lock().await, stocks);
                self.emit(ControllerEvent::DirectoryLoaded {
                    directory: Directory::Stocks,
                    count,
                });
                Ok(count)
            }
            Err(err) => {
                self.directory_unavailable(Directory::Stocks, &err);
                Err(err)
            }
        }
    }

    async fn load_reels(&self) -> Result<usize, ReelsApiError> {
        match self.api.fetch_reels().await {
            Ok(reels) => {
                let count = reels.len();
                apply_reel_directory(&mut *self.state.lock().await, reels);
                self.emit(ControllerEvent::DirectoryLoaded {
                    directory: Directory::Reels,
                    count,
                });
                Ok(count)
            }
            Err(err) => {
                self.directory_unavailable(Directory::Reels, &err);
                Err(err)
            }
        }
    }

    fn directory_unavailable(&self, directory: Directory, err: &ReelsApiError) {
        warn!(directory = directory.label(), "failed to fetch directory: {err}");
        self.emit(ControllerEvent::DirectoryUnavailable {
            directory,
            reason: err.to_string(),
        });
    }

    pub async fn set_caption(&self, caption: impl Into<String>) {
        self.state.lock().await.draft.caption = caption.into();
    }

    pub async fn select_stock(&self, stock: Option<StockOption>) {
        self.state.lock().await.draft.selected_stock = stock;
    }

    pub async fn attach_file(&self, file: VideoFile) {
        debug!(file_name = %file.file_name, size_bytes = file.size_bytes(), "video attached");
        self.state.lock().await.draft.file = Some(file);
    }

    pub async fn attach_file_from_path(&self, path: &Path) -> Result<(), ReelsApiError> {
        let file = load_video_file(path).await?;
        self.attach_file(file).await;
        Ok(())
    }

    pub async fn stock_suggestions(&self, query: &str) -> Vec<StockOption> {
        let state = self.state.lock().await;
        let suggestions = filter_stock_options(&state.stocks, query)
            .into_iter()
            .cloned()
            .collect();
        suggestions
    }

    pub async fn change_page(&self, requested: i64) -> usize {
        let page = change_page(&mut *self.state.lock().await, requested);
        self.emit(ControllerEvent::PageChanged { page });
        page
    }

    /// Validates the draft and uploads it. Rejections never reach the network;
    /// upload failures are reported through [`SubmitOutcome::Failed`].
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitRejection> {
        let request = {
            let mut state = self.state.lock().await;
            begin_submit(&mut state)
        };
        let request = match request {
            Ok(request) => request,
            Err(rejection) => {
                debug!("submit rejected: {rejection}");
                return Err(rejection);
            }
        };
        let mut pending = PendingUpload::new(Arc::clone(&self.state));
        self.emit(ControllerEvent::UploadStarted);

        let outcome = self
            .api
            .upload_reel(&request.file, &request.caption, &request.stock_identifier)
            .await;
        let ticket = {
            let mut state = self.state.lock().await;
            pending.settle();
            finish_upload(&mut state, &outcome)
        };

        match outcome {
            Ok(()) => {
                info!(stock_identifier = %request.stock_identifier, "reel uploaded");
                self.emit(ControllerEvent::UploadSucceeded);
                if let Some(ticket) = ticket {
                    self.schedule_celebration_end(ticket);
                }
                if self.refresh_after_upload {
                    let _ = self.refresh_reels().await;
                }
                Ok(SubmitOutcome::Uploaded)
            }
            Err(err) => {
                error!("failed to upload reel: {err}");
                let reason = err.to_string();
                self.emit(ControllerEvent::UploadFailed {
                    reason: reason.clone(),
                });
                Ok(SubmitOutcome::Failed(reason))
            }
        }
    }

    fn schedule_celebration_end(&self, ticket: CelebrationTicket) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let window = self.celebration;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if end_celebration(&mut *state.lock().await, ticket) {
                let _ = events.send(ControllerEvent::CelebrationEnded);
            }
        });
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

/// Held across the upload await. Dropping it before `settle` means the
/// caller abandoned `submit`, so the lifecycle must leave `InFlight`.
struct PendingUpload {
    state: Arc<Mutex<ViewState>>,
    settled: bool,
}

impl PendingUpload {
    fn new(state: Arc<Mutex<ViewState>>) -> Self {
        Self {
            state,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("upload dropped before it settled");
        if let Ok(mut state) = self.state.try_lock() {
            abandon_upload(&mut state);
            return;
        }
        let state = Arc::clone(&self.state);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                abandon_upload(&mut *state.lock().await);
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
