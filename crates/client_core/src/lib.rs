//! Client core for the reel uploader: remote directory/upload clients, pagination,
//! view-state transitions, and the controller that orchestrates them.

pub mod api;
pub mod config;
pub mod controller;
pub mod media;
pub mod pagination;
pub mod state;

pub use api::{HttpReelsApi, ReelsApi};
pub use config::{load_settings, ClientSettings, SettingsError};
pub use controller::{ControllerEvent, Directory, ReelController, StartupReport, SubmitOutcome};
pub use pagination::{paginate, total_pages, PageState};
pub use state::{
    filter_stock_options, SubmitRejection, UploadDraft, UploadLifecycle, UploadRequest, ViewState,
};
