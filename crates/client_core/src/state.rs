//! View state for the upload form and reel listing, plus the pure transitions
//! the controller applies to it.

use shared::{
    domain::{Reel, StockIdentifier, StockOption, VideoFile},
    error::{MissingField, ReelsApiError, ValidationError},
};
use thiserror::Error;

use crate::pagination::PageState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadLifecycle {
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl UploadLifecycle {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadLifecycle::InFlight)
    }

    pub fn is_celebrating(&self) -> bool {
        matches!(self, UploadLifecycle::Succeeded)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
    pub file: Option<VideoFile>,
    pub caption: String,
    pub selected_stock: Option<StockOption>,
}

impl UploadDraft {
    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|file| file.file_name.as_str())
    }

    pub fn validate(&self) -> Result<UploadRequest, ValidationError> {
        let mut missing = Vec::new();
        if self.file.is_none() {
            missing.push(MissingField::File);
        }
        if self.caption.is_empty() {
            missing.push(MissingField::Caption);
        }
        if self.selected_stock.is_none() {
            missing.push(MissingField::Stock);
        }

        match (&self.file, &self.selected_stock) {
            (Some(file), Some(stock)) if missing.is_empty() => Ok(UploadRequest {
                file: file.clone(),
                caption: self.caption.clone(),
                stock_identifier: stock.value.clone(),
            }),
            _ => Err(ValidationError { missing }),
        }
    }
}

/// A validated draft, detached from the view state for the duration of the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: VideoFile,
    pub caption: String,
    pub stock_identifier: StockIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("an upload is already in progress")]
    InFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Identifies one success window so a stale timer cannot end a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CelebrationTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub stocks: Vec<StockOption>,
    pub reels: Vec<Reel>,
    pub draft: UploadDraft,
    pub lifecycle: UploadLifecycle,
    pub page: PageState,
    celebration_generation: u64,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            stocks: Vec::new(),
            reels: Vec::new(),
            draft: UploadDraft::default(),
            lifecycle: UploadLifecycle::Idle,
            page: PageState::new(page_size),
            celebration_generation: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.page.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.page.total_pages(self.reels.len())
    }

    pub fn current_page_reels(&self) -> &[Reel] {
        self.page.slice(&self.reels)
    }

    pub fn can_submit(&self) -> bool {
        !self.lifecycle.is_in_flight()
    }
}

pub fn apply_stock_directory(state: &mut ViewState, stocks: Vec<StockOption>) {
    let keep_selection = state
        .draft
        .selected_stock
        .as_ref()
        .is_some_and(|selected| stocks.contains(selected));
    if !keep_selection {
        state.draft.selected_stock = None;
    }
    state.stocks = stocks;
}

/// Replaces the reel snapshot wholesale and keeps the current page in range.
pub fn apply_reel_directory(state: &mut ViewState, reels: Vec<Reel>) {
    state.reels = reels;
    state.page.clamp_to(state.reels.len());
}

pub fn begin_submit(state: &mut ViewState) -> Result<UploadRequest, SubmitRejection> {
    if state.lifecycle.is_in_flight() {
        return Err(SubmitRejection::InFlight);
    }
    let request = state.draft.validate()?;
    state.lifecycle = UploadLifecycle::InFlight;
    state.celebration_generation = state.celebration_generation.wrapping_add(1);
    Ok(request)
}

/// Settles an in-flight upload. A success opens a new celebration window and
/// returns the ticket that closes it. The draft is left untouched either way.
pub fn finish_upload(
    state: &mut ViewState,
    outcome: &Result<(), ReelsApiError>,
) -> Option<CelebrationTicket> {
    match outcome {
        Ok(()) => {
            state.lifecycle = UploadLifecycle::Succeeded;
            Some(CelebrationTicket(state.celebration_generation))
        }
        Err(err) => {
            state.lifecycle = UploadLifecycle::Failed(err.to_string());
            None
        }
    }
}

pub const UPLOAD_ABANDONED: &str = "upload cancelled before completion";

/// Releases the in-flight guard when an upload is dropped before it settled.
pub fn abandon_upload(state: &mut ViewState) {
    if state.lifecycle.is_in_flight() {
        state.lifecycle = UploadLifecycle::Failed(UPLOAD_ABANDONED.to_string());
    }
}

pub fn end_celebration(state: &mut ViewState, ticket: CelebrationTicket) -> bool {
    if state.lifecycle.is_celebrating() && state.celebration_generation == ticket.0 {
        state.lifecycle = UploadLifecycle::Idle;
        return true;
    }
    false
}

pub fn change_page(state: &mut ViewState, requested: i64) -> usize {
    let reel_count = state.reels.len();
    state.page.go_to(requested, reel_count)
}

/// Autocomplete-style filter: case-insensitive substring match on the label,
/// preserving server order. A blank query matches everything.
pub fn filter_stock_options<'a>(options: &'a [StockOption], query: &str) -> Vec<&'a StockOption> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return options.iter().collect();
    }
    options
        .iter()
        .filter(|option| option.label.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
