//! Backend-to-UI events and error modeling for the desktop shell.

use client_core::{ControllerEvent, ViewState};
use shared::error::ReelsApiError;

pub enum UiEvent {
    Info(String),
    Snapshot(Box<ViewState>),
    Controller(ControllerEvent),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    File,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    AttachFile,
    Upload,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    /// Classifies by the error variant, never by the message text.
    pub fn from_api_error(context: UiErrorContext, err: &ReelsApiError) -> Self {
        let category = match err {
            ReelsApiError::File { .. } => UiErrorCategory::File,
            ReelsApiError::Transport(_)
            | ReelsApiError::Status { .. }
            | ReelsApiError::Decode(_) => UiErrorCategory::Transport,
        };
        Self::new(category, context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text shown in the blocking alert window.
    pub fn alert_text(&self) -> String {
        match self.context {
            UiErrorContext::Upload if self.category != UiErrorCategory::Validation => {
                format!("Failed to upload reel reason: {}", self.message)
            }
            _ => self.message.clone(),
        }
    }
}
