//! UI layer for the desktop shell: upload form, reel listing, and pagination.

pub mod app;

pub use app::ReelsApp;
