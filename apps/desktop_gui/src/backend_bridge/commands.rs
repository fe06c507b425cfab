//! Backend commands queued from UI to backend worker.

use shared::domain::StockOption;
use std::path::PathBuf;

pub enum BackendCommand {
    Initialize,
    SetCaption(String),
    SelectStock(Option<StockOption>),
    AttachFile(PathBuf),
    Submit,
    ChangePage(i64),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Initialize => "initialize",
            BackendCommand::SetCaption(_) => "set_caption",
            BackendCommand::SelectStock(_) => "select_stock",
            BackendCommand::AttachFile(_) => "attach_file",
            BackendCommand::Submit => "submit",
            BackendCommand::ChangePage(_) => "change_page",
        }
    }
}
