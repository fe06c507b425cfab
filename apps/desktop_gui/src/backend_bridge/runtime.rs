//! Runtime bridge between UI command queue and the reel controller.

use std::{sync::Arc, thread};

use client_core::{
    ClientSettings, ControllerEvent, HttpReelsApi, ReelController, SubmitOutcome, SubmitRejection,
};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorCategory::Unknown,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            if let Err(err) = settings.validate() {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorCategory::Validation,
                    UiErrorContext::BackendStartup,
                    format!("invalid client settings: {err}"),
                )));
                tracing::error!("invalid client settings: {err}");
                return;
            }
            let api = match HttpReelsApi::new(&settings) {
                Ok(api) => api,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                        UiErrorCategory::Transport,
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to build http client: {err}");
                    return;
                }
            };
            let controller = Arc::new(ReelController::new(Arc::new(api), &settings));
            spawn_event_forwarder(Arc::clone(&controller), ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&controller, &ui_tx, cmd).await;
            }
        });
    });
}

/// Draft edits (file included) are applied before the next command is read,
/// so a submit queued behind them always sees them. Network work is spawned.
async fn handle_command(
    controller: &Arc<ReelController>,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) {
    tracing::debug!(command = cmd.name(), "handling backend command");
    match cmd {
        BackendCommand::Initialize => {
            let controller = Arc::clone(controller);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                controller.initialize().await;
                send_snapshot(&controller, &ui_tx).await;
            });
        }
        BackendCommand::SetCaption(caption) => {
            controller.set_caption(caption).await;
            send_snapshot(controller, ui_tx).await;
        }
        BackendCommand::SelectStock(stock) => {
            controller.select_stock(stock).await;
            send_snapshot(controller, ui_tx).await;
        }
        BackendCommand::AttachFile(path) => {
            if let Err(err) = controller.attach_file_from_path(&path).await {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_api_error(
                    UiErrorContext::AttachFile,
                    &err,
                )));
            }
            send_snapshot(controller, ui_tx).await;
        }
        BackendCommand::Submit => {
            let controller = Arc::clone(controller);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                let result = controller.submit().await;
                if let Some(err) = submit_error(&result) {
                    let _ = ui_tx.try_send(UiEvent::Error(err));
                }
                send_snapshot(&controller, &ui_tx).await;
            });
        }
        BackendCommand::ChangePage(page) => {
            controller.change_page(page).await;
            send_snapshot(controller, ui_tx).await;
        }
    }
}

/// Maps a submit result onto the alert to show, keeping the category the
/// controller already knows.
fn submit_error(result: &Result<SubmitOutcome, SubmitRejection>) -> Option<UiError> {
    match result {
        Ok(SubmitOutcome::Uploaded) => None,
        Ok(SubmitOutcome::Failed(reason)) => Some(UiError::new(
            UiErrorCategory::Transport,
            UiErrorContext::Upload,
            reason.clone(),
        )),
        Err(SubmitRejection::InFlight) => {
            tracing::debug!("ignoring submit while upload is in flight");
            None
        }
        Err(rejection @ SubmitRejection::Invalid(_)) => Some(UiError::new(
            UiErrorCategory::Validation,
            UiErrorContext::Upload,
            rejection.to_string(),
        )),
    }
}

/// Relays controller events and refreshes the UI copy of the state after each one,
/// so timed transitions (end of the success window) reach the screen.
fn spawn_event_forwarder(controller: Arc<ReelController>, ui_tx: Sender<UiEvent>) {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "ui event forwarder lagged");
                    send_snapshot(&controller, &ui_tx).await;
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let refresh = matches!(
                event,
                ControllerEvent::UploadStarted | ControllerEvent::CelebrationEnded
            );
            let _ = ui_tx.try_send(UiEvent::Controller(event));
            if refresh {
                send_snapshot(&controller, &ui_tx).await;
            }
        }
    });
}

async fn send_snapshot(controller: &ReelController, ui_tx: &Sender<UiEvent>) {
    let snapshot = controller.snapshot().await;
    let _ = ui_tx.try_send(UiEvent::Snapshot(Box::new(snapshot)));
}

#[cfg(test)]
mod tests {
    use std::{env, fs, time::SystemTime};

    use shared::error::{MissingField, ValidationError};

    use super::*;

    #[test]
    fn server_rejection_mentioning_required_keeps_the_upload_prefix() {
        let result = Ok(SubmitOutcome::Failed(
            "request failed with status 422: caption is required".into(),
        ));
        let err = submit_error(&result).expect("alert");
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(
            err.alert_text(),
            "Failed to upload reel reason: request failed with status 422: caption is required"
        );
    }

    #[test]
    fn local_validation_is_shown_without_prefix() {
        let result = Err(SubmitRejection::Invalid(ValidationError {
            missing: vec![MissingField::Caption],
        }));
        let err = submit_error(&result).expect("alert");
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert!(err.alert_text().starts_with("All fields are required"));
    }

    #[test]
    fn accepted_or_in_flight_submits_raise_no_alert() {
        assert!(submit_error(&Ok(SubmitOutcome::Uploaded)).is_none());
        assert!(submit_error(&Err(SubmitRejection::InFlight)).is_none());
    }

    #[tokio::test]
    async fn attached_file_is_in_the_draft_before_the_next_command() {
        let suffix = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let temp_root = env::temp_dir().join(format!("reel_desktop_attach_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");
        let path = temp_root.join("closing-bell.mp4");
        fs::write(&path, vec![7u8; 4096]).expect("write video");

        let settings = ClientSettings::default();
        let api = HttpReelsApi::new(&settings).expect("client");
        let controller = Arc::new(ReelController::new(Arc::new(api), &settings));
        let (ui_tx, ui_rx) = crossbeam_channel::unbounded();

        handle_command(&controller, &ui_tx, BackendCommand::AttachFile(path)).await;

        let state = controller.snapshot().await;
        assert_eq!(state.draft.file_name(), Some("closing-bell.mp4"));
        assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::Snapshot(_))));
        fs::remove_dir_all(temp_root).expect("cleanup");
    }
}
