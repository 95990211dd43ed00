use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use tadabbur_capture::CameraBackend;
use tadabbur_core::{CaptureWorkflow, ProcessingCompletion, ProcessingTicket, WorkflowError, WorkflowState};
use tadabbur_types::{AppEvent, ImageDataUri, ImagePreview, PreviewStage, Route, UiEvent};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod camera;
pub mod crop;
pub mod result;
pub mod submit_text;

use camera::{handle_capture, handle_confirm_preview, handle_retake, handle_start_camera};
use crop::{handle_display_size, handle_save_crop, handle_update_crop};
use result::{handle_accept, handle_completion, handle_reject, handle_reset, handle_retry};
use submit_text::handle_submit_text;

const PERMISSION_POLL: Duration = Duration::from_millis(500);

/// App's main loop. Owns the workflow; finished requests come back through
/// an internal channel so stale ones can be discarded in order.
pub async fn event_loop<B: CameraBackend + 'static>(
    state: Arc<AppState>,
    mut workflow: CaptureWorkflow<B>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (done_tx, done_rx) = kanal::bounded_async::<ProcessingCompletion>(8);

    if let Err(e) = workflow.mount().await {
        tracing::warn!("Camera unavailable at startup: {}", e);
    }
    app_to_ui_tx.send(AppEvent::BackendReady).await?;
    report_state(&workflow, &app_to_ui_tx).await?;

    let mut permission_tick = tokio::time::interval(PERMISSION_POLL);

    tracing::info!(session = %workflow.session(), "Event loop started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => {
                let event = event?;
                if matches!(event, AppEvent::UiEvent(UiEvent::Close)) {
                    tracing::info!("Close requested");
                    cancel.cancel();
                    break;
                }
                handle_events(&state, &mut workflow, &done_tx, &app_to_ui_tx, event).await?;
            }
            completion = done_rx.recv() => {
                handle_completion(&mut workflow, completion?, &app_to_ui_tx).await?;
            }
            _ = permission_tick.tick() => {
                let before = workflow.kind();
                if let Err(e) = workflow.refresh_permission().await {
                    report_failure(&workflow, &e, &app_to_ui_tx).await?;
                } else if workflow.kind() != before {
                    report_state(&workflow, &app_to_ui_tx).await?;
                }
            }
        }
    }

    tracing::info!("Event loop stopped");
    Ok(())
}

async fn handle_events<B: CameraBackend>(
    state: &AppState,
    workflow: &mut CaptureWorkflow<B>,
    done_tx: &AsyncSender<ProcessingCompletion>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    let AppEvent::UiEvent(event) = event else {
        tracing::debug!("Ignoring backend-bound event: {:?}", std::mem::discriminant(&event));
        return Ok(());
    };
    tracing::debug!(state = %workflow.kind(), ?event, "Handling UI event");

    match event {
        UiEvent::StartCamera => handle_start_camera(workflow, app_to_ui_tx).await,
        UiEvent::Capture => handle_capture(workflow, app_to_ui_tx).await,
        UiEvent::ConfirmPreview => handle_confirm_preview(workflow, app_to_ui_tx).await,
        UiEvent::Retake => handle_retake(workflow, app_to_ui_tx).await,
        UiEvent::DisplaySizeChanged(size) => handle_display_size(workflow, size, app_to_ui_tx).await,
        UiEvent::UpdateCrop(rect) => handle_update_crop(workflow, rect, app_to_ui_tx).await,
        UiEvent::SaveCrop => handle_save_crop(workflow, done_tx, app_to_ui_tx).await,
        UiEvent::SubmitText { text, language } => {
            handle_submit_text(workflow, &text, language, done_tx, app_to_ui_tx).await
        }
        UiEvent::AcceptResult => handle_accept(state, workflow, app_to_ui_tx).await,
        UiEvent::RejectResult => handle_reject(workflow, app_to_ui_tx).await,
        UiEvent::Reset => handle_reset(workflow, app_to_ui_tx).await,
        UiEvent::Retry => handle_retry(workflow, app_to_ui_tx).await,
        UiEvent::Status => report_state(workflow, app_to_ui_tx).await,
        UiEvent::Close => Ok(()),
    }
}

/// Run a request off the loop and post its completion back
pub(crate) fn dispatch(ticket: ProcessingTicket, done_tx: &AsyncSender<ProcessingCompletion>) {
    let done_tx = done_tx.clone();
    tracing::debug!(generation = ticket.generation(), "Dispatching processing request");
    tokio::spawn(async move {
        let completion = ticket.run().await;
        if let Err(e) = done_tx.send(completion).await {
            tracing::warn!("Event loop gone before request finished: {}", e);
        }
    });
}

pub(crate) fn status_message(state: &WorkflowState) -> String {
    match state {
        WorkflowState::Idle => "Ready. `camera` to scan an ayah or `text <language> <verse>`".into(),
        WorkflowState::CameraActive => "Camera on. `capture` to take the photo".into(),
        WorkflowState::Previewing { .. } => "Photo taken. `confirm` to crop it or `retake`".into(),
        WorkflowState::Cropping { rect, displayed, .. } => {
            let rect = match rect {
                Some(r) if r.is_valid() => {
                    format!("selection {}x{} at ({}, {})", r.width, r.height, r.x, r.y)
                }
                _ => "no selection yet".to_string(),
            };
            let displayed = match displayed {
                Some(d) => format!("shown at {}x{}", d.width, d.height),
                None => "preview size unknown".to_string(),
            };
            format!("Cropping: {rect}, {displayed}. `crop x y w h`, `display w h`, `save`")
        }
        WorkflowState::Processing { language, .. } => format!("Processing ({language})..."),
        WorkflowState::Result { content, .. } => {
            let translation = if content.translation.is_empty() {
                "(no translation)"
            } else {
                content.translation.as_str()
            };
            format!(
                "Extracted: {} | {}. `accept` to open it or `reject`",
                content.ayah, translation
            )
        }
        WorkflowState::Error(notice) => {
            format!("{} `retry` to continue", notice.kind.user_message())
        }
    }
}

pub(crate) async fn report_state<B: CameraBackend>(
    workflow: &CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if let Some(notice) = workflow.state().error() {
        app_to_ui_tx.send(AppEvent::ShowError(notice.clone())).await?;
    }
    app_to_ui_tx
        .send(AppEvent::StatusUpdate {
            state: workflow.kind(),
            message: status_message(workflow.state()),
        })
        .await?;
    Ok(())
}

/// Surface a failed action. Failures that moved the workflow into its
/// error state show the notice; rejected actions only explain themselves.
pub(crate) async fn report_failure<B: CameraBackend>(
    workflow: &CaptureWorkflow<B>,
    err: &WorkflowError,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    if workflow.state().error().is_some() {
        return report_state(workflow, app_to_ui_tx).await;
    }
    app_to_ui_tx
        .send(AppEvent::StatusUpdate {
            state: workflow.kind(),
            message: err.to_string(),
        })
        .await?;
    Ok(())
}

pub(crate) async fn report_outcome<B: CameraBackend>(
    workflow: &CaptureWorkflow<B>,
    outcome: Result<(), WorkflowError>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match outcome {
        Ok(()) => report_state(workflow, app_to_ui_tx).await,
        Err(e) => report_failure(workflow, &e, app_to_ui_tx).await,
    }
}

pub(crate) async fn navigate(route: Route, app_to_ui_tx: &AsyncSender<AppEvent>) -> anyhow::Result<()> {
    app_to_ui_tx.send(AppEvent::Navigate(route)).await?;
    Ok(())
}

/// Image plus its pixel size, read from the encoded header
pub(crate) fn preview(stage: PreviewStage, image: &ImageDataUri) -> Option<ImagePreview> {
    let bytes = image.decode().ok()?;
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    Some(ImagePreview {
        stage,
        image: image.clone(),
        width,
        height,
    })
}
