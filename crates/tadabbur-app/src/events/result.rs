use kanal::AsyncSender;
use tadabbur_capture::CameraBackend;
use tadabbur_core::{Applied, CaptureWorkflow, ProcessingCompletion};
use tadabbur_types::{AppEvent, Route, StateKind};

use super::{navigate, report_failure, report_outcome, report_state};
use crate::state::AppState;

pub async fn handle_completion<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    completion: ProcessingCompletion,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match workflow.complete(completion) {
        Applied::Stale => Ok(()),
        Applied::Updated(_) => report_state(workflow, app_to_ui_tx).await,
    }
}

/// Open the results view and keep the scan for the home screen
pub async fn handle_accept<B: CameraBackend>(
    state: &AppState,
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    match workflow.accept_result() {
        Ok(result) => {
            state.remember(result.clone()).await;
            navigate(Route::Results(result), app_to_ui_tx).await?;
            report_state(workflow, app_to_ui_tx).await
        }
        Err(e) => report_failure(workflow, &e, app_to_ui_tx).await,
    }
}

pub async fn handle_reject<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.reject_result();
    if outcome.is_ok() {
        navigate(Route::Home, app_to_ui_tx).await?;
    }
    report_outcome(workflow, outcome, app_to_ui_tx).await
}

pub async fn handle_reset<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    workflow.reset();
    navigate(Route::Home, app_to_ui_tx).await?;
    report_state(workflow, app_to_ui_tx).await
}

pub async fn handle_retry<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.retry().await;
    if outcome.is_ok() {
        let route = match workflow.kind() {
            StateKind::CameraActive => Route::Camera,
            _ => Route::Home,
        };
        navigate(route, app_to_ui_tx).await?;
    }
    report_outcome(workflow, outcome, app_to_ui_tx).await
}
