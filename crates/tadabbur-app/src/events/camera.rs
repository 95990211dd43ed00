use anyhow::Context;
use kanal::AsyncSender;
use tadabbur_capture::CameraBackend;
use tadabbur_core::CaptureWorkflow;
use tadabbur_types::{AppEvent, PreviewStage, Route};

use super::{navigate, preview, report_failure, report_outcome, report_state};

pub async fn handle_start_camera<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.start_camera().await;
    if outcome.is_ok() {
        navigate(Route::Camera, app_to_ui_tx).await?;
    }
    report_outcome(workflow, outcome, app_to_ui_tx).await
}

/// Grab a frame on the blocking pool; JPEG encoding a full frame is not cheap
pub async fn handle_capture<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let job = match workflow.prepare_capture() {
        Ok(job) => job,
        Err(e) => return report_failure(workflow, &e, app_to_ui_tx).await,
    };

    let captured = tokio::task::spawn_blocking(move || job.run())
        .await
        .context("capture task failed")?;

    match workflow.finish_capture(captured) {
        Ok(image) => {
            tracing::info!("Captured {} byte data URI", image.as_str().len());
            if let Some(preview) = preview(PreviewStage::Captured, image) {
                app_to_ui_tx.send(AppEvent::ShowImage(preview)).await?;
            }
            report_state(workflow, app_to_ui_tx).await
        }
        Err(e) => report_failure(workflow, &e, app_to_ui_tx).await,
    }
}

pub async fn handle_confirm_preview<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.confirm_preview();
    report_outcome(workflow, outcome, app_to_ui_tx).await
}

pub async fn handle_retake<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.retake().await;
    if outcome.is_ok() {
        navigate(Route::Camera, app_to_ui_tx).await?;
    }
    report_outcome(workflow, outcome, app_to_ui_tx).await
}
