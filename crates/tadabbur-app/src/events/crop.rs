use anyhow::Context;
use kanal::AsyncSender;
use tadabbur_capture::CameraBackend;
use tadabbur_core::{CaptureWorkflow, ProcessingCompletion};
use tadabbur_types::{AppEvent, CropRect, DisplaySize, PreviewStage};

use super::{dispatch, preview, report_failure, report_outcome, report_state};

pub async fn handle_display_size<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    size: Option<DisplaySize>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.set_display_size(size);
    report_outcome(workflow, outcome, app_to_ui_tx).await
}

pub async fn handle_update_crop<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    rect: CropRect,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let outcome = workflow.update_crop(rect);
    report_outcome(workflow, outcome, app_to_ui_tx).await
}

pub async fn handle_save_crop<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    done_tx: &AsyncSender<ProcessingCompletion>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let job = match workflow.prepare_crop() {
        Ok(job) => job,
        Err(e) => return report_failure(workflow, &e, app_to_ui_tx).await,
    };

    let outcome = tokio::task::spawn_blocking(move || job.run())
        .await
        .context("crop task failed")?;

    let cropped = outcome
        .region()
        .and_then(|_| preview(PreviewStage::Cropped, outcome.image()));

    match workflow.submit_crop(outcome) {
        Ok(ticket) => {
            if let Some(cropped) = cropped {
                app_to_ui_tx.send(AppEvent::ShowImage(cropped)).await?;
            }
            dispatch(ticket, done_tx);
            report_state(workflow, app_to_ui_tx).await
        }
        Err(e) => report_failure(workflow, &e, app_to_ui_tx).await,
    }
}
