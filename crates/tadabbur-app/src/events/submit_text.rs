use kanal::AsyncSender;
use tadabbur_capture::CameraBackend;
use tadabbur_core::{CaptureWorkflow, ProcessingCompletion};
use tadabbur_types::{AppEvent, Language, Route};

use super::{dispatch, navigate, report_failure, report_state};

/// Manual entry: typed verse goes straight to processing
pub async fn handle_submit_text<B: CameraBackend>(
    workflow: &mut CaptureWorkflow<B>,
    text: &str,
    language: Language,
    done_tx: &AsyncSender<ProcessingCompletion>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::debug!("TextInput received: '{}' chars", text.len());

    match workflow.submit_text(text, language) {
        Ok(ticket) => {
            dispatch(ticket, done_tx);
            navigate(Route::Waiting { language }, app_to_ui_tx).await?;
            report_state(workflow, app_to_ui_tx).await
        }
        Err(e) => report_failure(workflow, &e, app_to_ui_tx).await,
    }
}
