use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use kanal::{AsyncReceiver, AsyncSender};
use tadabbur_capture::{CameraManager, MediaConstraints, PermissionState, StillImageCamera};
use tadabbur_client::{ProcessError, ProcessedResult, ProcessingApi};
use tadabbur_config::Config;
use tadabbur_core::CaptureWorkflow;
use tadabbur_types::{
    AppEvent, CropRect, DisplaySize, ErrorKind, ImageDataUri, Language, PreviewStage, Route,
    StateKind, UiEvent,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::state::AppState;

/// Replies in order, echoing typed text once the script runs out.
/// When gated, each call waits for a released permit.
struct ScriptedApi {
    replies: Mutex<VecDeque<Result<ProcessedResult, ProcessError>>>,
    gate: Option<Semaphore>,
}

impl ScriptedApi {
    fn new(replies: Vec<Result<ProcessedResult, ProcessError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            gate: None,
        })
    }

    fn gated(replies: Vec<Result<ProcessedResult, ProcessError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            gate: Some(Semaphore::new(0)),
        })
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    async fn reply(&self, echo: Option<&str>) -> Result<ProcessedResult, ProcessError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let scripted = self.replies.lock().unwrap().pop_front();
        match (scripted, echo) {
            (Some(reply), _) => reply,
            (None, Some(text)) => reply(text, "echo"),
            (None, None) => Err(ProcessError::Unreachable("no scripted reply".into())),
        }
    }
}

#[async_trait::async_trait]
impl ProcessingApi for ScriptedApi {
    async fn submit_image(&self, _image: &ImageDataUri) -> Result<ProcessedResult, ProcessError> {
        self.reply(None).await
    }

    async fn submit_text(&self, text: &str, _language: Language) -> Result<ProcessedResult, ProcessError> {
        self.reply(Some(text)).await
    }
}

fn reply(text: &str, translation: &str) -> Result<ProcessedResult, ProcessError> {
    Ok(ProcessedResult {
        text: text.to_string(),
        translation: Some(translation.to_string()),
        tafsir: None,
    })
}

struct Harness {
    state: Arc<AppState>,
    to_app: AsyncSender<AppEvent>,
    from_app: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(camera: StillImageCamera, api: Arc<ScriptedApi>) -> Self {
        let state = Arc::new(AppState::new(Config::default()));
        let (to_app, app_rx) = kanal::bounded_async(16);
        let (app_tx, from_app) = kanal::bounded_async(64);
        let cancel = CancellationToken::new();

        let workflow =
            CaptureWorkflow::new(CameraManager::new(camera, MediaConstraints::default()), api);
        let handle = tokio::spawn(event_loop(
            state.clone(),
            workflow,
            app_rx,
            app_tx,
            cancel.clone(),
        ));

        Self {
            state,
            to_app,
            from_app,
            cancel,
            handle,
        }
    }

    async fn send(&self, event: UiEvent) {
        self.to_app.send(AppEvent::UiEvent(event)).await.unwrap();
    }

    /// Next event matching `pred`, skipping others
    async fn expect(&self, what: &str, pred: impl Fn(&AppEvent) -> bool) -> AppEvent {
        let wait = async {
            loop {
                let event = self.from_app.recv().await.expect("event loop hung up");
                if pred(&event) {
                    return event;
                }
            }
        };
        match timeout(Duration::from_secs(5), wait).await {
            Ok(event) => event,
            Err(_) => panic!("Timeout waiting for {what}"),
        }
    }

    async fn expect_state(&self, kind: StateKind) -> String {
        let event = self
            .expect(kind.as_str(), |e| {
                matches!(e, AppEvent::StatusUpdate { state, .. } if *state == kind)
            })
            .await;
        match event {
            AppEvent::StatusUpdate { message, .. } => message,
            _ => unreachable!(),
        }
    }
}

fn page() -> StillImageCamera {
    StillImageCamera::from_image(RgbaImage::from_pixel(900, 1200, Rgba([20, 20, 20, 255])))
}

fn waiting_camera() -> StillImageCamera {
    let camera = page();
    camera.set_permission(PermissionState::Prompt);
    camera
}

#[tokio::test]
async fn test_scan_flow_reaches_results_view() {
    let api = ScriptedApi::new(vec![reply("A", "B")]);
    let app = Harness::start(page(), api);

    app.expect("backend ready", |e| matches!(e, AppEvent::BackendReady)).await;
    app.expect_state(StateKind::CameraActive).await;

    app.send(UiEvent::Capture).await;
    let shown = app
        .expect("captured preview", |e| matches!(e, AppEvent::ShowImage(_)))
        .await;
    let AppEvent::ShowImage(preview) = shown else { unreachable!() };
    assert_eq!(preview.stage, PreviewStage::Captured);
    assert_eq!((preview.width, preview.height), (900, 1200));
    app.expect_state(StateKind::Previewing).await;

    app.send(UiEvent::ConfirmPreview).await;
    app.expect_state(StateKind::Cropping).await;
    app.send(UiEvent::UpdateCrop(CropRect::new(10.0, 10.0, 100.0, 50.0))).await;
    app.expect_state(StateKind::Cropping).await;
    app.send(UiEvent::DisplaySizeChanged(Some(DisplaySize::new(300.0, 400.0)))).await;
    app.expect_state(StateKind::Cropping).await;

    app.send(UiEvent::SaveCrop).await;
    let shown = app
        .expect("cropped preview", |e| matches!(e, AppEvent::ShowImage(_)))
        .await;
    let AppEvent::ShowImage(preview) = shown else { unreachable!() };
    assert_eq!(preview.stage, PreviewStage::Cropped);
    assert_eq!((preview.width, preview.height), (300, 150));

    let message = app.expect_state(StateKind::Result).await;
    assert!(message.contains("A | B"), "got {message}");

    app.send(UiEvent::AcceptResult).await;
    let routed = app
        .expect("results route", |e| matches!(e, AppEvent::Navigate(Route::Results(_))))
        .await;
    let AppEvent::Navigate(Route::Results(result)) = routed else { unreachable!() };
    assert_eq!(result.ayah, "A");
    assert_eq!(result.translation, "B");
    assert!(result.image.is_some());

    app.expect_state(StateKind::Idle).await;
    let cards = app.state.recent_cards(3).await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].ayah, "A");
}

#[tokio::test]
async fn test_rejected_action_keeps_state() {
    let app = Harness::start(waiting_camera(), ScriptedApi::new(vec![]));
    app.expect_state(StateKind::Idle).await;

    app.send(UiEvent::Capture).await;
    let message = app.expect_state(StateKind::Idle).await;
    assert_eq!(message, "cannot capture while idle");

    app.send(UiEvent::SubmitText {
        text: "   ".into(),
        language: Language::English,
    })
    .await;
    let message = app.expect_state(StateKind::Idle).await;
    assert_eq!(message, "no text to process");
}

#[tokio::test]
async fn test_reset_while_processing_ignores_late_reply() {
    let api = ScriptedApi::gated(vec![]);
    let app = Harness::start(waiting_camera(), api.clone());
    app.expect_state(StateKind::Idle).await;

    app.send(UiEvent::SubmitText {
        text: "first".into(),
        language: Language::English,
    })
    .await;
    app.expect("waiting route", |e| matches!(e, AppEvent::Navigate(Route::Waiting { .. })))
        .await;
    app.expect_state(StateKind::Processing).await;

    app.send(UiEvent::Reset).await;
    app.expect_state(StateKind::Idle).await;
    api.release();

    app.send(UiEvent::SubmitText {
        text: "second".into(),
        language: Language::French,
    })
    .await;
    app.expect_state(StateKind::Processing).await;
    api.release();

    let message = app.expect_state(StateKind::Result).await;
    assert!(message.contains("second"), "got {message}");
    assert!(!message.contains("first"), "late reply leaked through: {message}");
}

#[tokio::test]
async fn test_network_failure_offers_retry() {
    let api = ScriptedApi::new(vec![Err(ProcessError::Timeout(10_000))]);
    let app = Harness::start(waiting_camera(), api);
    app.expect_state(StateKind::Idle).await;

    app.send(UiEvent::SubmitText {
        text: "text".into(),
        language: Language::Arabic,
    })
    .await;

    let shown = app
        .expect("error notice", |e| matches!(e, AppEvent::ShowError(_)))
        .await;
    let AppEvent::ShowError(notice) = shown else { unreachable!() };
    assert_eq!(notice.kind, ErrorKind::RequestTimeout);
    app.expect_state(StateKind::Error).await;

    app.send(UiEvent::Retry).await;
    app.expect("home route", |e| matches!(e, AppEvent::Navigate(Route::Home)))
        .await;
    app.expect_state(StateKind::Idle).await;
}

#[tokio::test]
async fn test_denied_camera_surfaces_error() {
    let camera = page();
    camera.set_permission(PermissionState::Denied);
    let app = Harness::start(camera, ScriptedApi::new(vec![]));

    let shown = app
        .expect("error notice", |e| matches!(e, AppEvent::ShowError(_)))
        .await;
    let AppEvent::ShowError(notice) = shown else { unreachable!() };
    assert_eq!(notice.kind, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_close_stops_event_loop() {
    let app = Harness::start(waiting_camera(), ScriptedApi::new(vec![]));
    app.expect("backend ready", |e| matches!(e, AppEvent::BackendReady)).await;

    app.send(UiEvent::Close).await;
    let result = timeout(Duration::from_secs(2), app.handle).await;

    match result {
        Ok(Ok(Ok(()))) => assert!(app.cancel.is_cancelled()),
        Ok(Ok(Err(e))) => panic!("event loop failed: {e}"),
        Ok(Err(e)) => panic!("event loop panicked: {e}"),
        Err(_) => panic!("Timeout - event loop did not stop"),
    }
}
