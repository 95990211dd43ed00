use std::sync::Arc;

use tadabbur_capture::{
    CameraBackend, CameraError, CameraManager, CaptureError, CropEngine, CropOutcome,
    FrameCapturer, MediaStream, PermissionState,
};
use tadabbur_client::{ExtractedContent, ProcessError, ProcessedResult, ProcessingApi};
use tadabbur_types::{
    CropRect, DisplaySize, ErrorKind, ErrorNotice, ImageDataUri, Language, PixelRect, RetryTarget,
    ScanResult, StateKind,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::state::{Submission, WorkflowState};

/// A request the workflow is waiting on, stamped with the generation it belongs to
pub struct ProcessingTicket {
    session: Uuid,
    generation: u64,
    submission: Submission,
    api: Arc<dyn ProcessingApi>,
}

impl ProcessingTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Perform the request. The ticket owns everything it needs so it can be spawned.
    pub async fn run(self) -> ProcessingCompletion {
        debug!(session = %self.session, generation = self.generation, "Processing request started");
        let outcome = match &self.submission {
            Submission::Image(image) => self.api.submit_image(image).await,
            Submission::Text { text, language } => self.api.submit_text(text, *language).await,
        };
        ProcessingCompletion {
            generation: self.generation,
            outcome,
        }
    }
}

impl std::fmt::Debug for ProcessingTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingTicket")
            .field("session", &self.session)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ProcessingCompletion {
    pub generation: u64,
    pub outcome: Result<ProcessedResult, ProcessError>,
}

/// Whether a completion changed the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated(StateKind),
    Stale,
}

/// Frame grab detached from the workflow, for running off the event loop
pub struct CaptureJob {
    capturer: FrameCapturer,
    stream: MediaStream,
}

impl CaptureJob {
    pub fn run(self) -> Result<ImageDataUri, CaptureError> {
        self.capturer.capture(&self.stream)
    }
}

/// Crop detached from the workflow, for running off the event loop
pub struct CropJob {
    engine: CropEngine,
    source: ImageDataUri,
    rect: CropRect,
    displayed: Option<DisplaySize>,
}

impl CropJob {
    pub fn run(self) -> CropOutcome {
        self.engine.crop(&self.source, self.rect, self.displayed)
    }
}

/// Drives one capture session: camera, preview, crop, processing and result
pub struct CaptureWorkflow<B: CameraBackend> {
    session: Uuid,
    camera: CameraManager<B>,
    api: Arc<dyn ProcessingApi>,
    capturer: FrameCapturer,
    cropper: CropEngine,
    language: Language,
    state: WorkflowState,
    generation: u64,
    in_flight: Option<u64>,
    last_crop: Option<PixelRect>,
    permission: PermissionState,
}

impl<B: CameraBackend> CaptureWorkflow<B> {
    pub fn new(camera: CameraManager<B>, api: Arc<dyn ProcessingApi>) -> Self {
        Self {
            session: Uuid::new_v4(),
            camera,
            api,
            capturer: FrameCapturer::default(),
            cropper: CropEngine::default(),
            language: Language::default(),
            state: WorkflowState::Idle,
            generation: 0,
            in_flight: None,
            last_crop: None,
            permission: PermissionState::Prompt,
        }
    }

    pub fn with_capturer(mut self, capturer: FrameCapturer) -> Self {
        self.capturer = capturer;
        self
    }

    pub fn with_crop_engine(mut self, cropper: CropEngine) -> Self {
        self.cropper = cropper;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn camera(&self) -> &CameraManager<B> {
        &self.camera
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Pixel rectangle used by the most recent successful crop
    pub fn last_crop_region(&self) -> Option<PixelRect> {
        self.last_crop
    }

    fn reject(&self, action: &'static str) -> WorkflowError {
        let state = self.kind();
        warn!(session = %self.session, %state, action, "Rejected action");
        WorkflowError::InvalidTransition { state, action }
    }

    fn transition(&mut self, next: WorkflowState) {
        let from = self.kind();
        self.state = next;
        info!(session = %self.session, %from, to = %self.kind(), "Workflow transition");
    }

    /// Forget any in-flight request so its completion is ignored
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(stale) = self.in_flight.take() {
            debug!(session = %self.session, stale, "Dropping interest in in-flight request");
        }
    }

    fn fail_camera(&mut self, err: CameraError) -> WorkflowError {
        self.camera.close();
        self.transition(WorkflowState::Error(ErrorNotice::new(
            err.kind(),
            err.to_string(),
            RetryTarget::Idle,
        )));
        WorkflowError::Camera(err)
    }

    async fn open_camera(&mut self) -> Result<(), WorkflowError> {
        let opened = self.camera.open().await.map(|_| ());
        self.permission = self.camera.permission_state();
        match opened {
            Ok(_) => {
                self.transition(WorkflowState::CameraActive);
                Ok(())
            }
            Err(e) => Err(self.fail_camera(e)),
        }
    }

    /// Mount-time camera check. Opens the camera when permission was
    /// already granted, otherwise stays idle until `start_camera`.
    pub async fn mount(&mut self) -> Result<StateKind, WorkflowError> {
        if !matches!(self.state, WorkflowState::Idle) {
            return Err(self.reject("mount"));
        }

        let opened = self.camera.initialize().await.map(|stream| stream.is_some());
        self.permission = self.camera.permission_state();
        match opened {
            Ok(true) => self.transition(WorkflowState::CameraActive),
            Ok(false) if self.permission == PermissionState::Denied => {
                let err = CameraError::PermissionDenied;
                self.transition(WorkflowState::Error(ErrorNotice::new(
                    err.kind(),
                    err.to_string(),
                    RetryTarget::Idle,
                )));
            }
            Ok(false) => debug!(session = %self.session, "Camera waiting for permission"),
            Err(e) => return Err(self.fail_camera(e)),
        }
        Ok(self.kind())
    }

    /// Fold in permission changes; a fresh grant while idle opens the camera
    pub async fn refresh_permission(&mut self) -> Result<PermissionState, WorkflowError> {
        let permission = self.camera.permission_state();
        let previous = std::mem::replace(&mut self.permission, permission);
        if permission == PermissionState::Granted
            && previous != PermissionState::Granted
            && matches!(self.state, WorkflowState::Idle)
            && !self.camera.is_open()
        {
            info!(session = %self.session, "Camera permission granted, opening camera");
            self.open_camera().await?;
        }
        Ok(permission)
    }

    pub async fn start_camera(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.state, WorkflowState::Idle) {
            return Err(self.reject("start camera"));
        }
        self.open_camera().await
    }

    /// Detach the frame grab so it can run elsewhere; finish with `finish_capture`
    pub fn prepare_capture(&self) -> Result<CaptureJob, WorkflowError> {
        if !matches!(self.state, WorkflowState::CameraActive) {
            return Err(self.reject("capture"));
        }
        let stream = self.camera.stream().ok_or(CaptureError::NoActiveStream)?;
        Ok(CaptureJob {
            capturer: self.capturer.clone(),
            stream: stream.clone(),
        })
    }

    pub fn finish_capture(
        &mut self,
        captured: Result<ImageDataUri, CaptureError>,
    ) -> Result<&ImageDataUri, WorkflowError> {
        if !matches!(self.state, WorkflowState::CameraActive) {
            return Err(self.reject("capture"));
        }

        self.camera.close();
        self.invalidate();

        match captured {
            Ok(captured) => {
                self.transition(WorkflowState::Previewing { captured });
                self.state
                    .captured()
                    .ok_or(WorkflowError::Capture(CaptureError::NoActiveStream))
            }
            Err(e) => {
                self.transition(WorkflowState::Error(ErrorNotice::new(
                    e.kind(),
                    e.to_string(),
                    RetryTarget::CameraActive,
                )));
                Err(WorkflowError::Capture(e))
            }
        }
    }

    /// Grab the current frame and stop the camera
    pub fn capture(&mut self) -> Result<&ImageDataUri, WorkflowError> {
        let job = self.prepare_capture()?;
        let captured = job.run();
        self.finish_capture(captured)
    }

    pub fn confirm_preview(&mut self) -> Result<(), WorkflowError> {
        let WorkflowState::Previewing { captured } = &self.state else {
            return Err(self.reject("confirm preview"));
        };
        let captured = captured.clone();
        self.transition(WorkflowState::Cropping {
            captured,
            rect: None,
            displayed: None,
        });
        Ok(())
    }

    /// Throw away the current image or request and reopen the camera
    pub async fn retake(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Previewing { .. }
            | WorkflowState::Cropping { .. }
            | WorkflowState::Processing { .. } => {}
            _ => return Err(self.reject("retake")),
        }
        self.invalidate();
        self.last_crop = None;
        self.open_camera().await
    }

    pub fn update_crop(&mut self, new_rect: CropRect) -> Result<(), WorkflowError> {
        if let WorkflowState::Cropping { rect, .. } = &mut self.state {
            *rect = Some(new_rect);
            return Ok(());
        }
        Err(self.reject("update crop"))
    }

    /// Record the on-screen size of the preview; `None` when it is not painted
    pub fn set_display_size(&mut self, size: Option<DisplaySize>) -> Result<(), WorkflowError> {
        if let WorkflowState::Cropping { displayed, .. } = &mut self.state {
            *displayed = size;
            return Ok(());
        }
        Err(self.reject("resize preview"))
    }

    pub fn can_save_crop(&self) -> bool {
        matches!(
            &self.state,
            WorkflowState::Cropping { rect: Some(rect), .. } if rect.is_valid()
        )
    }

    /// Detach the crop so it can run elsewhere; finish with `submit_crop`
    pub fn prepare_crop(&self) -> Result<CropJob, WorkflowError> {
        let WorkflowState::Cropping {
            captured,
            rect,
            displayed,
        } = &self.state
        else {
            return Err(self.reject("save crop"));
        };
        let rect = rect.filter(CropRect::is_valid).ok_or(WorkflowError::EmptyCrop)?;

        Ok(CropJob {
            engine: self.cropper.clone(),
            source: captured.clone(),
            rect,
            displayed: *displayed,
        })
    }

    pub fn submit_crop(&mut self, outcome: CropOutcome) -> Result<ProcessingTicket, WorkflowError> {
        if !matches!(self.state, WorkflowState::Cropping { .. }) {
            return Err(self.reject("save crop"));
        }

        self.last_crop = outcome.region();
        if let CropOutcome::Fallback { reason, .. } = &outcome {
            warn!(
                session = %self.session,
                kind = ?ErrorKind::CropFallback,
                ?reason,
                "Submitting uncropped image"
            );
        }

        let language = self.language;
        Ok(self.begin_processing(Submission::Image(outcome.into_image()), language))
    }

    /// Crop the captured image to the selection and hand it off for processing
    pub fn save_crop(&mut self) -> Result<ProcessingTicket, WorkflowError> {
        let job = self.prepare_crop()?;
        let outcome = job.run();
        self.submit_crop(outcome)
    }

    /// Manual entry path: process typed text instead of a photo
    pub fn submit_text(
        &mut self,
        text: &str,
        language: Language,
    ) -> Result<ProcessingTicket, WorkflowError> {
        if !matches!(self.state, WorkflowState::Idle) {
            return Err(self.reject("submit text"));
        }

        let text = DefaultPreprocessor.process(text);
        if text.is_empty() {
            return Err(WorkflowError::EmptyText);
        }

        self.language = language;
        Ok(self.begin_processing(Submission::Text { text, language }, language))
    }

    fn begin_processing(&mut self, submission: Submission, language: Language) -> ProcessingTicket {
        self.invalidate();
        self.in_flight = Some(self.generation);
        let ticket = ProcessingTicket {
            session: self.session,
            generation: self.generation,
            submission: submission.clone(),
            api: self.api.clone(),
        };
        self.transition(WorkflowState::Processing {
            submission,
            language,
        });
        ticket
    }

    /// Apply a finished request. Completions from an older generation are ignored.
    pub fn complete(&mut self, completion: ProcessingCompletion) -> Applied {
        if self.in_flight != Some(completion.generation) {
            debug!(
                session = %self.session,
                generation = completion.generation,
                current = self.generation,
                "Discarding stale processing result"
            );
            return Applied::Stale;
        }
        self.in_flight = None;

        let WorkflowState::Processing {
            submission,
            language,
        } = &self.state
        else {
            return Applied::Stale;
        };
        let language = *language;

        let next = match completion.outcome {
            Ok(result) => {
                let content = ExtractedContent::from_result(&result);
                info!(session = %self.session, ayah_len = content.ayah.len(), "Processing succeeded");
                WorkflowState::Result {
                    content,
                    image: submission.image().cloned(),
                    language,
                }
            }
            Err(e) => {
                warn!(session = %self.session, "Processing failed: {}", e);
                let retry = match submission {
                    Submission::Image(_) => RetryTarget::CameraActive,
                    Submission::Text { .. } => RetryTarget::Idle,
                };
                WorkflowState::Error(ErrorNotice::new(e.kind(), e.to_string(), retry))
            }
        };

        self.transition(next);
        Applied::Updated(self.kind())
    }

    /// Run a ticket to completion inline and apply it
    pub async fn process(&mut self, ticket: ProcessingTicket) -> Applied {
        let completion = ticket.run().await;
        self.complete(completion)
    }

    /// Accept the result, handing the results view its payload
    pub fn accept_result(&mut self) -> Result<ScanResult, WorkflowError> {
        let WorkflowState::Result {
            content,
            image,
            language,
        } = &self.state
        else {
            return Err(self.reject("accept result"));
        };

        let result = ScanResult {
            ayah: content.ayah.clone(),
            translation: content.translation.clone(),
            tafsir: content.tafsir.clone(),
            language: *language,
            image: image.clone(),
        };
        self.transition(WorkflowState::Idle);
        Ok(result)
    }

    pub fn reject_result(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.state, WorkflowState::Result { .. }) {
            return Err(self.reject("reject result"));
        }
        self.transition(WorkflowState::Idle);
        Ok(())
    }

    /// Back to idle from anywhere, releasing the camera
    pub fn reset(&mut self) {
        self.camera.close();
        self.invalidate();
        self.last_crop = None;
        self.transition(WorkflowState::Idle);
    }

    pub async fn retry(&mut self) -> Result<(), WorkflowError> {
        let Some(notice) = self.state.error() else {
            return Err(self.reject("retry"));
        };

        let target = notice.retry;
        match target {
            RetryTarget::Idle => {
                self.transition(WorkflowState::Idle);
                Ok(())
            }
            RetryTarget::CameraActive => self.open_camera().await,
        }
    }
}
