use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use uuid::Uuid;

pub use tadabbur_types::FacingMode;

use crate::error::CameraError;
use crate::frame::FrameSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Prompt,
    Granted,
    Denied,
}

/// Requested stream shape; backends treat the resolution as a preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One track of a stream; clones share the same live flag
#[derive(Debug, Clone)]
pub struct MediaTrack {
    pub kind: TrackKind,
    pub label: String,
    live: Arc<AtomicBool>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Live video source handed out by a camera backend
#[derive(Clone)]
pub struct MediaStream {
    id: Uuid,
    tracks: Vec<MediaTrack>,
    source: Arc<dyn FrameSource>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>, source: Arc<dyn FrameSource>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tracks,
            source,
        }
    }

    /// Single video track stream, the shape every camera backend produces
    pub fn video(label: impl Into<String>, source: Arc<dyn FrameSource>) -> Self {
        Self::new(vec![MediaTrack::new(TrackKind::Video, label)], source)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Video)
    }

    pub fn active_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }

    pub fn is_active(&self) -> bool {
        self.active_tracks() > 0
    }

    /// Stop every track; stopping twice is harmless
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    pub fn source(&self) -> &Arc<dyn FrameSource> {
        &self.source
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks)
            .finish()
    }
}

/// Platform camera access
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Whether `query_permission` is available on this platform
    fn supports_permission_query(&self) -> bool {
        false
    }

    /// Current permission state plus a feed of later changes
    async fn query_permission(&self) -> Result<watch::Receiver<PermissionState>, CameraError> {
        Err(CameraError::Unsupported)
    }

    /// Acquire a new stream matching the constraints
    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaStream, CameraError>;
}

/// Owns the single camera stream of a workflow instance
pub struct CameraManager<B: CameraBackend> {
    backend: B,
    constraints: MediaConstraints,
    stream: Option<MediaStream>,
    permission: PermissionState,
    permission_rx: Option<watch::Receiver<PermissionState>>,
}

impl<B: CameraBackend> CameraManager<B> {
    pub fn new(backend: B, constraints: MediaConstraints) -> Self {
        Self {
            backend,
            constraints,
            stream: None,
            permission: PermissionState::Prompt,
            permission_rx: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mount-time check: subscribe to permission changes and open right
    /// away when access was granted earlier. Without a usable permission
    /// query the stream is requested directly.
    pub async fn initialize(&mut self) -> Result<Option<&MediaStream>, CameraError> {
        if self.backend.supports_permission_query() {
            match self.backend.query_permission().await {
                Ok(rx) => {
                    let state = *rx.borrow();
                    tracing::info!("Camera permission state: {:?}", state);
                    self.permission = state;
                    self.permission_rx = Some(rx);

                    if state != PermissionState::Granted {
                        return Ok(None);
                    }
                    tracing::info!("Camera permission already granted, opening camera");
                }
                Err(e) => {
                    tracing::warn!("Permission check failed, opening camera directly: {}", e);
                }
            }
        }

        self.open().await.map(Some)
    }

    /// Release any held stream, then request a fresh one
    pub async fn open(&mut self) -> Result<&MediaStream, CameraError> {
        self.close();

        tracing::info!("Initializing camera...");
        match self.backend.open(&self.constraints).await {
            Ok(stream) => {
                tracing::info!(
                    stream = %stream.id(),
                    tracks = stream.tracks().len(),
                    "Camera stream obtained"
                );
                self.permission = PermissionState::Granted;
                Ok(&*self.stream.insert(stream))
            }
            Err(e) => {
                tracing::error!("Camera initialization error: {}", e);
                if e == CameraError::PermissionDenied {
                    self.permission = PermissionState::Denied;
                }
                Err(e)
            }
        }
    }

    /// Stop every track of the held stream
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            tracing::debug!(stream = %stream.id(), "Stopping camera stream");
            stream.stop();
        }
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref().filter(|s| s.is_active())
    }

    pub fn is_open(&self) -> bool {
        self.stream().is_some()
    }

    /// Latest known permission state, folding in backend change notifications
    pub fn permission_state(&mut self) -> PermissionState {
        if let Some(rx) = self.permission_rx.as_mut()
            && rx.has_changed().unwrap_or(false)
        {
            let state = *rx.borrow_and_update();
            tracing::info!("Camera permission changed to: {:?}", state);
            self.permission = state;
        }
        self.permission
    }
}

impl<B: CameraBackend> Drop for CameraManager<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::frame::VideoFrame;
    use crate::error::CaptureError;

    struct BlankSource;

    impl FrameSource for BlankSource {
        fn current_frame(&self) -> Result<VideoFrame, CaptureError> {
            Ok(VideoFrame::filled(4, 4, [0, 0, 0, 255]))
        }
    }

    struct FakeBackend {
        permission: Option<watch::Receiver<PermissionState>>,
        open_result: Mutex<Vec<Result<(), CameraError>>>,
        opened: Mutex<Vec<MediaStream>>,
    }

    impl FakeBackend {
        fn new(permission: Option<watch::Receiver<PermissionState>>) -> Self {
            Self {
                permission,
                open_result: Mutex::new(vec![]),
                opened: Mutex::new(vec![]),
            }
        }

        fn fail_next(&self, err: CameraError) {
            self.open_result.lock().unwrap().push(Err(err));
        }
    }

    #[async_trait::async_trait]
    impl CameraBackend for FakeBackend {
        fn supports_permission_query(&self) -> bool {
            self.permission.is_some()
        }

        async fn query_permission(
            &self,
        ) -> Result<watch::Receiver<PermissionState>, CameraError> {
            self.permission.clone().ok_or(CameraError::Unsupported)
        }

        async fn open(&self, _constraints: &MediaConstraints) -> Result<MediaStream, CameraError> {
            if let Some(Err(e)) = self.open_result.lock().unwrap().pop() {
                return Err(e);
            }
            let stream = MediaStream::video("fake", Arc::new(BlankSource));
            self.opened.lock().unwrap().push(stream.clone());
            Ok(stream)
        }
    }

    #[tokio::test]
    async fn test_close_stops_all_tracks_and_is_idempotent() {
        let mut manager = CameraManager::new(FakeBackend::new(None), MediaConstraints::default());
        let held = manager.open().await.unwrap().clone();
        assert_eq!(held.active_tracks(), 1);

        manager.close();
        assert_eq!(held.active_tracks(), 0);
        manager.close();
        assert_eq!(held.active_tracks(), 0);
        assert!(!manager.is_open());
    }

    #[tokio::test]
    async fn test_reopen_releases_previous_stream() {
        let mut manager = CameraManager::new(FakeBackend::new(None), MediaConstraints::default());
        let first = manager.open().await.unwrap().clone();
        let second = manager.open().await.unwrap().clone();

        assert_eq!(first.active_tracks(), 0);
        assert_eq!(second.active_tracks(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let held = {
            let mut manager =
                CameraManager::new(FakeBackend::new(None), MediaConstraints::default());
            manager.open().await.unwrap().clone()
        };
        assert_eq!(held.active_tracks(), 0);
    }

    #[tokio::test]
    async fn test_initialize_auto_opens_when_granted() {
        let (_tx, rx) = watch::channel(PermissionState::Granted);
        let mut manager =
            CameraManager::new(FakeBackend::new(Some(rx)), MediaConstraints::default());

        let stream = manager.initialize().await.unwrap();
        assert!(stream.is_some());
        assert!(manager.is_open());
    }

    #[tokio::test]
    async fn test_initialize_waits_when_prompt() {
        let (tx, rx) = watch::channel(PermissionState::Prompt);
        let mut manager =
            CameraManager::new(FakeBackend::new(Some(rx)), MediaConstraints::default());

        assert!(manager.initialize().await.unwrap().is_none());
        assert!(!manager.is_open());
        assert_eq!(manager.permission_state(), PermissionState::Prompt);

        tx.send(PermissionState::Denied).unwrap();
        assert_eq!(manager.permission_state(), PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_initialize_without_query_opens_directly() {
        let mut manager = CameraManager::new(FakeBackend::new(None), MediaConstraints::default());
        assert!(manager.initialize().await.unwrap().is_some());
        assert_eq!(manager.permission_state(), PermissionState::Granted);
    }

    #[tokio::test]
    async fn test_denied_open_records_permission() {
        let backend = FakeBackend::new(None);
        backend.fail_next(CameraError::PermissionDenied);
        let mut manager = CameraManager::new(backend, MediaConstraints::default());

        let err = manager.open().await.unwrap_err();
        assert_eq!(err, CameraError::PermissionDenied);
        assert_eq!(manager.permission_state(), PermissionState::Denied);
        assert!(!manager.is_open());
    }
}
