//! Shared test doubles for the core-playback integration tests.
//!
//! - `RecordingSink`: records every push and end-of-stream in order, with a
//!   scriptable accept/reject policy and source-switch acknowledgment
//! - `FakeSession`: scripted decoder session that captures the subscribed
//!   event handler so tests can play the decoder thread
//! - `RecordingPlayer`: records transport commands

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    AudioBuffer, AudioChunk, AudioSink, BridgeError, ConnectionState, DecoderEventHandler,
    DecoderPlayer, DecoderSession, IngestionHandler, IngestionReady, PcmFormat, Result,
    TrackHandle, TrackLink, TrackRef,
};
use core_playback::{PlaybackConfig, TrackLifecycleController, SUPPORTED_FORMAT};
use futures::FutureExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

// ============================================================================
// Sink
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Buffer { timestamp: u64, duration: u64 },
    EndOfStream,
}

pub struct RecordingSink {
    accept: AtomicBool,
    pushed: Mutex<Vec<AudioBuffer>>,
    events: Mutex<Vec<SinkEvent>>,
    rejections: AtomicUsize,
    formats: Mutex<Vec<PcmFormat>>,
    metadata: Mutex<Vec<TrackRef>>,
    handler: Mutex<Option<Arc<dyn IngestionHandler>>>,
    deferred_ready: Mutex<Option<oneshot::Receiver<Result<()>>>>,
    seek_on_push: Mutex<Option<u64>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accept: AtomicBool::new(true),
            pushed: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            rejections: AtomicUsize::new(0),
            formats: Mutex::new(Vec::new()),
            metadata: Mutex::new(Vec::new()),
            handler: Mutex::new(None),
            deferred_ready: Mutex::new(None),
            seek_on_push: Mutex::new(None),
        })
    }

    /// Accept or reject subsequent pushes.
    pub fn set_accepting(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    /// Make the next `configure_ingestion` wait until the returned sender
    /// fires. Dropping the sender aborts the switch.
    pub fn defer_ready(&self) -> oneshot::Sender<Result<()>> {
        let (tx, rx) = oneshot::channel();
        *self.deferred_ready.lock() = Some(rx);
        tx
    }

    /// Make the next push request a seek to `position_ms` from inside the
    /// call, then refuse the buffer.
    pub fn seek_during_next_push(&self, position_ms: u64) {
        *self.seek_on_push.lock() = Some(position_ms);
    }

    pub fn pushed(&self) -> Vec<AudioBuffer> {
        self.pushed.lock().clone()
    }

    pub fn pushed_timestamps(&self) -> Vec<u64> {
        self.pushed.lock().iter().map(|b| b.timestamp()).collect()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn end_of_stream_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| **e == SinkEvent::EndOfStream)
            .count()
    }

    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }

    pub fn formats(&self) -> Vec<PcmFormat> {
        self.formats.lock().clone()
    }

    pub fn metadata(&self) -> Vec<TrackRef> {
        self.metadata.lock().clone()
    }

    fn handler(&self) -> Arc<dyn IngestionHandler> {
        self.handler
            .lock()
            .clone()
            .expect("configure_ingestion was never called")
    }

    pub fn need_data(&self) {
        self.handler().need_data(4096);
    }

    pub fn enough_data(&self) {
        self.handler().enough_data();
    }

    pub fn seek_data(&self, position_ms: u64) -> bool {
        self.handler().seek_data(position_ms)
    }
}

impl AudioSink for RecordingSink {
    fn configure_ingestion(
        &self,
        format: PcmFormat,
        handler: Arc<dyn IngestionHandler>,
    ) -> IngestionReady {
        self.formats.lock().push(format);
        *self.handler.lock() = Some(handler);

        match self.deferred_ready.lock().take() {
            Some(rx) => async move {
                rx.await
                    .unwrap_or_else(|_| Err(BridgeError::OperationFailed("source switch dropped".into())))
            }
            .boxed(),
            None => futures::future::ready(Ok(())).boxed(),
        }
    }

    fn push_buffer(&self, buffer: AudioBuffer) -> std::result::Result<(), AudioBuffer> {
        let seek_to = self.seek_on_push.lock().take();
        if let Some(position_ms) = seek_to {
            self.handler().seek_data(position_ms);
            self.rejections.fetch_add(1, Ordering::SeqCst);
            return Err(buffer);
        }
        if !self.accept.load(Ordering::SeqCst) {
            self.rejections.fetch_add(1, Ordering::SeqCst);
            return Err(buffer);
        }
        self.events.lock().push(SinkEvent::Buffer {
            timestamp: buffer.timestamp(),
            duration: buffer.duration(),
        });
        self.pushed.lock().push(buffer);
        Ok(())
    }

    fn push_end_of_stream(&self) {
        self.events.lock().push(SinkEvent::EndOfStream);
    }

    fn set_metadata(&self, track: &TrackRef) {
        self.metadata.lock().push(track.clone());
    }
}

// ============================================================================
// Decoder
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Load(String),
    Play,
    Pause,
    Seek(u64),
    Unload,
}

#[derive(Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
    fail_seek: AtomicBool,
}

impl RecordingPlayer {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().clone()
    }

    pub fn seeks(&self) -> Vec<u64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                PlayerCall::Seek(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &PlayerCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn fail_seeks(&self) {
        self.fail_seek.store(true, Ordering::SeqCst);
    }
}

impl DecoderPlayer for RecordingPlayer {
    fn load(&self, track: &TrackHandle) -> Result<()> {
        self.calls.lock().push(PlayerCall::Load(track.uri.clone()));
        Ok(())
    }

    fn play(&self) -> Result<()> {
        self.calls.lock().push(PlayerCall::Play);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.calls.lock().push(PlayerCall::Pause);
        Ok(())
    }

    fn seek(&self, position_ms: u64) -> Result<()> {
        self.calls.lock().push(PlayerCall::Seek(position_ms));
        if self.fail_seek.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("seek refused".into()));
        }
        Ok(())
    }

    fn unload(&self) -> Result<()> {
        self.calls.lock().push(PlayerCall::Unload);
        Ok(())
    }
}

pub struct FakeSession<P = RecordingPlayer> {
    pub player: P,
    resolve_error: Mutex<Option<BridgeError>>,
    resolved: Mutex<Vec<(String, Duration)>>,
    connection: Mutex<ConnectionState>,
    handler: Mutex<Option<Arc<dyn DecoderEventHandler>>>,
    subscriptions: AtomicUsize,
}

impl FakeSession<RecordingPlayer> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_player(RecordingPlayer::default()))
    }
}

impl<P: DecoderPlayer> FakeSession<P> {
    pub fn with_player(player: P) -> Self {
        Self {
            player,
            resolve_error: Mutex::new(None),
            resolved: Mutex::new(Vec::new()),
            connection: Mutex::new(ConnectionState::LoggedIn),
            handler: Mutex::new(None),
            subscriptions: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `resolve` fail with `error`.
    pub fn fail_resolve(&self, error: BridgeError) {
        *self.resolve_error.lock() = Some(error);
    }

    pub fn set_connection_state(&self, state: ConnectionState) {
        *self.connection.lock() = state;
    }

    pub fn resolved(&self) -> Vec<(String, Duration)> {
        self.resolved.lock().clone()
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    fn handler(&self) -> Arc<dyn DecoderEventHandler> {
        self.handler
            .lock()
            .clone()
            .expect("no decoder event handler subscribed")
    }

    /// Deliver `num_frames` frames of CD-quality audio, as the decoder
    /// thread would.
    pub fn deliver(&self, num_frames: usize) -> usize {
        let data = pcm(num_frames);
        self.handler()
            .on_audio_chunk(AudioChunk::new(SUPPORTED_FORMAT, &data, num_frames))
    }

    /// Deliver the zero-length chunk.
    pub fn deliver_empty(&self) -> usize {
        self.handler()
            .on_audio_chunk(AudioChunk::empty(SUPPORTED_FORMAT))
    }

    pub fn end_of_track(&self) {
        self.handler().on_end_of_track();
    }
}

#[async_trait]
impl<P: DecoderPlayer> DecoderSession for FakeSession<P> {
    async fn resolve(&self, uri: &str, timeout: Duration) -> Result<TrackHandle> {
        self.resolved.lock().push((uri.to_string(), timeout));
        match self.resolve_error.lock().clone() {
            Some(error) => Err(error),
            None => Ok(TrackHandle::new(uri)),
        }
    }

    fn player(&self) -> &dyn DecoderPlayer {
        &self.player
    }

    fn link(&self, uri: &str) -> Result<TrackLink> {
        if uri.starts_with("track:") {
            Ok(TrackLink::new(uri))
        } else {
            Err(BridgeError::NotFound(uri.to_string()))
        }
    }

    fn connection_state(&self) -> ConnectionState {
        *self.connection.lock()
    }

    fn subscribe(&self, handler: Arc<dyn DecoderEventHandler>) {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        *self.handler.lock() = Some(handler);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `num_frames` frames of CD-quality PCM.
pub fn pcm(num_frames: usize) -> Vec<u8> {
    vec![0x11; num_frames * SUPPORTED_FORMAT.bytes_per_frame()]
}

pub fn controller_with<P: DecoderPlayer + 'static>(
    session: Arc<FakeSession<P>>,
    sink: Arc<RecordingSink>,
    config: PlaybackConfig,
) -> Arc<TrackLifecycleController> {
    TrackLifecycleController::new(session, sink, config).expect("valid config")
}

pub struct Harness {
    pub session: Arc<FakeSession>,
    pub sink: Arc<RecordingSink>,
    pub controller: Arc<TrackLifecycleController>,
}

pub fn harness() -> Harness {
    core_runtime::logging::init_test_logging();
    let session = FakeSession::new();
    let sink = RecordingSink::new();
    let controller = controller_with(
        Arc::clone(&session),
        Arc::clone(&sink),
        PlaybackConfig::default(),
    );
    Harness {
        session,
        sink,
        controller,
    }
}

/// Assert that each buffer starts where the previous one ended.
pub fn assert_contiguous(buffers: &[AudioBuffer]) {
    for pair in buffers.windows(2) {
        assert_eq!(
            pair[1].timestamp(),
            pair[0].timestamp() + pair[0].duration(),
            "gap or overlap between buffers"
        );
    }
}
