//! Adapters binding the collaborators' callback interfaces to the playback
//! core.
//!
//! Both adapters hold only a weak reference to the controller, so a sink or
//! decoder that outlives it never keeps it alive.

use crate::controller::TrackLifecycleController;
use crate::delivery::DeliveryPipeline;
use crate::flow_control::FlowControlGate;
use crate::seek::SeekCoordinator;
use bridge_traits::{AudioChunk, DecoderEventHandler, IngestionHandler};
use std::sync::Weak;
use tracing::{debug, trace};

/// Sink-side callbacks registered with every `configure_ingestion` call.
pub struct IngestionCallbacks {
    gate: FlowControlGate,
    seek: SeekCoordinator,
    controller: Weak<TrackLifecycleController>,
}

impl IngestionCallbacks {
    pub(crate) fn new(
        gate: FlowControlGate,
        seek: SeekCoordinator,
        controller: Weak<TrackLifecycleController>,
    ) -> Self {
        Self {
            gate,
            seek,
            controller,
        }
    }
}

impl IngestionHandler for IngestionCallbacks {
    fn need_data(&self, length_hint: u32) {
        trace!(length_hint, "Sink needs data");
        self.gate.open();
    }

    fn enough_data(&self) {
        trace!("Sink has enough data");
        self.gate.close();
    }

    fn seek_data(&self, position_ms: u64) -> bool {
        debug!(position_ms, "Sink requested seek");
        self.seek.begin();

        match self.controller.upgrade() {
            Some(controller) => {
                controller.on_seek_request(position_ms);
                true
            }
            None => {
                self.seek.complete();
                false
            }
        }
    }
}

/// Decoder-side events. Audio goes straight to the pipeline; end of track is
/// routed through the controller, as is an end-of-stream that a later
/// delivery finally gets out.
pub(crate) struct DecoderEvents {
    pipeline: DeliveryPipeline,
    controller: Weak<TrackLifecycleController>,
}

impl DecoderEvents {
    pub(crate) fn new(
        pipeline: DeliveryPipeline,
        controller: Weak<TrackLifecycleController>,
    ) -> Self {
        Self {
            pipeline,
            controller,
        }
    }
}

impl DecoderEventHandler for DecoderEvents {
    fn on_audio_chunk(&self, chunk: AudioChunk<'_>) -> usize {
        let delivered = self.pipeline.deliver_chunk(chunk);
        if delivered.stream_ended {
            if let Some(controller) = self.controller.upgrade() {
                controller.complete_end_of_track();
            }
        }
        delivered.frames
    }

    fn on_end_of_track(&self) {
        if let Some(controller) = self.controller.upgrade() {
            controller.on_end_of_track();
        }
    }
}
