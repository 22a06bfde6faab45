//! # Canvas View
//!
//! A mounted preview canvas: owns a [`FrameRenderer`] and keeps exactly one frame request
//! outstanding while animating.
//!
//! ```text
//! Idle --mount--> Animating --unmount--> Disposed
//!                   |   ^
//!                   +---+ on_frame / set_inputs (cancel + re-request)
//! ```

use crate::errors::RenderError;
use crate::systems::renderer::{FramePlan, FrameRenderer, RenderInputs, RendererConfig};
use crate::systems::scheduler::{FrameRequest, FrameScheduler};
use tracing::{debug, info};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Animating { request: FrameRequest },
    Disposed,
}

#[derive(Debug)]
pub struct CanvasView {
    renderer: FrameRenderer,
    inputs: RenderInputs,
    state: LoopState,
    /// Timestamp of the first frame since the clock was last reset.
    clock_origin: Option<f64>,
}

impl CanvasView {
    pub fn new(inputs: RenderInputs, config: RendererConfig) -> Self {
        Self {
            renderer: FrameRenderer::new(config),
            inputs,
            state: LoopState::Idle,
            clock_origin: None,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn inputs(&self) -> &RenderInputs {
        &self.inputs
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut FrameRenderer {
        &mut self.renderer
    }

    /// Starts the loop. Mounting twice or after disposal does nothing.
    pub fn mount(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state != LoopState::Idle {
            return;
        }
        let request = scheduler.request_frame();
        self.state = LoopState::Animating { request };
        info!(
            width = self.inputs.canvas_size.width,
            height = self.inputs.canvas_size.height,
            "canvas mounted"
        );
    }

    /// Replaces the render inputs and restarts the outstanding frame request.
    ///
    /// The animation clock restarts on gradient, canvas size, or reduced-motion changes; an
    /// effects-only change keeps it running.
    pub fn set_inputs(&mut self, inputs: RenderInputs, scheduler: &mut dyn FrameScheduler) {
        if self.state == LoopState::Disposed {
            return;
        }
        if self.inputs.resets_clock(&inputs) {
            debug!("inputs changed; restarting animation clock");
            self.clock_origin = None;
        }
        self.inputs = inputs;

        if let LoopState::Animating { request } = self.state {
            scheduler.cancel_frame(request);
            let request = scheduler.request_frame();
            self.state = LoopState::Animating { request };
        }
    }

    /// Handles a fired frame request at `now_secs`.
    ///
    /// Stale requests (superseded or delivered after unmount) are ignored. The next frame is
    /// requested before drawing so a draw error never stops the loop.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        now_secs: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<Option<FramePlan>, RenderError> {
        match self.state {
            LoopState::Animating { request: current } if current == request => {}
            _ => return Ok(None),
        }

        let next = scheduler.request_frame();
        self.state = LoopState::Animating { request: next };

        let origin = *self.clock_origin.get_or_insert(now_secs);
        let elapsed = (now_secs - origin).max(0.0);
        self.renderer.draw(&self.inputs, elapsed)
    }

    /// Seconds since the clock origin, or 0 before the first frame.
    pub fn elapsed(&self, now_secs: f64) -> f64 {
        self.clock_origin
            .map(|origin| (now_secs - origin).max(0.0))
            .unwrap_or(0.0)
    }

    /// Cancels the outstanding request and disposes the view.
    pub fn unmount(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let LoopState::Animating { request } = self.state {
            scheduler.cancel_frame(request);
        }
        if self.state != LoopState::Disposed {
            info!(frames = self.renderer.stats().frames, "canvas unmounted");
        }
        self.state = LoopState::Disposed;
    }
}
