// Simulation/render loop state machine

use std::{thread, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    error::DisplayError, field::FieldState, predictor::Predictor, render::Renderer,
    updater::FieldUpdater,
};

/// Control events observed at the top of each loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Quit,
}

/// Non-blocking source of control events. The live window implements
/// this; tests inject a scripted source.
pub trait EventSource {
    fn poll(&mut self) -> Option<ControlEvent>;
}

/// Destination for completed frames.
pub trait FrameSink {
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), DisplayError>;
}

/// Loop lifecycle. `Terminated` is absorbing; there is no resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Quitting,
    Terminated,
}

/// Single-threaded cooperative loop: polls events, advances the field
/// (updater step, then predictor with a fail-safe), draws, presents,
/// then sleeps a fixed interval to cap the frame rate.
pub struct RenderLoop<P: Predictor> {
    state: LoopState,
    field: FieldState,
    updater: FieldUpdater,
    predictor: P,
    renderer: Renderer,
    frame_interval: Duration,
    frames: u64,
}

impl<P: Predictor> RenderLoop<P> {
    pub fn new(
        field: FieldState,
        updater: FieldUpdater,
        predictor: P,
        frame_interval: Duration,
    ) -> Self {
        let renderer = Renderer::new(field.grid_size());

        RenderLoop {
            state: LoopState::Running,
            field,
            updater,
            predictor,
            renderer,
            frame_interval,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn field(&self) -> &FieldState {
        &self.field
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the field by one step: the updater's neighbor mix, then
    /// the predictor. A predictor failure (or a rejected substitution)
    /// keeps the post-mix field and lets the loop continue.
    pub fn advance(&mut self) {
        self.updater.step(&mut self.field);

        match self.predictor.predict(self.field.velocity()) {
            Ok(predicted) => {
                if let Err(err) = self.field.replace_velocity(predicted) {
                    warn!("predictor output rejected, keeping prior field: {err}");
                }
            }
            Err(err) => {
                warn!("predictor failed, keeping prior field: {err}");
            }
        }
    }

    /// Run until the event source signals quit, then tear down the
    /// surface. Consumes the backend so the graphics surface is released
    /// before the loop reports `Terminated`.
    pub fn run<B>(&mut self, mut backend: B) -> Result<(), DisplayError>
    where
        B: EventSource + FrameSink,
    {
        info!("render loop starting");

        while self.state == LoopState::Running {
            if let Some(ControlEvent::Quit) = backend.poll() {
                debug!("quit event observed");
                self.state = LoopState::Quitting;
                continue;
            }

            self.advance();

            self.renderer.clear();
            self.renderer.draw_vectors(&self.field);
            self.renderer.draw_heatmap(&self.field);

            let (width, height) = self.renderer.dimensions();
            if let Err(err) = backend.present(self.renderer.frame(), width, height) {
                self.state = LoopState::Terminated;
                return Err(err);
            }
            self.frames += 1;

            thread::sleep(self.frame_interval);
        }

        // teardown: release the surface before reporting Terminated
        drop(backend);
        self.state = LoopState::Terminated;

        info!("render loop terminated after {} frames", self.frames);

        Ok(())
    }
}
