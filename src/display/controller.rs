use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{Device, DeviceError, DisplayState, Renderer, WallError};
use crate::{
    api::wall::{self, DisplayRequest},
    models::Config,
};

/// Result of applying a request to the wall
#[derive(Debug)]
pub enum RenderOutcome {
    /// The frame was written and the state committed
    Applied(DisplayState),
    /// The frame could not be written, the previous state is kept
    HardwareError(DeviceError),
}

impl RenderOutcome {
    pub fn into_result(self) -> Result<DisplayState, DeviceError> {
        match self {
            RenderOutcome::Applied(state) => Ok(state),
            RenderOutcome::HardwareError(error) => Err(error),
        }
    }
}

/// Everything guarded by the controller lock
struct Inner {
    state: DisplayState,
    device: Device,
    renderer: Renderer,
}

/// Owner of the display state and the LED strip
///
/// All transitions go through a single lock, held from computing the next state until the frame
/// has been written, so at most one write reaches the device at a time and the committed state
/// always matches the last frame that was fully written.
pub struct DisplayController {
    inner: Mutex<Inner>,
}

impl DisplayController {
    pub fn new(device: Device, renderer: Renderer) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: DisplayState::new(),
                device,
                renderer,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, DeviceError> {
        let device = Device::new("wall", config.device.clone())?;
        Ok(Self::new(device, Renderer::from_config(config)))
    }

    /// Snapshot of the committed state
    pub async fn state(&self) -> DisplayState {
        self.inner.lock().await.state.clone()
    }

    /// Apply a validated request
    #[instrument(skip(self))]
    pub async fn apply(&self, request: DisplayRequest) -> RenderOutcome {
        let mut inner = self.inner.lock().await;

        let next = inner.state.transition(&request);
        let frame = inner.renderer.render(&next);

        match inner.device.write(frame).await {
            Ok(()) => {
                debug!(revision = next.revision(), power = %next.power(), "applied transition");
                inner.state = next.clone();
                RenderOutcome::Applied(next)
            }
            Err(error) => {
                error!(%error, revision = inner.state.revision(), "failed to write frame, keeping previous state");
                RenderOutcome::HardwareError(error)
            }
        }
    }

    /// Write the current state to the strip again without a transition
    ///
    /// Used at startup so the strip does not keep showing whatever it had before.
    pub async fn refresh(&self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().await;
        let frame = inner.renderer.render(&inner.state);
        inner.device.write(frame).await
    }

    /// Validate a raw payload and apply it
    ///
    /// Validation runs before the lock is taken, rejected payloads never touch the device.
    pub async fn handle(&self, raw: &Map<String, Value>) -> Result<DisplayState, WallError> {
        let request = wall::validate(raw)?;
        Ok(self.apply(request).await.into_result()?)
    }
}
