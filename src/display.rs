//! Display state machine, rendering and LED strip output

use serde_derive::Serialize;
use thiserror::Error;

use crate::api::wall::ValidationError;

mod controller;
pub use controller::*;

pub mod device;
pub use device::{Device, DeviceError};

mod frame;
pub use frame::*;

mod state;
pub use state::*;

/// Who is at fault for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The payload was rejected
    Client,
    /// The payload was valid but could not be displayed
    Server,
}

#[derive(Debug, Error)]
pub enum WallError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("hardware error: {0}")]
    Hardware(#[from] DeviceError),
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl WallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WallError::Validation(_) => ErrorKind::Client,
            WallError::Hardware(_) | WallError::Task(_) => ErrorKind::Server,
        }
    }
}
