//! `/wall` request validation
//!
//! Incoming payloads are untyped JSON objects. [validate] turns them into a [DisplayRequest],
//! the only shape the display controller accepts.

use parse_display::{Display, FromStr};
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::display::DisplayState;

/// Name of the required status field
pub const LED_STATUS: &str = "ledStatus";
/// Name of the optional artist field
pub const ARTIST_NAME: &str = "artistName";
/// Name of the optional album field
pub const ALBUM_NAME: &str = "albumName";

/// Requested power state of the strip
#[derive(Display, FromStr, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

impl Default for Power {
    fn default() -> Self {
        Self::Off
    }
}

/// Artist and album pair attached to an "on" request
#[derive(Display, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[display("{artist} - {album}")]
pub struct Identity {
    #[serde(rename = "artistName")]
    pub artist: String,
    #[serde(rename = "albumName")]
    pub album: String,
}

impl Identity {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
        }
    }
}

/// A validated display request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRequest {
    status: Power,
    identity: Option<Identity>,
}

impl DisplayRequest {
    pub fn off() -> Self {
        Self {
            status: Power::Off,
            identity: None,
        }
    }

    pub fn on(identity: Option<Identity>) -> Self {
        Self {
            status: Power::On,
            identity,
        }
    }

    pub fn status(&self) -> Power {
        self.status
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

/// Reasons a `/wall` payload is rejected
///
/// When several conditions hold at once, the first one in declaration order is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing ledStatus field")]
    MissingStatus,
    #[error("invalid ledStatus value {0}, expected \"on\" or \"off\"")]
    InvalidStatus(String),
    #[error("{present} was given without {missing}")]
    PartialIdentity {
        present: &'static str,
        missing: &'static str,
    },
    #[error("{0} must be a non-empty string")]
    InvalidIdentity(&'static str),
}

/// Look up an optional field, treating `null` as absent
fn field<'v>(raw: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    raw.get(name).filter(|value| !value.is_null())
}

fn identity_field<'v>(value: &'v Value, name: &'static str) -> Result<&'v str, ValidationError> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(ValidationError::InvalidIdentity(name)),
    }
}

/// Validate and normalize a raw `/wall` payload
///
/// Unknown fields are ignored. Checks run in a fixed order: status presence, status value,
/// identity pairing, identity values.
pub fn validate(raw: &Map<String, Value>) -> Result<DisplayRequest, ValidationError> {
    let status = match field(raw, LED_STATUS) {
        None => return Err(ValidationError::MissingStatus),
        Some(Value::String(s)) => s
            .parse::<Power>()
            .map_err(|_| ValidationError::InvalidStatus(format!("{:?}", s)))?,
        Some(other) => return Err(ValidationError::InvalidStatus(other.to_string())),
    };

    let identity = match (field(raw, ARTIST_NAME), field(raw, ALBUM_NAME)) {
        (None, None) => None,
        (Some(_), None) => {
            return Err(ValidationError::PartialIdentity {
                present: ARTIST_NAME,
                missing: ALBUM_NAME,
            })
        }
        (None, Some(_)) => {
            return Err(ValidationError::PartialIdentity {
                present: ALBUM_NAME,
                missing: ARTIST_NAME,
            })
        }
        (Some(artist), Some(album)) => Some(Identity::new(
            identity_field(artist, ARTIST_NAME)?,
            identity_field(album, ALBUM_NAME)?,
        )),
    };

    Ok(DisplayRequest { status, identity })
}

/// Body returned by `POST /wall` and `GET /wall`
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WallResponse {
    Success {
        success: bool,
        message: &'static str,
        state: DisplayState,
    },
    Error {
        success: bool,
        error: String,
        kind: crate::display::ErrorKind,
    },
}

impl WallResponse {
    pub const SUCCESS_MESSAGE: &'static str = "LED update succeeded!";

    pub fn success(state: DisplayState) -> Self {
        Self::Success {
            success: true,
            message: Self::SUCCESS_MESSAGE,
            state,
        }
    }

    pub fn error(error: &crate::display::WallError) -> Self {
        Self::Error {
            success: false,
            error: error.to_string(),
            kind: error.kind(),
        }
    }
}
