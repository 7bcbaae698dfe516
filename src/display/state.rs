use serde_derive::Serialize;

use crate::api::wall::{DisplayRequest, Identity, Power};

/// What the wall is currently showing
///
/// Starts off with no identity at revision 0. A new value is produced for every transition and
/// only replaces the current one once the matching frame reached the strip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    power: Power,
    identity: Option<Identity>,
    revision: u64,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(&self) -> Power {
        self.power
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Compute the state after applying `request`
    ///
    /// Every request is a transition, including repeated ones, so the revision always grows.
    /// Turning on replaces the identity with the request's (or none), turning off clears it.
    pub fn transition(&self, request: &DisplayRequest) -> Self {
        let identity = match request.status() {
            Power::On => request.identity().cloned(),
            Power::Off => None,
        };

        Self {
            power: request.status(),
            identity,
            revision: self.revision + 1,
        }
    }
}
