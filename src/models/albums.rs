use serde_derive::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::wall::Identity;

/// An album cover on the wall and the LEDs behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_led_range"))]
pub struct Album {
    #[validate(length(min = 1))]
    pub artist_name: String,
    #[validate(length(min = 1))]
    pub album_name: String,
    pub led_start_index: u32,
    /// Last LED of the album, inclusive
    pub led_end_index: u32,
}

fn validate_led_range(album: &Album) -> Result<(), ValidationError> {
    if album.led_start_index > album.led_end_index {
        return Err(ValidationError::new("led_range"));
    }

    Ok(())
}

impl Album {
    pub fn identity(&self) -> Identity {
        Identity::new(self.artist_name.as_str(), self.album_name.as_str())
    }

    pub fn matches(&self, identity: &Identity) -> bool {
        self.artist_name == identity.artist && self.album_name == identity.album
    }

    pub fn contains(&self, led: usize) -> bool {
        (self.led_start_index as usize..=self.led_end_index as usize).contains(&led)
    }
}
