//! Inbound message definitions for the album wall

pub mod wall;
