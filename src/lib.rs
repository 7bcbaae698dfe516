//! `albumwall` drives the LED strip behind a wall of album covers.
//!
//! # Structure
//!
//! A JSON payload posted to the [web] server is checked by [api::wall::validate], then applied
//! by the [display::DisplayController], which renders the new state into a [display::Frame]
//! and writes it to the configured [display::Device].

#[macro_use]
extern crate tracing;

pub mod api;
pub mod display;
pub mod models;
pub mod web;
