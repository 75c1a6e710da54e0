//! `vision2video` library crate.
//!
//! Turns a still image plus an optional prompt into a generated video by
//! driving a remote job API: submit, poll until done, download. The desktop
//! binary in `main.rs` wraps [`app::VisionApp`] around a
//! [`controller::JobController`]; the modules are public so integration
//! tests can drive the controller against a mock backend.

pub mod api;
pub mod app;
pub mod config;
pub mod controller;
pub mod upload;
pub mod utils;
