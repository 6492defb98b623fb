//! Core library for masdev: classifying JaCaMo output, probing for running
//! applications, and orchestrating launches.

pub mod app;
pub mod bridge;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod navigation;
pub mod orchestrator;
pub mod probe;
pub mod sink;
pub mod toolchain;
