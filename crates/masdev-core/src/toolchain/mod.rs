//! Toolchain adapter interface for the external JaCaMo command.
//!
//! This module defines the [`Toolchain`] trait that the orchestrator and
//! the CLI commands talk to, plus [`JacamoToolchain`], the adapter that
//! invokes the real `jacamo` executable through the process bridge.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator / CLI
//!     |
//!     v
//! &dyn Toolchain
//!     |  execute(["mas", "list"], cwd)    --> CommandOutput   (one-shot)
//!     |  execute(["mas", "stop", n, ...]) --> CommandOutput   (one-shot)
//!     |  launch("app.jcm", cwd)           --> Stream<BridgeEvent>
//!     v
//! bridge::execute_command / bridge::stream_process
//! ```

pub mod jacamo;
pub mod trait_def;

pub use jacamo::JacamoToolchain;
pub use trait_def::Toolchain;
