//! Lab Assist - AI laboratory assistant CLI
//!
//! Turns microphone, camera and typed input into structured lab records
//! (deposition process recommendations, maintenance ticket triage,
//! inventory entries, storage inspections and reports) using Google Gemini.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, records, the per-action state machine and errors
//! - **Application**: The task orchestrator, payload encoder, inference gateway
//!   and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal microphone, image files,
//!   Gemini, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and stop signals

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
