//! Subsystems wired together by the supervisor entry point.
//!
//! - **notes** — note store, authorization gate, command routing.
//! - **comms** — external I/O channels (PTY console, Telegram).
//! - **runtime** — generic component spawning shared by subsystems.

pub mod comms;
pub mod notes;
pub mod runtime;
