//! # Introduction
//!
//! tdbg is a full-screen terminal front-end for source-level debugging. It
//! renders the debug session — source text, live variables, breakpoints, and
//! a command log — and turns keystrokes and mouse wheel ticks into commands
//! against a debug engine.
//!
//! ## Architecture
//!
//! ```text
//! input event → App (mode state machine) → DebugBackend → gdb (MI)
//!                      ↓
//!       LayoutEngine → panes → terminal buffer
//! ```
//!
//! 1. [`backend`] — the [`backend::DebugBackend`] capability trait the UI
//!    consumes, plus the shipped GDB/MI implementation in [`backend::gdb`].
//! 2. [`cache`] — single-entry source file cache for the source pane.
//! 3. [`logbuf`] — append-only, timestamped message log.
//! 4. [`ui`] — ratatui-based TUI: layout, scrolling, variable flattening,
//!    pane renderers, and the event loop.
//!
//! Everything is single-threaded: one loop iteration snapshots the backend,
//! renders, then blocks for the next input event. Backend calls block until
//! the debuggee stops, so no state is ever mutated concurrently.

pub mod backend;
pub mod cache;
pub mod logbuf;
pub mod ui;
