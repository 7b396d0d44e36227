//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into focused layers:
//!
//! - **[`app`]** — application state, the input-mode state machine, and the
//!   render/block-on-input event loop
//! - **[`layout`]** — pane geometry from the terminal size and a bounded,
//!   resizable configuration
//! - **[`scroll`]** — per-pane scroll offsets and source auto-follow
//! - **[`flatten`]** — variable-tree flattening into display lines
//! - **[`panes`]** — stateless render functions for each visible pane
//! - **[`theme`]** — centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`DebugBackend`] and call [`App::run`] to start the event loop.
//!
//! [`DebugBackend`]: crate::backend::DebugBackend
//! [`App::run`]: app::App::run

pub mod app;
pub mod flatten;
pub mod layout;
pub mod panes;
pub mod scroll;
pub mod theme;

pub use app::App;
