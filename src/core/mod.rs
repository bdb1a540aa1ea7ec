//! # Core Story Logic
//!
//! This module contains Fable's business logic.
//! It knows nothing about HTTP.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Story (graph)        │
//!                    │  • StoryState (machine) │
//!                    │  • Session (per player) │
//!                    │                         │
//!                    │  No HTTP. No routing.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │   server   │                          │   images   │
//!     │   (axum)   │ ───── resolve/fetch ───▶ │ (providers)│
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`story`]: `Story`, `Chapter` and the `submit()` validator
//! - [`state`]: `StoryState`, the chapter state machine
//! - [`session`]: per-player sessions and the registry that owns them
//! - [`config`]: layered settings

pub mod config;
pub mod session;
pub mod state;
pub mod story;

pub use session::{Session, SessionHandle, SessionRegistry};
pub use state::StoryState;
pub use story::{Chapter, ChapterRecord, Story, StoryError, submit};
