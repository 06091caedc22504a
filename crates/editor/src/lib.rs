//! # FloorGraph Editor
//!
//! Stateful editing on top of the FloorGraph data model.
//!
//! - [`GraphStore`] owns the live project, the active floor and the selection,
//!   and hands every change to the [`Autosaver`]
//! - [`History`] keeps bounded undo/redo snapshots
//! - [`Interaction`] turns clicks and keys into intents according to the
//!   current [`EditorMode`]
//! - [`Editor`] wires the three together behind one API

pub mod config;
pub mod editor;
pub mod history;
pub mod interaction;
pub mod persistence;
pub mod store;

pub use config::{DEFAULT_STORAGE_KEY, EditorConfig};
pub use editor::Editor;
pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistorySnapshot};
pub use interaction::{EditorMode, Intent, Interaction, Shortcut};
pub use persistence::{Autosaver, JsonFileStorage, MemoryStorage, ProjectStorage};
pub use store::GraphStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
