#![forbid(unsafe_code)]

//! fictui runtime: window composition and stream I/O.
//!
//! This crate is the display-composition and I/O-abstraction core of a
//! terminal windowing runtime for interactive narrative software.
//! Client programs never draw directly; they request windows, arrange
//! them in a split tree, write through streams, and apply style hints.
//!
//! # Key components
//!
//! - [`Session`] - the owned context holding the window tree, stream
//!   registry, file references, and style state
//! - [`ContentHost`] - the seam to the character-rendering layer, which
//!   is deliberately outside this crate
//! - [`Stream`] - the polymorphic stream record (memory, file, window)
//!
//! # How it fits in the system
//! The session is the orchestrator: window creation allocates streams,
//! output routed through a window stream consults the style tables from
//! `fictui-style` before reaching the [`ContentHost`], and resize events
//! re-run the pair layout over the whole tree.

pub mod fileref;
pub mod host;
pub mod pair;
pub mod session;
pub mod stream;
pub mod window;

pub use fileref::{FileRef, FileRefId};
pub use host::{ContentHost, HostEvent, NullHost, RecordingHost};
pub use pair::{Division, PairData, SplitDir, SplitMethod};
pub use session::Session;
pub use stream::{FileMode, SeekMode, Stream, StreamId, StreamKind, StreamResult};
pub use window::{LeafKind, Window, WindowId, WindowType};
