#![warn(missing_docs)]
//! `syntax-core` - host-facing kernel for incremental syntax highlighting.
//!
//! # Overview
//!
//! `syntax-core` defines the UI-agnostic vocabulary shared between a host editor and a
//! syntax/highlighting engine:
//!
//! - **Shared sources**: a rope-backed text handle ([`SourceText`]) that the host mutates and the
//!   syntax layer reads, with byte/point conversions
//! - **Edit descriptions**: the structured 9-field edit tuple ([`EditDescription`]) delivered to
//!   incremental consumers before any redraw of the edited region
//! - **Highlight spans**: ephemeral per-pass style annotations ([`HighlightSpan`])
//! - **Host interfaces**: style resolution, redraw scheduling, and span emission traits
//!
//! It deliberately knows nothing about any concrete parser. Parsing/highlighting engines (such as
//! `syntax-core-treesitter`) build on these types, so hosts can drive them through a single seam.
//!
//! # Quick Start
//!
//! ```rust
//! use syntax_core::{Point, SourceText};
//!
//! let mut source = SourceText::from_str("fn main() {\n}\n");
//! let edit = source.apply_edit(3, 7, "run");
//!
//! assert_eq!(edit.start_position, Point::new(0, 3));
//! assert_eq!(edit.new_end_byte, 6);
//! assert_eq!(source.to_string(), "fn run() {\n}\n");
//! ```
//!
//! # Module Description
//!
//! - [`source`] - rope-backed shared text handle
//! - [`edit`] - points and structured edit descriptions
//! - [`span`] - style ids and ephemeral highlight spans
//! - [`host`] - traits implemented by the host editor environment

pub mod edit;
pub mod host;
pub mod source;
pub mod span;

pub use edit::{EditDescription, Point};
pub use host::{BufferId, HighlightHost, RedrawScheduler, SpanSink, StyleResolver};
pub use source::{SharedSource, SourceText};
pub use span::{HighlightSpan, StyleId, UNSTYLED};
