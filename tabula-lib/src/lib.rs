//! Tabula data grid library
//!
//! A headless tabular data-grid engine: rows and columns go in, and the
//! filtered, sorted and paginated view comes out, together with selection
//! state, typed events and optional remote loading. Rendering is left to the
//! caller.
//!
//! The entry point is [`DataGrid`], configured with
//! [`GridOptions`](options::GridOptions).

pub mod engine;
pub mod error;
pub mod event;
pub mod model;
pub mod options;
pub mod plugin;
pub mod query;
pub mod remote;
pub mod store;

mod grid;

pub use grid::*;
