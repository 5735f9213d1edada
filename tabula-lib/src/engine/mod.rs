//! The recompute pipeline stages.
//!
//! Each stage is a pure function over row indices: filtering and sorting
//! never move or copy the rows themselves, and never mutate their input.
//! [`DataGrid`](crate::DataGrid) wires them together in a fixed order.

pub mod aggregate;
pub mod compare;
pub mod filter;
pub mod paginate;
pub mod selection;
pub mod sort;

pub use aggregate::AggregateFunction;
pub use aggregate::AggregateSpec;
pub use filter::FilterContext;
pub use selection::SelectionState;
