//! Error types

mod export;
mod field;
mod grid;
mod remote;
mod store;

pub use export::*;
pub use field::*;
pub use grid::*;
pub use remote::*;
pub use store::*;
