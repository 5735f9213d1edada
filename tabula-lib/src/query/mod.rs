//! Query state: filters, sort order, pagination and the remote request form.

mod filter;
mod page;
mod params;
mod sort;

pub use filter::*;
pub use page::*;
pub use params::*;
pub use sort::*;
