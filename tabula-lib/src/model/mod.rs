//! Row, column and value models

mod column;
mod record;
mod row;
mod value;

pub use column::*;
pub use record::*;
pub use row::*;
pub use value::*;
