//! Domain models read from the record store.

pub mod entities;
pub mod macros;
pub mod record;
pub mod time;

pub use entities::*;
pub use record::{FieldMap, Record};
