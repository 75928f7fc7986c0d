//! A key to value table built over one flat array of slots.
//!
//! ```
//! use openslot::Table;
//!
//! let mut table = Table::<&str, &str>::new();
//! table.set("Hello", "World")?;
//! table.set("Lettuce", "orange")?;
//!
//! assert!(table.contains("Lettuce"));
//! assert_eq!(table.get("Hello")?, &"World");
//! assert_eq!(table.to_string(), "Table[Hello:World, Lettuce:orange]");
//! # Ok::<(), openslot::TableError>(())
//! ```

pub mod collections;
pub mod core;
mod error;

pub use collections::{Entries, Keys, Table, TableBuilder};
pub use error::TableError;

pub type Result<T> = std::result::Result<T, TableError>;
