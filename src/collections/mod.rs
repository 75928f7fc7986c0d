pub mod hash;
mod table;

pub use table::{Entries, Keys, Table, TableBuilder};
