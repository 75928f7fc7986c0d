use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TableError {
    /// Tried to store the empty marker as a value.
    InvalidValue,
    /// No value lives in the slot the key hashes to.
    NotFound(String),
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue => f.write_str("An empty value is not permitted"),
            Self::NotFound(key) => write!(f, "{key} is not a valid key"),
        }
    }
}

impl std::error::Error for TableError {}
