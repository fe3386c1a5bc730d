pub mod errors;
pub mod literal;
pub mod model;

pub use errors::LiteralError;
pub use literal::{parse_literal, parse_record_list, MAX_NESTING_DEPTH};
pub use model::{LiteralValue, NamedList};
