pub mod error;
pub mod extract;
pub mod inspect;
pub mod pipeline;
pub mod profiles;
pub mod structured;
pub mod table;

pub use error::{CoreError, Result};
pub use pipeline::{Pipeline, PipelineSummary};
pub use profiles::{Profile, ProfileRegistry};
pub use structured::FieldValue;
pub use table::Table;
