pub mod config;
pub mod error;
pub mod record;
pub mod types;

pub use error::{ParleyError, Result};
pub use record::Record;
pub use types::ViewerId;
