pub mod engine;
pub mod resolver;
pub mod tap;

pub use crate::domain::model::{ResolvedTarget, ResultTable, SearchRequest, Target};
pub use crate::domain::ports::{SearchService, Storage};
pub use crate::utils::error::Result;
