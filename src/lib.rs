pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::{Cli, LocalStorage};
pub use config::QueryConfig;
pub use core::engine::QueryEngine;
pub use core::resolver::TargetResolver;
pub use core::tap::TapClient;
pub use domain::model::{ResultTable, SearchRequest, Target};
pub use utils::error::{Result, SmashError};
