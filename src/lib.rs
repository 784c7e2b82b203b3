pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig, TrackingConfig};
pub use core::etl::EtlEngine;
pub use core::pipeline::FlatExportPipeline;
pub use core::resolver::{HttpPortLookup, PortResolver};
pub use utils::error::{EtlError, Result};
