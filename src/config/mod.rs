pub mod cli;
pub mod tracking;

pub use tracking::TrackingConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "shipment-etl")]
#[command(about = "Flattens shipment table exports into JSON records with seaport tracking")]
pub struct CliConfig {
    /// Delimited shipment export to process
    pub input_file: String,

    /// Folder receiving <input>.json
    pub output_folder: String,

    /// Tracking service endpoint; overrides the config file value
    #[arg(long)]
    pub tracking_endpoint: Option<String>,

    /// TOML file with tracking service and carrier settings
    #[arg(long)]
    pub tracking_config: Option<String>,

    /// Terminal name stamped onto every row
    #[arg(long)]
    pub terminal: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Resolved tracking configuration: the config file (or defaults) with
    /// CLI overrides applied on top.
    pub fn tracking(&self) -> Result<TrackingConfig> {
        let mut tracking = match &self.tracking_config {
            Some(path) => TrackingConfig::from_file(path)?,
            None => TrackingConfig::default(),
        };
        if let Some(endpoint) = &self.tracking_endpoint {
            tracking.endpoint = endpoint.clone();
        }
        tracking.validate()?;
        Ok(tracking)
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input_file
    }

    fn output_path(&self) -> &str {
        &self.output_folder
    }

    fn terminal(&self) -> Option<&str> {
        self.terminal.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_file", &self.input_file)?;
        validation::validate_file_extension("input_file", &self.input_file, &["csv", "tsv", "txt"])?;
        validation::validate_path("output_folder", &self.output_folder)?;
        if let Some(endpoint) = &self.tracking_endpoint {
            validation::validate_url("tracking_endpoint", endpoint)?;
        }
        Ok(())
    }
}
