pub mod columns;
pub mod etl;
pub mod pipeline;
pub mod resolver;

pub use crate::domain::model::{Enrichment, PortQuery, Record, ShipmentRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, PortLookup, Storage};
pub use crate::utils::error::Result;
