use crate::core::columns;
use crate::core::resolver::{self, PortResolver};
use crate::domain::model::{Record, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, PortLookup, Storage};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// Flattens one shipment export: delimited text in, one JSON document out,
/// with the seaport tracking pass in between.
pub struct FlatExportPipeline<S: Storage, C: ConfigProvider, L: PortLookup> {
    storage: S,
    config: C,
    resolver: PortResolver<L>,
}

impl<S: Storage, C: ConfigProvider, L: PortLookup> FlatExportPipeline<S, C, L> {
    pub fn new(storage: S, config: C, resolver: PortResolver<L>) -> Self {
        Self {
            storage,
            config,
            resolver,
        }
    }

    fn input_basename(&self) -> String {
        let input = self.config.input_path();
        Path::new(input)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(input)
            .to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: PortLookup> Pipeline for FlatExportPipeline<S, C, L> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let raw = self.storage.read_file(self.config.input_path()).await?;
        let delimiter = if self.config.input_path().ends_with(".tsv") {
            b'\t'
        } else {
            b','
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(raw.as_slice());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut data = HashMap::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                let cell = cell.trim();
                if !cell.is_empty() {
                    data.insert(header.clone(), cell.to_string());
                }
            }
            // Exports routinely carry fully blank separator lines.
            if data.is_empty() {
                continue;
            }
            records.push(Record { data });
        }

        tracing::debug!(
            "Extracted {} rows from {}",
            records.len(),
            self.config.input_path()
        );
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        let file_name = self.input_basename();
        let parsed_on = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut records = Vec::with_capacity(data.len());
        for raw in &data {
            let mut record = columns::map_record(raw)?;
            if let Some(terminal) = self.config.terminal() {
                record.terminal = Some(terminal.to_string());
            }
            record.original_file_name = Some(file_name.clone());
            record.original_file_parsed_on = Some(parsed_on.clone());
            records.push(record);
        }

        resolver::normalize_directions(&mut records);
        self.resolver.resolve(&mut records).await;

        let json_output = serde_json::to_string(&records)?;
        Ok(TransformResult {
            records,
            json_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!(
            "{}/{}.json",
            self.config.output_path().trim_end_matches('/'),
            self.input_basename()
        );
        self.storage
            .write_file(&output_path, result.json_output.as_bytes())
            .await?;
        Ok(output_path)
    }
}
