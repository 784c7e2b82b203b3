use crate::config::tracking::TrackingConfig;
use crate::domain::model::{Enrichment, PortQuery, ShipmentRecord};
use crate::domain::ports::PortLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Carriers whose shipments are keyed by container number rather than
/// booking or consignment number.
const CONTAINER_KEYED_CARRIERS: [&str; 2] = ["MSC", "ARKAS"];

/// Both spellings of the "empty container" cargo marker seen in the exports.
const EMPTY_CARGO_PATTERN: &str = "ПОРОЖ|ПРОЖ";

/// HTTP client for the seaport classification service.
pub struct HttpPortLookup {
    client: Client,
    endpoint: String,
}

impl HttpPortLookup {
    pub fn new(config: &TrackingConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PortLookup for HttpPortLookup {
    async fn lookup(&self, query: &PortQuery) -> Result<Option<serde_json::Value>> {
        let response = self.client.post(&self.endpoint).json(query).send().await?;

        if response.status() != StatusCode::OK {
            tracing::debug!(
                "Tracking service returned {} for consignment {}",
                response.status(),
                query.consignment
            );
            return Ok(None);
        }

        let value = response.json().await?;
        Ok(Some(value))
    }
}

/// Per-identifier outcome of the current pass. `OptedOut` records a shipment
/// whose rows carry `enforce_auto_tracking = false`.
enum CacheEntry {
    Resolved(Enrichment),
    OptedOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub lookups: usize,
    pub reused: usize,
    pub opted_out: usize,
    pub skipped: usize,
}

/// Back-fills `tracking_seaport` / `is_auto_tracking` / `is_auto_tracking_ok`
/// over a table of shipment rows, issuing at most one service call per
/// distinct shipment identifier.
pub struct PortResolver<L: PortLookup> {
    lookup: L,
    recognized: HashSet<String>,
    excluded: HashSet<String>,
    empty_cargo: Regex,
}

impl<L: PortLookup> PortResolver<L> {
    pub fn new(config: &TrackingConfig, lookup: L) -> Self {
        Self {
            lookup,
            recognized: uppercase_set(&config.recognized_carriers),
            excluded: uppercase_set(&config.excluded_carriers),
            empty_cargo: Regex::new(EMPTY_CARGO_PATTERN).unwrap(),
        }
    }

    /// Runs the enrichment pass in row order. Rows whose carrier is not
    /// recognized are left entirely untouched; lookup failures mark the row
    /// and never abort the pass.
    pub async fn resolve(&self, rows: &mut [ShipmentRecord]) -> ResolveStats {
        tracing::info!("Resolving tracking seaports for {} rows", rows.len());

        let mut cache: HashMap<String, CacheEntry> = HashMap::new();
        let mut stats = ResolveStats::default();

        for row in rows.iter_mut() {
            let Some(carrier) = row.line.as_deref().map(|line| line.trim().to_uppercase())
            else {
                continue;
            };
            if !self.recognized.contains(&carrier) {
                continue;
            }
            if self.excluded.contains(&carrier) && self.is_empty_cargo(row.goods_name.as_deref())
            {
                stats.skipped += 1;
                continue;
            }
            let Some(id_value) = self.identifier_value(row, &carrier) else {
                stats.skipped += 1;
                continue;
            };

            match cache.get(&id_value) {
                Some(CacheEntry::Resolved(enrichment)) => {
                    row.apply_enrichment(enrichment);
                    stats.reused += 1;
                }
                Some(CacheEntry::OptedOut) => {
                    stats.opted_out += 1;
                }
                None => {
                    if row.enforce_auto_tracking == Some(false) {
                        cache.insert(id_value, CacheEntry::OptedOut);
                        stats.opted_out += 1;
                        continue;
                    }
                    let enrichment = self.resolve_fresh(row, &id_value).await;
                    stats.lookups += 1;
                    row.apply_enrichment(&enrichment);
                    cache.insert(id_value, CacheEntry::Resolved(enrichment));
                }
            }
        }

        tracing::info!(
            "Tracking pass complete: {} lookups, {} reused from cache, {} opted out, {} skipped",
            stats.lookups,
            stats.reused,
            stats.opted_out,
            stats.skipped
        );
        stats
    }

    async fn resolve_fresh(&self, row: &ShipmentRecord, id_value: &str) -> Enrichment {
        let query = PortQuery {
            line: row.line.clone().unwrap_or_default(),
            consignment: id_value.to_string(),
            direction: row
                .direction
                .clone()
                .unwrap_or_else(|| "export".to_string()),
        };

        match self.lookup.lookup(&query).await {
            Ok(Some(value)) if has_result(&value) => Enrichment::resolved(value),
            Ok(_) => {
                tracing::warn!("No seaport for consignment {} ({})", id_value, query.line);
                Enrichment::failed()
            }
            Err(e) => {
                tracing::warn!("Seaport lookup failed for consignment {}: {}", id_value, e);
                Enrichment::failed()
            }
        }
    }

    fn is_empty_cargo(&self, goods_name: Option<&str>) -> bool {
        goods_name
            .map(|name| self.empty_cargo.is_match(&name.to_uppercase()))
            .unwrap_or(false)
    }

    fn identifier_value(&self, row: &ShipmentRecord, carrier: &str) -> Option<String> {
        let field = if CONTAINER_KEYED_CARRIERS.contains(&carrier) {
            row.container_number.as_deref()
        } else if row.booking.as_deref().is_some_and(|b| !b.trim().is_empty()) {
            row.booking.as_deref()
        } else {
            row.consignment.as_deref()
        };
        field
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

/// Maps localized direction names onto the service vocabulary; anything
/// unrecognized passes through unchanged.
pub fn normalize_direction(direction: &str) -> String {
    match direction.trim().to_lowercase().as_str() {
        "импорт" | "import" => "import".to_string(),
        "экспорт" | "export" => "export".to_string(),
        "каботаж" | "cabotage" => "cabotage".to_string(),
        _ => direction.to_string(),
    }
}

pub fn normalize_directions(rows: &mut [ShipmentRecord]) {
    for row in rows.iter_mut() {
        if let Some(direction) = row.direction.take() {
            row.direction = Some(normalize_direction(&direction));
        }
    }
}

/// The service reports "no result" as null, an empty string, or an empty
/// collection; all of them fail the row.
fn has_result(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(fields) => !fields.is_empty(),
    }
}

fn uppercase_set(values: &[String]) -> HashSet<String> {
    values
        .iter()
        .map(|value| value.trim().to_uppercase())
        .collect()
}
