use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One raw extracted row: source header -> non-empty trimmed cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, String>,
}

/// A shipment row after column renaming and type coercion.
///
/// Every field is optional: the source exports routinely leave cells blank.
/// `direction` and the four reference columns below it are consumed during
/// the transform but never written to the output document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentRecord {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub shipment_date: Option<String>,
    pub terminal: Option<String>,
    #[serde(skip_serializing)]
    pub direction: Option<String>,
    pub line: Option<String>,
    pub voyage: Option<String>,
    pub expeditor: Option<String>,
    pub shipper_name: Option<String>,
    pub container_number: Option<String>,
    pub tracking_seaport: Option<serde_json::Value>,
    #[serde(skip_serializing)]
    pub destination_country: Option<String>,
    pub goods_name: Option<String>,
    pub teu: Option<i64>,
    pub goods_weight_netto: Option<f64>,
    pub goods_weight_brutto: Option<f64>,
    pub container_size: Option<i64>,
    pub container_type: Option<String>,
    pub container_count: Option<i64>,
    pub tnved_group_id: Option<String>,
    #[serde(skip_serializing)]
    pub tnved_group_name: Option<String>,
    #[serde(skip_serializing)]
    pub shipper_inn: Option<String>,
    #[serde(skip_serializing)]
    pub shipper_name_unified: Option<String>,
    pub shipper_country: Option<String>,
    pub gtd_number: Option<String>,
    pub is_empty: Option<bool>,
    pub tnved: Option<i64>,
    pub ship_name: Option<String>,
    pub consignee_name: Option<String>,
    pub booking: Option<String>,
    pub consignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_auto_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_tracking_ok: Option<bool>,
    pub original_file_name: Option<String>,
    pub original_file_parsed_on: Option<String>,
}

impl ShipmentRecord {
    pub fn apply_enrichment(&mut self, enrichment: &Enrichment) {
        self.tracking_seaport = Some(enrichment.tracking_seaport.clone());
        self.is_auto_tracking = Some(enrichment.is_auto_tracking);
        self.is_auto_tracking_ok = Some(enrichment.is_auto_tracking_ok);
    }
}

/// Result of one seaport lookup, shared by every row of the same shipment.
/// A failed lookup carries an explicit null seaport, distinguishing it from
/// rows the resolver never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub tracking_seaport: serde_json::Value,
    pub is_auto_tracking: bool,
    pub is_auto_tracking_ok: bool,
}

impl Enrichment {
    pub fn resolved(seaport: serde_json::Value) -> Self {
        Self {
            tracking_seaport: seaport,
            is_auto_tracking: true,
            is_auto_tracking_ok: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            tracking_seaport: serde_json::Value::Null,
            is_auto_tracking: true,
            is_auto_tracking_ok: false,
        }
    }
}

/// Request body for the tracking classification service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortQuery {
    pub line: String,
    pub consignment: String,
    pub direction: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<ShipmentRecord>,
    pub json_output: String,
}
