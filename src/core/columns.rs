use crate::domain::model::{Record, ShipmentRecord};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use serde_json::Value;

/// Source export header -> output key, in source column order.
pub const HEADERS: &[(&str, &str)] = &[
    ("Год", "year"),
    ("Мес", "month"),
    ("Отгружен", "shipment_date"),
    ("Терминал", "terminal"),
    ("Направление", "direction"),
    ("Линия", "line"),
    ("Рейс", "voyage"),
    ("Экспедитор", "expeditor"),
    ("Отправитель (исходное название)", "shipper_name"),
    ("Номер контейнера", "container_number"),
    ("Порт (предобработка)", "tracking_seaport"),
    ("Страна (предобратока)", "destination_country"),
    ("Груз", "goods_name"),
    ("TEU", "teu"),
    ("Вес нетто", "goods_weight_netto"),
    ("Вес брутто", "goods_weight_brutto"),
    ("Размер контейнера", "container_size"),
    ("Тип контейнера", "container_type"),
    ("Кол-во контейнеров, шт.", "container_count"),
    (
        "Группа груза по ТНВЭД (проставляется вручную через код ТНВЭД - ячека Х)",
        "tnved_group_id",
    ),
    (
        "Наименование Группы (подтягивается по коду через справочник)",
        "tnved_group_name",
    ),
    ("ИНН (извлечен через excel)", "shipper_inn"),
    ("УНИ-компания (подтянута через ИНН)", "shipper_name_unified"),
    ("Страна", "shipper_country"),
    ("Номер ГТД", "gtd_number"),
    ("Порожний", "is_empty"),
    ("ТНВЭД", "tnved"),
    ("Судно", "ship_name"),
    ("Получатель", "consignee_name"),
    ("Букинг", "booking"),
];

/// Keys that only ever appear already-normalized in the input.
const PASSTHROUGH_KEYS: &[&str] = &["consignment", "enforce_auto_tracking"];

pub fn english_header(header: &str) -> Option<&'static str> {
    HEADERS
        .iter()
        .find(|(source, _)| *source == header)
        .map(|(_, key)| *key)
}

/// Maps a raw header to its output key. Accepts both the source-language
/// headers and columns that are already English-keyed.
pub fn output_key(header: &str) -> Option<&'static str> {
    english_header(header)
        .or_else(|| HEADERS.iter().map(|(_, key)| *key).find(|key| *key == header))
        .or_else(|| PASSTHROUGH_KEYS.iter().copied().find(|key| *key == header))
}

/// Coerces one trimmed cell into the value type of its output field.
/// Numeric cells that fail to parse become null; an unparseable
/// `shipment_date` keeps the raw value.
pub fn coerce_cell(field: &str, raw: &str) -> Value {
    match field {
        "year" | "month" | "teu" | "container_size" | "container_count" | "tnved" => {
            parse_integer(raw).map(Value::from).unwrap_or(Value::Null)
        }
        "tnved_group_id" => parse_integer(raw)
            .map(|n| Value::String(n.to_string()))
            .unwrap_or(Value::Null),
        "goods_weight_netto" | "goods_weight_brutto" => raw
            .parse::<f64>()
            .ok()
            .map(Value::from)
            .unwrap_or(Value::Null),
        "is_empty" => Value::Bool(matches!(raw, "1" | "да" | "Да" | "True")),
        "enforce_auto_tracking" => parse_flag(raw).map(Value::Bool).unwrap_or(Value::Null),
        "shipment_date" => Value::String(normalize_shipment_date(raw)),
        _ => Value::String(raw.to_string()),
    }
}

/// Renames and coerces one raw row into a typed shipment record.
/// Columns outside the known schema are dropped.
pub fn map_record(record: &Record) -> Result<ShipmentRecord> {
    let mut fields = serde_json::Map::new();
    for (header, cell) in &record.data {
        if let Some(key) = output_key(header) {
            let value = coerce_cell(key, cell);
            if !value.is_null() {
                fields.insert(key.to_string(), value);
            }
        }
    }
    let shipment = serde_json::from_value(Value::Object(fields))?;
    Ok(shipment)
}

fn parse_integer(raw: &str) -> Option<i64> {
    // Excel exports render integers as "10" or "10.0" depending on the cell.
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f as i64))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "да" => Some(true),
        "false" | "0" | "нет" => Some(false),
        _ => None,
    }
}

fn normalize_shipment_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.date().to_string())
        .unwrap_or_else(|_| raw.to_string())
}
