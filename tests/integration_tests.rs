use httpmock::prelude::*;
use serde_json::json;
use shipment_etl::{
    CliConfig, EtlEngine, FlatExportPipeline, HttpPortLookup, LocalStorage, PortResolver,
    TrackingConfig,
};
use tempfile::TempDir;

const SAMPLE_CSV: &str = "\
Год,Мес,Направление,Линия,Груз,Номер контейнера,TEU,Порожний,Судно,Букинг
2024,3,импорт,MSC,Electronics,MSKU1234567,2,0,Ever Given,
2024,3,импорт,MSC,Electronics,MSKU1234567,2,0,Ever Given,
2024,3,импорт,DHL,Documents,DHLU0000001,1,0,Courier,
2024,3,экспорт,SINOKOR,ПОРОЖНИЙ КОНТЕЙНЕР,SNKU7654321,1,да,Star,BKG555
";

fn write_input(dir: &TempDir) -> String {
    let input_path = dir.path().join("shipments.csv");
    std::fs::write(&input_path, SAMPLE_CSV).unwrap();
    input_path.to_str().unwrap().to_string()
}

fn engine_for(
    input_file: String,
    output_folder: String,
    endpoint: String,
) -> EtlEngine<FlatExportPipeline<LocalStorage, CliConfig, HttpPortLookup>> {
    let config = CliConfig {
        input_file,
        output_folder,
        tracking_endpoint: Some(endpoint),
        tracking_config: None,
        terminal: Some("VSK".to_string()),
        verbose: false,
    };

    let tracking = TrackingConfig {
        endpoint: config.tracking_endpoint.clone().unwrap(),
        ..TrackingConfig::default()
    };
    let lookup = HttpPortLookup::new(&tracking).unwrap();
    let resolver = PortResolver::new(&tracking, lookup);

    let pipeline = FlatExportPipeline::new(LocalStorage::new(), config, resolver);
    EtlEngine::new(pipeline)
}

#[tokio::test]
async fn test_end_to_end_flat_export_with_tracking() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = write_input(&temp_dir);
    let output_folder = temp_dir.path().join("out").to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/").json_body(json!({
            "line": "MSC",
            "consignment": "MSKU1234567",
            "direction": "import"
        }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!("Shanghai"));
    });

    let engine = engine_for(input_file, output_folder.clone(), server.url("/"));
    let output_path = engine.run().await.unwrap();

    // Two MSC rows share a container, DHL is unrecognized, the Sinokor empty
    // box is excluded: exactly one service call.
    api_mock.assert_hits(1);
    assert_eq!(output_path, format!("{}/shipments.csv.json", output_folder));

    let raw_output = std::fs::read_to_string(&output_path).unwrap();
    assert!(!raw_output.contains('\n'));

    let rows: Vec<serde_json::Value> = serde_json::from_str(&raw_output).unwrap();
    assert_eq!(rows.len(), 4);

    for row in &rows[..2] {
        assert_eq!(row["tracking_seaport"], json!("Shanghai"));
        assert_eq!(row["is_auto_tracking"], json!(true));
        assert_eq!(row["is_auto_tracking_ok"], json!(true));
    }

    // Untouched rows gain no enrichment keys.
    assert!(rows[2].get("is_auto_tracking").is_none());
    assert!(rows[2].get("tracking_seaport").is_none());
    assert!(rows[3].get("is_auto_tracking").is_none());

    // Coerced values and stamped metadata.
    assert_eq!(rows[0]["year"], json!(2024));
    assert_eq!(rows[0]["teu"], json!(2));
    assert_eq!(rows[0]["is_empty"], json!(false));
    assert_eq!(rows[3]["is_empty"], json!(true));
    assert_eq!(rows[0]["terminal"], json!("VSK"));
    assert_eq!(rows[0]["original_file_name"], json!("shipments.csv"));
    assert!(rows[0].get("original_file_parsed_on").is_some());

    // Service columns are consumed but never emitted.
    for row in &rows {
        assert!(row.get("direction").is_none());
        assert!(row.get("shipper_inn").is_none());
    }
}

#[tokio::test]
async fn test_end_to_end_with_tracking_service_failure() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = write_input(&temp_dir);
    let output_folder = temp_dir.path().join("out").to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(500);
    });

    let engine = engine_for(input_file, output_folder, server.url("/"));
    let output_path = engine.run().await.unwrap();

    // The failed lookup is cached like a successful one.
    api_mock.assert_hits(1);

    let raw_output = std::fs::read_to_string(&output_path).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&raw_output).unwrap();

    for row in &rows[..2] {
        assert_eq!(row["tracking_seaport"], json!(null));
        assert_eq!(row["is_auto_tracking"], json!(true));
        assert_eq!(row["is_auto_tracking_ok"], json!(false));
    }
}

#[tokio::test]
async fn test_end_to_end_unreachable_service_does_not_abort() {
    let temp_dir = TempDir::new().unwrap();
    let input_file = write_input(&temp_dir);
    let output_folder = temp_dir.path().join("out").to_str().unwrap().to_string();

    // Nobody listens here; the pass must still complete.
    let engine = engine_for(
        input_file,
        output_folder,
        "http://127.0.0.1:9".to_string(),
    );
    let output_path = engine.run().await.unwrap();

    let raw_output = std::fs::read_to_string(&output_path).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(&raw_output).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["is_auto_tracking_ok"], json!(false));
}
