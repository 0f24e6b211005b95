//! Stager tests against the recording warehouse

mod common;

use common::{RecordingWarehouse, config, default_config};
use songplay_warehouse::config::{CommitMode, UserDedup};
use songplay_warehouse::models::Dialect;
use songplay_warehouse::pipeline::Stager;
use songplay_warehouse::warehouse::WarehouseError;

#[tokio::test]
async fn test_load_copies_events_then_songs() {
    let warehouse = RecordingWarehouse::new().with_rows_affected(8056);
    let config = default_config();

    let report = Stager::new(&warehouse, &config).load().await.unwrap();

    let executed = warehouse.executed();
    assert_eq!(executed.len(), 2);
    assert!(executed[0].starts_with("COPY staging_events FROM 's3://udacity-dend/log_data'"));
    assert!(executed[0].contains("FORMAT AS JSON 's3://udacity-dend/log_json_path.json'"));
    assert!(executed[0].contains("TIMEFORMAT AS 'epochmillisecs'"));
    assert!(executed[1].starts_with("COPY staging_songs FROM 's3://udacity-dend/song_data'"));
    assert!(executed[1].contains("JSON 'auto'"));

    for sql in &executed {
        assert!(sql.contains("CREDENTIALS 'aws_iam_role=arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(sql.contains("REGION 'us-west-2'"));
    }

    assert_eq!(report.stage, "load");
    assert_eq!(report.total_rows(), 2 * 8056);
    assert_eq!(
        report
            .outcome("copy staging_songs")
            .map(|o| o.rows_affected),
        Some(8056)
    );
}

#[tokio::test]
async fn test_load_with_auto_jsonpath() {
    let warehouse = RecordingWarehouse::new();
    let mut config = default_config();
    config.s3.log_jsonpath = "auto".to_string();

    Stager::new(&warehouse, &config).load().await.unwrap();

    assert!(warehouse.executed()[0].contains("FORMAT AS JSON 'auto'"));
}

#[tokio::test]
async fn test_load_unsupported_for_postgres() {
    let warehouse = RecordingWarehouse::new();
    let config = config(Dialect::Postgres, CommitMode::PerStatement, UserDedup::Latest);

    let err = Stager::new(&warehouse, &config).load().await.unwrap_err();

    assert!(matches!(err, WarehouseError::Unsupported(_)));
    assert!(warehouse.executed().is_empty());
}

#[tokio::test]
async fn test_failed_events_load_skips_songs() {
    let warehouse = RecordingWarehouse::new().failing_on("COPY staging_events");
    let config = default_config();

    let err = Stager::new(&warehouse, &config).load().await.unwrap_err();

    match err {
        WarehouseError::StatementFailed { label, message } => {
            assert_eq!(label, "copy staging_events");
            assert!(message.contains("simulated failure"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(warehouse.executed().len(), 1);
}
