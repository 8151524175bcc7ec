//! Tests for the query pipeline service

use super::*;
use sqlprobe_analyzer::PlanRule;
use sqlprobe_core::fake::{FakeDriver, FakeResponse};
use sqlprobe_core::{ExplainConfig, ProbeError, RowSet, Value};

fn registry_with(driver: &Arc<FakeDriver>) -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry.register(driver.clone());
    registry
}

fn service_for(driver: &Arc<FakeDriver>, kind: BackendKind) -> QueryService {
    let config = ConnectionConfig::new(kind, "Server=fake");
    QueryService::new(config, &registry_with(driver)).unwrap()
}

fn orders_plan() -> RowSet {
    RowSet::from_values(
        &["id", "table", "type", "rows", "Extra"],
        vec![vec![
            Value::Integer(1),
            Value::Text("orders".into()),
            Value::Text("ALL".into()),
            Value::Integer(150000),
            Value::Text("Using where; Using filesort".into()),
        ]],
    )
}

mod construction_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unregistered_backend_fails_without_connecting() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        let registry = registry_with(&driver);
        let config = ConnectionConfig::new(BackendKind::SqlServer, "Server=fake");

        let err = QueryService::new(config, &registry).unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedBackend(ref name) if name == "sqlserver"));
        assert_eq!(driver.opened(), 0);
    }

    #[test]
    fn test_unknown_backend_name_fails() {
        assert!(matches!(
            ConnectionConfig::parse("postgres", "Server=fake"),
            Err(ProbeError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        let settings = ServiceSettings::from_toml_str(
            "[database]\ntype = \"MySQL\"\nconnection_string = \"Server=fake\"\n[execution]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let service = QueryService::from_settings(&settings, &registry_with(&driver)).unwrap();
        assert_eq!(service.backend(), BackendKind::MySql);
    }
}

mod execute_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_select_one_for_every_backend() {
        for kind in BackendKind::ALL {
            let driver = Arc::new(FakeDriver::new(kind));
            let outcome = service_for(&driver, kind).execute("SELECT 1").await;

            assert!(outcome.error().is_none());
            assert_eq!(outcome.results().unwrap().row_count(), 1);
            assert_eq!(driver.opened(), driver.closed());
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        let service = Arc::new(service_for(&driver, BackendKind::MySql));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.execute("SELECT 1").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }
        assert_eq!(driver.opened(), 16);
        assert_eq!(driver.closed(), 16);
    }
}

mod run_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_full_pipeline() {
        let driver = Arc::new(
            FakeDriver::new(BackendKind::MySql).with_explain_config(ExplainConfig::mysql()),
        );
        driver.script_rows(
            "SELECT * FROM orders ORDER BY total",
            RowSet::from_values(&["id", "total"], vec![vec![Value::Integer(7), Value::Float(9.5)]]),
        );
        driver.script_rows("EXPLAIN SELECT * FROM orders ORDER BY total", orders_plan());

        let response = service_for(&driver, BackendKind::MySql)
            .run("SELECT * FROM orders ORDER BY total")
            .await;

        assert!(!response.is_error());
        assert_eq!(response.results().unwrap().row_count(), 1);
        assert_eq!(
            response.query_plan(),
            Some("id: 1; table: orders; type: ALL; rows: 150000; Extra: Using where; Using filesort; ")
        );
        let rules: Vec<_> = response.suggestions().iter().map(|s| s.rule()).collect();
        assert_eq!(
            rules,
            vec![PlanRule::Filesort, PlanRule::FullTableScan, PlanRule::WhereFilter]
        );
        // One connection for the statement, one for its plan
        assert_eq!(driver.opened(), 2);
        assert_eq!(driver.closed(), 2);
    }

    #[tokio::test]
    async fn test_failed_execution_skips_plan() {
        let driver = Arc::new(FakeDriver::new(BackendKind::SqlServer));
        driver.script_error("SELEC 1", "Incorrect syntax near 'SELEC'.");

        let response = service_for(&driver, BackendKind::SqlServer).run("SELEC 1").await;

        assert_eq!(
            response.error(),
            Some("Execution error: Incorrect syntax near 'SELEC'.")
        );
        assert!(response.results().is_none());
        assert_eq!(driver.statements(), vec!["SELEC 1"]);
    }

    #[tokio::test]
    async fn test_plan_failure_still_succeeds_without_suggestions() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        // No scripted response for `EXPLAIN SELECT 1`

        let response = service_for(&driver, BackendKind::MySql).run("SELECT 1").await;

        assert!(!response.is_error());
        let plan = response.query_plan().unwrap();
        assert!(plan.starts_with("Error generating query plan: "));
        assert!(response.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_sql_server_plan_uses_showplan() {
        let driver = Arc::new(
            FakeDriver::new(BackendKind::SqlServer).with_explain_config(ExplainConfig::sql_server()),
        );
        driver.script("SET SHOWPLAN_ALL ON", FakeResponse::Affected(0));
        driver.script("SET SHOWPLAN_ALL OFF", FakeResponse::Affected(0));

        let response = service_for(&driver, BackendKind::SqlServer).run("SELECT 1").await;

        // With SHOWPLAN on the fake answers `SELECT 1` with its scripted row
        assert_eq!(response.query_plan(), Some("1: 1; "));
        assert_eq!(
            driver.statements(),
            vec!["SELECT 1", "SET SHOWPLAN_ALL ON", "SELECT 1", "SET SHOWPLAN_ALL OFF"]
        );
    }

    #[tokio::test]
    async fn test_empty_query_response() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        let response = service_for(&driver, BackendKind::MySql).run("  ").await;
        assert_eq!(response.error(), Some("Query must not be empty"));
        assert_eq!(driver.opened(), 0);
    }

    #[tokio::test]
    async fn test_custom_threshold_flows_to_analyzer() {
        let driver = Arc::new(FakeDriver::new(BackendKind::MySql));
        let config = ConnectionConfig::new(BackendKind::MySql, "Server=fake");
        let options = ServiceOptions::default()
            .with_analyzer(AnalyzerConfig::new().with_large_row_threshold(10));
        let service = QueryService::with_options(config, &registry_with(&driver), options).unwrap();

        assert_eq!(
            service.analyze("rows=11").iter().map(|s| s.rule()).collect::<Vec<_>>(),
            vec![PlanRule::LargeRowCount]
        );
    }
}
