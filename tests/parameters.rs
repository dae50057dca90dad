mod common;

use common::{FakeReportServer, parameter};
use ssrs_cli::api::ParameterType;
use ssrs_cli::state::{ConsoleError, ParameterSession, ParameterState, ParameterValue};
use std::sync::Arc;

fn server_with_year_report() -> Arc<FakeReportServer> {
    let fake = FakeReportServer::sales_catalog();
    fake.set_parameters(
        "/Finance/Budget",
        vec![
            parameter("Year", ParameterType::Integer, false, Some("2024")),
            parameter("Department", ParameterType::String, true, Some("All")),
            parameter("IncludeDrafts", ParameterType::Boolean, true, Some("false")),
        ],
    );
    fake.set_parameters(
        "/Finance/Forecast",
        vec![parameter("Year", ParameterType::Integer, false, None)],
    );
    Arc::new(fake)
}

#[tokio::test]
async fn test_select_report_seeds_defaults() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake);

    let state = session.select_report("/Finance/Budget").await;
    let values = state.values().unwrap();
    assert_eq!(values.get("Year"), Some(&ParameterValue::Integer(2024)));
    assert_eq!(values.get("Department"), Some(&ParameterValue::Text("All".into())));
    assert_eq!(values.get("IncludeDrafts"), Some(&ParameterValue::Boolean(false)));
    assert!(state.can_submit());
}

#[tokio::test]
async fn test_reset_restores_declared_defaults() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake);
    let loaded = session.select_report("/Finance/Budget").await;
    let defaults = loaded.values().cloned().unwrap();

    session.update_value("Year", "2031").await.unwrap();
    session.update_value("Department", "Marketing").await.unwrap();
    session.clear_value("IncludeDrafts").await.unwrap();
    assert_ne!(session.snapshot().await.values(), Some(&defaults));

    session.reset().await.unwrap();
    assert_eq!(session.snapshot().await.values(), Some(&defaults));
}

#[tokio::test]
async fn test_required_year_gates_submission() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake);
    session.select_report("/Finance/Forecast").await;

    assert!(!session.can_submit().await);
    assert_eq!(session.missing_required().await, vec!["Year"]);

    // Blank input leaves the value missing
    session.update_value("Year", "   ").await.unwrap();
    assert!(!session.can_submit().await);

    session.update_value("Year", "2025").await.unwrap();
    assert!(session.can_submit().await);
    assert!(session.missing_required().await.is_empty());

    session.clear_value("Year").await.unwrap();
    assert!(!session.can_submit().await);
}

#[tokio::test]
async fn test_update_value_keeps_state_ready() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake.clone());
    session.select_report("/Finance/Budget").await;

    let err = session.update_value("Year", "next year").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Coercion { .. }));
    assert_eq!(
        session.update_value("Quarter", "Q1").await.unwrap_err(),
        ConsoleError::UnknownParameter("Quarter".into())
    );

    let state = session.snapshot().await;
    assert!(state.is_ready());
    assert_eq!(state.values().unwrap().get("Year"), Some(&ParameterValue::Integer(2024)));
    assert_eq!(fake.count_calls("parameters:"), 1);
}

#[tokio::test]
async fn test_values_are_rejected_before_selection() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake);
    assert_eq!(
        session.update_value("Year", "2024").await.unwrap_err(),
        ConsoleError::NoSelection
    );
}

#[tokio::test]
async fn test_late_schema_for_previous_report_is_discarded() {
    let fake = server_with_year_report();
    let gate = fake.hold("parameters:/Finance/Budget");
    let session = ParameterSession::new(fake.clone());

    let slow = session.select_report("/Finance/Budget");
    let fast = async {
        while !fake.was_called("parameters:/Finance/Budget") {
            tokio::task::yield_now().await;
        }
        let state = session.select_report("/Finance/Forecast").await;
        gate.add_permits(1);
        state
    };
    tokio::join!(slow, fast);

    let state = session.snapshot().await;
    assert_eq!(state.report_path(), Some("/Finance/Forecast"));
    assert_eq!(state.parameters().len(), 1);
}

#[tokio::test]
async fn test_missing_schema_is_an_error_state() {
    let fake = server_with_year_report();
    let session = ParameterSession::new(fake);

    let state = session.select_report("/Finance/Missing").await;
    assert!(matches!(state, ParameterState::Failed { .. }));
    assert_eq!(state.error().and_then(|e| e.api_error()).and_then(|e| e.status()), Some(404));
    assert!(!state.can_submit());
}

#[tokio::test]
async fn test_typed_valid_values_accept_server_spelling() {
    let fake = FakeReportServer::sales_catalog();
    let mut active = parameter("Active", ParameterType::Boolean, false, None);
    active.valid_values = vec!["True".into(), "False".into()];
    let mut as_of = parameter("AsOf", ParameterType::DateTime, false, None);
    as_of.valid_values = vec!["2024-01-01T00:00:00".into(), "2024-06-30T00:00:00".into()];
    let mut rate = parameter("Rate", ParameterType::Float, true, None);
    rate.valid_values = vec!["10.0".into(), "12.5".into()];
    fake.set_parameters("/Finance/Ledger", vec![active, as_of, rate]);
    let session = ParameterSession::new(Arc::new(fake));
    session.select_report("/Finance/Ledger").await;

    session.update_value("Active", "True").await.unwrap();
    session.update_value("AsOf", "2024-01-01T00:00:00").await.unwrap();
    session.update_value("Rate", "10").await.unwrap();

    let state = session.snapshot().await;
    let values = state.values().unwrap();
    assert_eq!(values.get("Active"), Some(&ParameterValue::Boolean(true)));
    assert_eq!(values.get("AsOf").map(ToString::to_string), Some("2024-01-01".to_string()));
    assert_eq!(values.get("Rate"), Some(&ParameterValue::Float(10.0)));
    assert!(state.can_submit());

    let err = session.update_value("AsOf", "2024-03-01").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Coercion { ref parameter, .. } if parameter == "AsOf"));
}
