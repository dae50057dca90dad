mod common;

use common::FakeReportServer;
use ssrs_cli::state::{ConsoleError, FolderBrowser};
use std::sync::Arc;

#[tokio::test]
async fn test_navigate_loads_folder_contents() {
    let fake = Arc::new(FakeReportServer::sales_catalog());
    let browser = FolderBrowser::new(fake.clone());

    let contents = browser.navigate("/Sales").await;
    assert!(!contents.is_loading);
    assert!(contents.error.is_none());

    let listing = contents.data.unwrap();
    let folders: Vec<&str> = listing.folders.iter().map(|f| f.name.as_str()).collect();
    let reports: Vec<&str> = listing.reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(folders, vec!["Q1", "Q2"]);
    assert_eq!(reports, vec!["Revenue"]);
    assert_eq!(fake.count_calls("browse:"), 1);
}

#[tokio::test]
async fn test_stale_browse_result_never_overwrites_newer_path() {
    let fake = Arc::new(FakeReportServer::sales_catalog());
    let gate = fake.hold("browse:/Sales/Q1");
    let browser = FolderBrowser::new(fake.clone());

    let slow = browser.navigate("/Sales/Q1");
    let fast = async {
        while !fake.was_called("browse:/Sales/Q1") {
            tokio::task::yield_now().await;
        }
        let newer = browser.navigate("/Sales/Q2").await;
        gate.add_permits(1);
        newer
    };
    let (stale, newer) = tokio::join!(slow, fast);

    assert_eq!(newer.data.as_ref().unwrap().current_path, "/Sales/Q2");
    // The late Q1 response was dropped, so its caller sees the Q2 state too
    assert_eq!(stale.data.as_ref().unwrap().current_path, "/Sales/Q2");

    let snapshot = browser.snapshot().await;
    assert_eq!(browser.current_path().await, "/Sales/Q2");
    assert_eq!(snapshot.data.unwrap().current_path, "/Sales/Q2");
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_failure_clears_data_and_records_error() {
    let fake = Arc::new(FakeReportServer::sales_catalog());
    let browser = FolderBrowser::new(fake.clone());
    browser.navigate("/Sales").await;

    fake.fail("browse:/Sales");
    let contents = browser.refetch().await;
    assert!(contents.data.is_none());
    assert!(matches!(contents.error, Some(ConsoleError::Load { .. })));
    assert_eq!(contents.error.unwrap().api_error().and_then(|e| e.status()), Some(500));
}

#[tokio::test]
async fn test_breadcrumbs_and_go_up() {
    let fake = Arc::new(FakeReportServer::sales_catalog());
    let browser = FolderBrowser::new(fake.clone());
    browser.navigate("Sales/Q1/").await;

    let labels: Vec<String> = browser.breadcrumbs().await.into_iter().map(|(label, _)| label).collect();
    assert_eq!(labels, vec!["Home", "Sales", "Q1"]);

    let parent = browser.go_up().await;
    assert_eq!(parent.data.unwrap().current_path, "/Sales");
    assert_eq!(browser.current_path().await, "/Sales");
}
