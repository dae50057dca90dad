mod common;

use common::FakeReportServer;
use ssrs_cli::api::{PolicyInfo, ReportServerApi};
use ssrs_cli::state::{ConsoleError, PolicyEditor, PolicyScope};
use std::sync::Arc;

fn sales_policies() -> Vec<PolicyInfo> {
    vec![
        PolicyInfo::new("BUILTIN\\Administrators", ["Content Manager"]),
        PolicyInfo::new("CONTOSO\\analysts", ["Browser", "Report Builder"]),
    ]
}

fn server() -> Arc<FakeReportServer> {
    let fake = FakeReportServer::sales_catalog();
    fake.set_item_policies("/Sales", sales_policies());
    Arc::new(fake)
}

#[tokio::test]
async fn test_set_then_get_round_trips() {
    let fake = server();
    let policies = vec![
        PolicyInfo::new("CONTOSO\\finance", ["Browser", "Publisher"]),
        PolicyInfo::new("CONTOSO\\auditors", ["Browser"]),
    ];

    fake.set_policies("/Sales/Q1", &policies).await.unwrap();
    let fetched = fake.get_policies("/Sales/Q1").await.unwrap();
    assert_eq!(fetched, policies);
}

#[tokio::test]
async fn test_dirty_flag_follows_load_edit_save() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake.clone(), PolicyScope::Item("/Sales".into()));

    editor.load().await.unwrap();
    assert!(!editor.has_unsaved_changes());
    assert!(!editor.can_save());

    editor.grant_role("CONTOSO\\analysts", "Publisher").unwrap();
    assert!(editor.has_unsaved_changes());
    assert!(editor.can_save());

    editor.save().await.unwrap();
    assert!(!editor.has_unsaved_changes());
    assert_eq!(editor.saved_policies(), editor.policies());

    let stored = fake.get_policies("/Sales").await.unwrap();
    assert_eq!(stored, editor.policies());
}

#[tokio::test]
async fn test_load_fetches_policies_and_roles_together() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake.clone(), PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    assert_eq!(editor.policies(), sales_policies().as_slice());
    assert_eq!(editor.assignable_roles().len(), 4);
    assert!(fake.was_called("get-policies:/Sales"));
    assert!(fake.was_called("roles:catalog"));
    assert!(!fake.was_called("roles:system"));
}

#[tokio::test]
async fn test_grant_is_idempotent_and_revoke_removes_one() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake, PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    editor.grant_role("CONTOSO\\analysts", "Browser").unwrap();
    assert!(!editor.has_unsaved_changes());

    assert!(editor.revoke_role("CONTOSO\\analysts", "Report Builder"));
    assert!(!editor.revoke_role("CONTOSO\\analysts", "Report Builder"));
    let diff = editor.diff();
    assert_eq!(diff.changed.len(), 1);
    assert_eq!(diff.changed[0].after, vec!["Browser".to_string()]);

    // Undoing the edit makes the editor clean again
    editor.grant_role("CONTOSO\\analysts", "Report Builder").unwrap();
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_add_and_remove_policies() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake, PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    editor.add_policy("CONTOSO\\finance", ["Browser"]).unwrap();
    editor.add_policy("CONTOSO\\finance", ["Publisher", "Browser"]).unwrap();
    let finance: Vec<&PolicyInfo> = editor.filter_policies("finance");
    assert_eq!(finance.len(), 1);
    assert_eq!(finance[0].roles, vec!["Browser", "Publisher"]);

    assert!(editor.remove_policy("BUILTIN\\Administrators"));
    let diff = editor.diff();
    assert_eq!(diff.added, vec![PolicyInfo::new("CONTOSO\\finance", ["Browser", "Publisher"])]);
    assert_eq!(diff.removed, vec![PolicyInfo::new("BUILTIN\\Administrators", ["Content Manager"])]);

    editor.discard_changes();
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_roles_outside_the_scope_are_rejected() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake, PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    let err = editor.grant_role("CONTOSO\\analysts", "System Administrator").unwrap_err();
    assert!(matches!(err, ConsoleError::UnknownRole { ref role, .. } if role == "System Administrator"));
    assert!(editor.set_roles("CONTOSO\\analysts", ["Browser", "Nope"]).is_err());
    assert!(!editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_system_scope_uses_system_roles_and_endpoints() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake.clone(), PolicyScope::System);
    editor.load().await.unwrap();
    assert!(editor.policies().is_empty());

    editor.grant_role("CONTOSO\\ops", "System User").unwrap();
    editor.save().await.unwrap();

    assert!(fake.was_called("roles:system"));
    assert!(fake.was_called("set-system-policies"));
    let stored = fake.get_system_policies().await.unwrap();
    assert_eq!(stored, vec![PolicyInfo::new("CONTOSO\\ops", ["System User"])]);
}

#[tokio::test]
async fn test_failed_save_keeps_changes_pending() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake.clone(), PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();
    editor.set_roles("CONTOSO\\analysts", ["Browser"]).unwrap();

    fake.fail("set-policies:/Sales");
    let err = editor.save().await.unwrap_err();
    assert!(matches!(err, ConsoleError::Persistence { .. }));
    assert!(editor.has_unsaved_changes());
}

#[tokio::test]
async fn test_save_before_load_is_rejected() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake.clone(), PolicyScope::Item("/Sales".into()));
    assert!(matches!(editor.save().await, Err(ConsoleError::NotReady(_))));
    assert!(!fake.was_called("set-policies:/Sales"));
}

#[tokio::test]
async fn test_filter_roles() {
    let fake = server();
    let mut editor = PolicyEditor::new(fake, PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    let names: Vec<&str> = editor
        .filter_roles("content")
        .into_iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["Content Manager"]);
}

#[tokio::test]
async fn test_repeated_identity_is_merged_on_load() {
    let fake = FakeReportServer::sales_catalog();
    fake.set_item_policies(
        "/Sales",
        vec![
            PolicyInfo::new("CONTOSO\\analysts", ["Browser"]),
            PolicyInfo::new("BUILTIN\\Administrators", ["Content Manager"]),
            PolicyInfo::new("CONTOSO\\analysts", ["Report Builder", "Browser"]),
        ],
    );
    let mut editor = PolicyEditor::new(Arc::new(fake), PolicyScope::Item("/Sales".into()));
    editor.load().await.unwrap();

    assert_eq!(editor.policies().len(), 2);
    assert_eq!(editor.policies()[0], PolicyInfo::new("CONTOSO\\analysts", ["Browser", "Report Builder"]));
    assert!(!editor.has_unsaved_changes());

    assert!(editor.revoke_role("CONTOSO\\analysts", "Report Builder"));
    let diff = editor.diff();
    assert_eq!(diff.changed.len(), 1);
    assert_eq!(diff.changed[0].after, vec!["Browser".to_string()]);
}
