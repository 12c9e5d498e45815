mod common;

use common::{logged_in, FakeBackend};
use portal_client::api::announcements::Announcements;
use portal_client::api::homework::HomeworkAssignments;
use portal_client::api::test_papers::TestPapers;
use portal_client::api::{dashboard, students};
use portal_client::error::PortalError;
use portal_client::models::{ResourceType, Role};
use portal_client::prompt::Scripted;
use portal_client::router::Route;
use portal_client::workflow::ListState;
use portal_client::Portal;

fn assert_logged_out(portal: &Portal) {
    assert!(portal.session.load().unwrap().is_none());
    assert_eq!(portal.navigator.current(), Route::Login);
    assert!(portal.open("/admin").is_redirect());
    assert!(portal.open("/student").is_redirect());
}

#[tokio::test]
async fn expired_token_on_student_list_logs_out() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Student).await;
    let mut homework = portal
        .mount::<HomeworkAssignments>("/student/homework")
        .unwrap();

    backend.expire_sessions();
    let err = homework.reload().await.unwrap_err();

    assert!(matches!(err, PortalError::SessionExpired));
    assert_eq!(err.to_string(), "Session expired. Please login again.");
    assert!(!homework.is_mounted());
    assert_logged_out(&portal);
}

#[tokio::test]
async fn expired_token_on_admin_upload_logs_out() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut announcements = portal
        .mount::<Announcements>("/admin/announcements")
        .unwrap();
    announcements.draft_mut().title = "Holiday".to_string();
    announcements.draft_mut().message = "Closed on Friday".to_string();

    backend.expire_sessions();
    let err = announcements.submit().await.unwrap_err();

    assert!(matches!(err, PortalError::SessionExpired));
    assert_logged_out(&portal);
}

#[tokio::test]
async fn expired_token_on_recycle_bin_logs_out() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut bin = portal.mount_recycle_bin().unwrap();

    backend.expire_sessions();
    let err = bin
        .restore(ResourceType::Homework, "homework1", &Scripted::approve())
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::SessionExpired));
    assert_logged_out(&portal);
}

#[tokio::test]
async fn expired_token_on_plain_calls_logs_out() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    backend.expire_sessions();

    assert!(matches!(
        students::list(&portal.client).await,
        Err(PortalError::SessionExpired)
    ));
    assert_logged_out(&portal);

    let healthy = FakeBackend::new();
    let unaffected = logged_in(&healthy, Role::Student).await;
    let backend = FakeBackend::new();
    let student = logged_in(&backend, Role::Student).await;
    backend.expire_sessions();
    assert!(matches!(
        dashboard::fetch(&student.client, Role::Student).await,
        Err(PortalError::SessionExpired)
    ));
    assert_logged_out(&student);
    // a portal on another backend keeps its session
    assert_eq!(unaffected.session.role(), Some(Role::Student));
}

#[tokio::test]
async fn other_failures_keep_the_session() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut tests = portal.mount::<TestPapers>("/admin/tests").unwrap();

    // unknown id answers 404, not 401
    let err = tests
        .soft_delete("missing", &Scripted::approve())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.is_retriable());
    assert_eq!(portal.session.role(), Some(Role::Admin));
    assert!(tests.is_mounted());
    assert!(matches!(tests.state(), ListState::Loading));
}
