mod common;

use common::{logged_in, FakeBackend};
use portal_client::api::announcements::{AnnouncementDraft, Announcements};
use portal_client::api::homework::{HomeworkAssignments, HomeworkDraft};
use portal_client::api::test_papers::{TestDraft, TestPapers};
use portal_client::error::{PortalError, ValidationError};
use portal_client::models::{ResourceType, Role, TargetType};
use portal_client::prompt::Scripted;
use portal_client::transport::{Attachment, Body, Method};
use portal_client::workflow::{ListState, Notice};
use serde_json::json;

fn pdf(name: &str) -> Attachment {
    Attachment::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

fn test_draft() -> TestDraft {
    TestDraft {
        title: "Unit Test 1".to_string(),
        test_date: "2026-02-10".to_string(),
        max_marks: "50".to_string(),
        pdf: Some(pdf("unit1.pdf")),
        ..TestDraft::default()
    }
}

#[tokio::test]
async fn batch_target_without_batch_never_reaches_the_api() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut tests = portal.mount::<TestPapers>("/admin/tests").unwrap();
    let sent_before = backend.request_count();

    *tests.draft_mut() = TestDraft {
        target_type: TargetType::Batch,
        target_value: "   ".to_string(),
        ..test_draft()
    };
    let err = tests.submit().await.unwrap_err();

    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::MissingBatch)
    ));
    assert_eq!(backend.request_count(), sent_before);
    assert_eq!(
        tests.notice(),
        Some(&Notice::Error("Please select a batch".to_string()))
    );
    // the draft survives so the user can fix it
    assert_eq!(tests.draft().title, "Unit Test 1");
}

#[tokio::test]
async fn student_target_without_student_never_reaches_the_api() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let sent_before = backend.request_count();

    let mut homework = portal.mount::<HomeworkAssignments>("/admin/homework").unwrap();
    *homework.draft_mut() = HomeworkDraft {
        title: "Essay".to_string(),
        description: "Write 300 words".to_string(),
        due_date: "2026-02-12".to_string(),
        target_type: TargetType::Student,
        ..HomeworkDraft::default()
    };
    assert!(homework.submit().await.is_err());

    let mut announcements = portal
        .mount::<Announcements>("/admin/announcements")
        .unwrap();
    *announcements.draft_mut() = AnnouncementDraft {
        title: "Holiday".to_string(),
        message: "School closed on Friday".to_string(),
        target_type: TargetType::Student,
        ..AnnouncementDraft::default()
    };
    let err = announcements.submit().await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::Validation(ValidationError::MissingStudent)
    ));

    assert_eq!(backend.request_count(), sent_before);
}

#[tokio::test]
async fn created_test_appears_once_and_moves_to_the_bin() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut tests = portal.mount::<TestPapers>("/admin/tests").unwrap();

    tests.reload().await.unwrap();
    assert!(matches!(tests.state(), ListState::Empty));

    *tests.draft_mut() = TestDraft {
        target_type: TargetType::Batch,
        target_value: "Morning".to_string(),
        ..test_draft()
    };
    tests.submit().await.unwrap();

    let upload = backend
        .requests()
        .into_iter()
        .find(|r| r.method == Method::Post && r.path == "tests")
        .expect("upload request");
    match &upload.body {
        Body::Multipart(form) => {
            assert_eq!(form.field("assignedTo"), Some("BATCH"));
            assert_eq!(form.field("batch"), Some("Morning"));
            assert_eq!(form.attachment("pdf").map(|a| a.file_name.as_str()), Some("unit1.pdf"));
        }
        other => panic!("expected multipart body, got {:?}", other),
    }

    // submit reloads after the upload completes
    assert_eq!(tests.state().items().len(), 1);
    assert_eq!(tests.draft().title, "");
    assert!(matches!(tests.notice(), Some(Notice::Success(_))));

    let id = tests.state().items()[0].id.clone();
    assert!(tests.soft_delete(&id, &Scripted::approve()).await.unwrap());
    assert!(matches!(tests.state(), ListState::Empty));
    assert_eq!(backend.bin_count(ResourceType::Test), 1);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let backend = FakeBackend::new();
    let id = backend.seed(
        ResourceType::Announcement,
        json!({ "title": "Sports day", "message": "Bring shoes", "targetType": "ALL" }),
    );
    let portal = logged_in(&backend, Role::Admin).await;
    let mut announcements = portal
        .mount::<Announcements>("/admin/announcements")
        .unwrap();
    announcements.reload().await.unwrap();
    let sent_before = backend.request_count();

    let deleted = announcements
        .soft_delete(&id, &Scripted::deny())
        .await
        .unwrap();

    assert!(!deleted);
    assert_eq!(backend.request_count(), sent_before);
    assert_eq!(announcements.state().items().len(), 1);
}

#[tokio::test]
async fn students_see_assigned_homework_and_hand_it_in() {
    let backend = FakeBackend::new();
    let id = backend.seed(
        ResourceType::Homework,
        json!({
            "title": "Fractions worksheet",
            "description": "Page 12",
            "dueDate": "2099-01-01",
            "targetType": "ALL"
        }),
    );
    let portal = logged_in(&backend, Role::Student).await;
    let mut homework = portal
        .mount::<HomeworkAssignments>("/student/homework")
        .unwrap();
    homework.reload().await.unwrap();
    assert_eq!(homework.state().items().len(), 1);
    assert!(!homework.state().items()[0].submitted);

    let missing = homework.submit_work(&id, None).await.unwrap_err();
    assert_eq!(missing.to_string(), "Please select a file");

    homework
        .submit_work(&id, Some(pdf("answers.pdf")))
        .await
        .unwrap();
    assert!(homework.find(&id).unwrap().submitted);
    assert_eq!(backend.last_request().unwrap().path, "homework/student");
}

#[tokio::test]
async fn failed_upload_keeps_the_draft() {
    let backend = FakeBackend::new();
    let portal = logged_in(&backend, Role::Admin).await;
    let mut tests = portal.mount::<TestPapers>("/admin/tests").unwrap();
    *tests.draft_mut() = test_draft();

    backend.expire_sessions();
    assert!(tests.submit().await.is_err());
    assert_eq!(tests.draft().title, "Unit Test 1");
    assert!(tests.draft().pdf.is_some());
}

#[tokio::test]
async fn ids_are_sent_as_a_single_segment() {
    let backend = FakeBackend::new();
    backend.seed(ResourceType::Test, json!({ "title": "Unit Test 1" }));
    let portal = logged_in(&backend, Role::Admin).await;
    let mut tests = portal.mount::<TestPapers>("/admin/tests").unwrap();
    tests.reload().await.unwrap();

    let before = backend.request_count();
    let err = tests.soft_delete("..", &Scripted::approve()).await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(ValidationError::Invalid(_))));
    assert_eq!(backend.request_count(), before);
    assert!(matches!(tests.notice(), Some(Notice::Error(_))));

    let err = tests
        .soft_delete("../../students/deactivate/x", &Scripted::approve())
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Api { status: 404, .. }));
    let sent = backend.last_request().unwrap();
    assert_eq!(sent.method, Method::Patch);
    assert_eq!(sent.path, "tests/delete/..%2F..%2Fstudents%2Fdeactivate%2Fx");
    assert_eq!(backend.active_count(ResourceType::Test), 1);
}
