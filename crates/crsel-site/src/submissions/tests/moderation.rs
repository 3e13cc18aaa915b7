use super::common::*;
use crate::submissions::domain::{RecordId, RecordKind};
use crate::submissions::service::SubmissionError;
use crate::submissions::store::RecordStore;
use crate::submissions::validation::ContactForm;

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, SubmissionError>) {
    match result {
        Err(SubmissionError::Unauthorized) => {}
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_or_missing_key_is_rejected_for_every_operation() {
    let harness = harness().await;
    let contact = harness
        .submissions
        .submit_contact(contact_form())
        .await
        .expect("contact");
    let career = harness
        .submissions
        .submit_career(career_form("cv.pdf", pdf_bytes()))
        .await
        .expect("career");

    let moderation = &harness.moderation;
    let missing = missing_id();
    for key in [Some(WRONG_KEY), Some(""), None] {
        for id in [&contact.id, &career.id, &missing] {
            assert_unauthorized(moderation.mark_contact_read(key, id).await);
            assert_unauthorized(moderation.mark_career_read(key, id).await);
            assert_unauthorized(moderation.delete_contact(key, id).await);
            assert_unauthorized(moderation.delete_career(key, id).await);
            assert_unauthorized(moderation.career_cv(key, id).await);
        }
        assert_unauthorized(moderation.list_contacts(key).await);
        assert_unauthorized(moderation.list_careers(key).await);
    }

    // nothing was touched
    assert!(!harness.contacts.find(&contact.id).await.expect("find").expect("kept").is_read);
    assert!(harness.careers.find(&career.id).await.expect("find").is_some());
    assert_eq!(files_in(harness.upload_dir()).len(), 1);
}

#[tokio::test]
async fn list_contacts_returns_newest_first() {
    let harness = harness().await;
    let names = ["first", "second", "third", "fourth", "fifth"];
    for name in names {
        harness
            .submissions
            .submit_contact(ContactForm::new(name, "x@y.z", "hello"))
            .await
            .expect("contact");
    }

    let listed = harness
        .moderation
        .list_contacts(Some(ADMIN_KEY))
        .await
        .expect("list");
    let listed_names: Vec<&str> = listed.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(listed_names, vec!["fifth", "fourth", "third", "second", "first"]);
    assert!(listed
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[tokio::test]
async fn list_careers_returns_newest_first() {
    let harness = harness().await;
    let mut ids = Vec::new();
    for file in ["a.pdf", "b.doc", "c.docx"] {
        let record = harness
            .submissions
            .submit_career(career_form(file, pdf_bytes()))
            .await
            .expect("career");
        ids.push(record.id);
    }
    ids.reverse();

    let listed: Vec<RecordId> = harness
        .moderation
        .list_careers(Some(ADMIN_KEY))
        .await
        .expect("list")
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn mark_contact_read_reports_unknown_ids_and_updates_known_ones() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_contact(contact_form())
        .await
        .expect("contact");

    match harness
        .moderation
        .mark_contact_read(Some(ADMIN_KEY), &missing_id())
        .await
    {
        Err(SubmissionError::NotFound(RecordKind::Contact)) => {}
        other => panic!("expected not found, got {other:?}"),
    }

    let updated = harness
        .moderation
        .mark_contact_read(Some(ADMIN_KEY), &record.id)
        .await
        .expect("marked");
    assert!(updated.is_read);
    assert_eq!(updated.created_at, record.created_at);

    let listed = harness
        .moderation
        .list_contacts(Some(ADMIN_KEY))
        .await
        .expect("list");
    assert!(listed
        .iter()
        .find(|contact| contact.id == record.id)
        .expect("listed")
        .is_read);
}

#[tokio::test]
async fn mark_career_read_sets_flag() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_career(career_form("cv.pdf", pdf_bytes()))
        .await
        .expect("career");

    let updated = harness
        .moderation
        .mark_career_read(Some(ADMIN_KEY), &record.id)
        .await
        .expect("marked");
    assert!(updated.is_read);
    assert_eq!(updated.cv_path, record.cv_path);
}

#[tokio::test]
async fn delete_contact_removes_record_once() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_contact(contact_form())
        .await
        .expect("contact");

    harness
        .moderation
        .delete_contact(Some(ADMIN_KEY), &record.id)
        .await
        .expect("deleted");
    assert!(harness.contacts.find(&record.id).await.expect("find").is_none());

    assert!(matches!(
        harness
            .moderation
            .delete_contact(Some(ADMIN_KEY), &record.id)
            .await,
        Err(SubmissionError::NotFound(RecordKind::Contact))
    ));
}

#[tokio::test]
async fn delete_career_removes_record_and_cv() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_career(career_form("cv.pdf", pdf_bytes()))
        .await
        .expect("career");
    assert!(harness.cvs.exists(&record.cv_path).await.expect("exists"));

    harness
        .moderation
        .delete_career(Some(ADMIN_KEY), &record.id)
        .await
        .expect("deleted");

    assert!(harness.careers.find(&record.id).await.expect("find").is_none());
    assert!(!harness.cvs.exists(&record.cv_path).await.expect("exists"));
    assert!(files_in(harness.upload_dir()).is_empty());
    assert!(matches!(
        harness.moderation.career_cv(Some(ADMIN_KEY), &record.id).await,
        Err(SubmissionError::NotFound(RecordKind::Career))
    ));
}

#[tokio::test]
async fn delete_career_tolerates_an_already_missing_cv() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_career(career_form("cv.pdf", pdf_bytes()))
        .await
        .expect("career");
    harness.cvs.remove(&record.cv_path).await.expect("external removal");

    harness
        .moderation
        .delete_career(Some(ADMIN_KEY), &record.id)
        .await
        .expect("deleted despite missing cv");
    assert!(harness.careers.find(&record.id).await.expect("find").is_none());
}

#[tokio::test]
async fn career_cv_returns_bytes_under_original_name() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_career(career_form("Riya CV.pdf", pdf_bytes()))
        .await
        .expect("career");

    let download = harness
        .moderation
        .career_cv(Some(ADMIN_KEY), &record.id)
        .await
        .expect("download");

    assert_eq!(download.file_name, "Riya CV.pdf");
    assert_eq!(download.content_type, "application/pdf");
    assert_eq!(download.bytes, pdf_bytes());
}

#[tokio::test]
async fn career_cv_reports_missing_file_after_external_removal() {
    let harness = harness().await;
    let record = harness
        .submissions
        .submit_career(career_form("cv.pdf", pdf_bytes()))
        .await
        .expect("career");
    for file in files_in(harness.upload_dir()) {
        std::fs::remove_file(harness.upload_dir().join(file)).expect("remove");
    }

    assert!(matches!(
        harness.moderation.career_cv(Some(ADMIN_KEY), &record.id).await,
        Err(SubmissionError::FileMissing)
    ));
}

#[tokio::test]
async fn career_cv_reports_unknown_application() {
    let harness = harness().await;
    assert!(matches!(
        harness
            .moderation
            .career_cv(Some(ADMIN_KEY), &missing_id())
            .await,
        Err(SubmissionError::NotFound(RecordKind::Career))
    ));
}
