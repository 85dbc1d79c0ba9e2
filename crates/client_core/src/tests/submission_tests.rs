use super::*;
use crate::test_support::{country, ApiCall, FakeCityApi};
use shared::domain::CityValue;

fn persisted(id: i64) -> City {
    City {
        id: CityId(id),
        name: "Antwerp".into(),
        logo: Some("AAEC".into()),
        country: Some(country(32, "Belgium")),
    }
}

#[test]
fn value_without_identity_routes_to_create() {
    let request = SaveRequest::for_value(
        CityValue::New(NewCity::new("Namur")),
        LogoFile::placeholder(),
    );
    assert!(matches!(request, SaveRequest::Create { ref fields, .. } if fields.name == "Namur"));
    assert_eq!(request.target(), None);
}

#[test]
fn persisted_value_routes_to_multipart_update() {
    let request = SaveRequest::for_value(
        CityValue::Persisted(persisted(7)),
        LogoFile::placeholder(),
    );
    match request {
        SaveRequest::PartialUpdate { id, fields, logo } => {
            assert_eq!(id, CityId(7));
            assert_eq!(fields.country, Some(CountryId(32)));
            assert!(logo.is_placeholder());
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn clearing_logo_builds_full_replace() {
    let request = SaveRequest::clearing_logo(persisted(3));
    assert_eq!(request.kind(), "full_replace");
    assert!(matches!(request, SaveRequest::FullReplace { ref city } if city.logo.is_none()));
}

#[test]
fn placeholder_is_zero_length_zip() {
    let placeholder = LogoFile::placeholder();
    assert!(placeholder.bytes.is_empty());
    assert_eq!(placeholder.mime_type, "application/zip");
}

#[test]
fn mime_type_follows_extension() {
    assert_eq!(mime_for_path(Path::new("logo.PNG")), "image/png");
    assert_eq!(mime_for_path(Path::new("logo.jpeg")), "image/jpeg");
    assert_eq!(mime_for_path(Path::new("logo")), "application/octet-stream");
}

#[tokio::test]
async fn reads_logo_file_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("mark.gif");
    tokio::fs::write(&path, b"GIF89a").await.expect("write");

    let file = LogoFile::from_path(&path).await.expect("read");
    assert_eq!(file.file_name, "mark.gif");
    assert_eq!(file.mime_type, "image/gif");
    assert_eq!(file.bytes, b"GIF89a".to_vec());

    let missing = LogoFile::from_path(dir.path().join("nope.png")).await;
    assert!(matches!(missing, Err(CityClientError::Io { .. })));
}

#[tokio::test]
async fn saving_flag_is_cleared_on_success_and_failure() {
    let api = FakeCityApi::new();
    let coordinator = SubmissionCoordinator::new(api.clone());
    assert!(!coordinator.is_saving());

    coordinator
        .submit(SaveRequest::clearing_logo(persisted(1)))
        .await
        .expect("saved");
    assert!(!coordinator.is_saving());

    *api.fail_saves.lock().await = true;
    coordinator
        .submit(SaveRequest::clearing_logo(persisted(1)))
        .await
        .expect_err("must fail");
    assert!(!coordinator.is_saving());
}

#[tokio::test]
async fn one_transport_call_per_request() {
    let api = FakeCityApi::new();
    let coordinator = SubmissionCoordinator::new(api.clone());
    coordinator
        .submit(SaveRequest::for_value(
            CityValue::New(NewCity::new("Mons")),
            LogoFile::placeholder(),
        ))
        .await
        .expect("created");
    coordinator
        .submit(SaveRequest::for_value(
            CityValue::Persisted(persisted(9)),
            LogoFile::new("a.png", "image/png", vec![9]),
        ))
        .await
        .expect("updated");

    let calls = api.calls.lock().await.clone();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], ApiCall::Create { .. }));
    assert!(matches!(calls[1], ApiCall::UpdateWithFile { ref city, .. } if city.id == CityId(9)));
}
