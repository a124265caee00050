//! End-to-end workflow tests against a file-backed store.
//!
//! Drives the public API the way the CLI does: unlock, edit, reload in a
//! fresh session, export, and deploy to a mock repository host.

use shield_cms::content::{GalleryCategory, SiteContent};
use shield_cms::credentials::DeployCredentials;
use shield_cms::export;
use shield_cms::gate::{AccessGate, MASTER_KEY};
use shield_cms::history::UploadHistory;
use shield_cms::kv::{FileKvStore, KeyValueStore};
use shield_cms::provider::{ContentProvider, use_content};
use shield_cms::site::{self, GalleryFilter};
use shield_cms::store::ContentStore;
use shield_cms::sync::{DeployState, Deployer, PushAction, RepoClient};
use shield_cms::upload::{UploadSession, UploadSettings, UploadStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_kv(dir: &Path) -> Arc<dyn KeyValueStore> {
    Arc::new(FileKvStore::open(dir).unwrap())
}

fn edited_content() -> SiteContent {
    let mut content = SiteContent::default();
    content.about.title = "Three Decades of Finishes".to_string();
    content.contact.whatsapp = "+61499888777".to_string();
    content.gallery.retain(|item| item.category != GalleryCategory::Commercial);
    content
}

#[test]
fn edit_persists_across_sessions() {
    let tmp = TempDir::new().unwrap();

    {
        let kv = open_kv(tmp.path());
        let gate = AccessGate::new(kv.clone());
        gate.authenticate(MASTER_KEY).unwrap();

        let provider = ContentProvider::new(ContentStore::open(kv));
        let updates = provider.subscribe();
        provider
            .provide(|| use_content().update_all(edited_content()))
            .unwrap();
        assert_eq!(updates.try_recv().unwrap(), edited_content());
    }

    let kv = open_kv(tmp.path());
    assert!(AccessGate::new(kv.clone()).is_authenticated());
    assert_eq!(ContentStore::load(kv.as_ref()), edited_content());
}

#[test]
fn corrupt_storage_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let kv = open_kv(tmp.path());
    kv.set("shield_cms_data", "{ not json").unwrap();
    kv.set("sfs_previous_uploads", "nope").unwrap();

    assert_eq!(ContentStore::load(kv.as_ref()), SiteContent::default());
    assert!(UploadHistory::load(kv).entries().is_empty());
}

#[test]
fn preview_reflects_edits() {
    let tmp = TempDir::new().unwrap();
    let kv = open_kv(tmp.path());
    ContentStore::open(kv.clone())
        .commit(edited_content())
        .unwrap();

    let out = tmp.path().join("preview");
    let provider = ContentProvider::new(ContentStore::open(kv));
    provider
        .provide(|| {
            site::render_site(&out, GalleryFilter::Only(GalleryCategory::Commercial))
        })
        .unwrap();

    let about = std::fs::read_to_string(out.join("about.html")).unwrap();
    assert!(about.contains("Three Decades of Finishes"));
    let gallery = std::fs::read_to_string(out.join("gallery.html")).unwrap();
    assert!(gallery.contains("No projects found in this category"));
    let home = std::fs::read_to_string(out.join("index.html")).unwrap();
    assert!(home.contains("https://wa.me/61499888777?text="));
}

#[tokio::test]
async fn upload_then_reuse_from_history() {
    let tmp = TempDir::new().unwrap();
    let kv = open_kv(tmp.path());
    let image = tmp.path().join("hallway.png");
    std::fs::write(&image, b"\x89PNG").unwrap();

    let settings = UploadSettings {
        simulated_delay: Duration::from_millis(5),
        ..UploadSettings::default()
    };
    let mut history = UploadHistory::load(kv.clone());
    let mut session = UploadSession::new(settings.clone());
    session.select_file(&image, &mut history).await.unwrap();
    assert_eq!(session.status(), UploadStatus::Success);

    // A later invocation sees the cached entry.
    let history = UploadHistory::load(kv);
    let id = history.entries()[0].id.clone();
    let mut later = UploadSession::new(settings);
    let selected = later.use_history_image(&history, &id).unwrap();
    assert_eq!(selected.meta.name, "hallway.png");
    assert!(selected.data.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn oversized_upload_leaves_history_empty() {
    let tmp = TempDir::new().unwrap();
    let kv = open_kv(tmp.path());
    let image = tmp.path().join("huge.jpg");
    std::fs::File::create(&image)
        .unwrap()
        .set_len(6 * 1024 * 1024)
        .unwrap();

    let mut history = UploadHistory::load(kv.clone());
    let mut session = UploadSession::new(UploadSettings {
        simulated_delay: Duration::ZERO,
        ..UploadSettings::default()
    });
    session.select_file(&image, &mut history).await.unwrap();

    assert_eq!(session.status(), UploadStatus::Error);
    assert_eq!(
        session.error_message(),
        Some("File too large (Maximum size is 5MB)")
    );
    assert!(UploadHistory::load(kv).entries().is_empty());
}

#[test]
fn export_archive_embeds_current_content() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join(export::DEFAULT_ARCHIVE_NAME);
    export::write_archive(&edited_content(), &target).unwrap();

    let file = std::fs::File::open(&target).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut constants = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("constants.tsx").unwrap(), &mut constants)
        .unwrap();
    assert!(constants.contains("Three Decades of Finishes"));
    assert!(constants.contains("export const TESTIMONIALS_DATA = [];"));
}

#[tokio::test]
async fn deploy_pushes_generated_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/sfs/site/contents/constants.tsx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sha": "old"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let kv = open_kv(tmp.path());
    let creds = DeployCredentials {
        token: "ghp_integration".into(),
        owner: "sfs".into(),
        repo: "site".into(),
    };
    creds.save(kv.as_ref()).unwrap();

    let client = RepoClient::new().unwrap().with_base_url(server.uri());
    let mut deployer = Deployer::new(client, Duration::from_secs(5));
    let report = deployer
        .deploy(&DeployCredentials::load(kv.as_ref()), &edited_content())
        .await
        .unwrap();

    assert_eq!(deployer.state(), DeployState::Success);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].action, PushAction::Updated);
    assert_eq!(report.files[1].action, PushAction::Created);

    let pushed: serde_json::Value = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .unwrap();
    let decoded = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        pushed["content"].as_str().unwrap(),
    )
    .unwrap();
    assert!(String::from_utf8(decoded).unwrap().contains("Three Decades of Finishes"));
}

#[tokio::test]
async fn deploy_without_credentials_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = RepoClient::new().unwrap().with_base_url(server.uri());
    let mut deployer = Deployer::new(client, Duration::from_secs(5));
    let err = deployer
        .deploy(&DeployCredentials::default(), &SiteContent::default())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Please provide GitHub Token, Username, and Repo Name."
    );
    assert!(matches!(deployer.state(), DeployState::Error(_)));
}
