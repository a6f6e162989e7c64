//! Cross-domain flows through the app shell

use std::sync::Arc;

use picshelf_client::App;
use picshelf_client::config::ClientConfig;
use picshelf_client::domains::upload::PickedFile;
use picshelf_client::infra::services::api::ApiService;
use picshelf_client::infra::testing::TestApiService;
use picshelf_model::{Envelope, FileId};

fn app_over(api: &TestApiService) -> App {
    let shared: Arc<dyn ApiService> = Arc::new(api.clone());
    App::with_api(ClientConfig::default(), shared)
}

fn fill_upload(app: &App) {
    app.upload.set_title("New arrival");
    app.upload.set_description("Fresh from the camera");
    app.upload
        .select_file(PickedFile::new("new.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]))
        .unwrap();
}

#[tokio::test]
async fn start_loads_unfiltered_first_page() {
    let api = TestApiService::with_images(20);
    let app = app_over(&api);

    app.start().await;
    assert_eq!(app.gallery.len(), 12);
    assert_eq!(app.gallery.search_query(), "");
}

#[tokio::test]
async fn completed_upload_closes_panel_and_reloads_with_current_filter() {
    let api = TestApiService::with_images(20);
    let mut app = app_over(&api);
    app.start().await;
    app.search("new").await;
    assert!(app.gallery.is_empty());

    app.open_upload_panel();
    fill_upload(&app);
    let outcome = app.submit_upload().await;

    assert!(outcome.is_completed());
    assert!(!app.is_upload_panel_open());
    let images = app.gallery.images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].title, "New arrival");

    let last = api.list_calls().pop().unwrap();
    assert_eq!(last.search.as_deref(), Some("new"));
    assert_eq!(last.cursor, None);
}

#[tokio::test]
async fn failed_upload_does_not_reload() {
    let api = TestApiService::with_images(3);
    api.set_upload_response(Envelope::failure("500", "bad size"));
    let mut app = app_over(&api);
    app.start().await;
    let calls_before = api.list_calls().len();

    app.open_upload_panel();
    fill_upload(&app);
    let outcome = app.submit_upload().await;

    assert!(!outcome.is_completed());
    assert!(app.is_upload_panel_open());
    assert_eq!(api.list_calls().len(), calls_before);
    assert_eq!(app.upload.draft().title, "New arrival");
}

#[tokio::test]
async fn closing_the_panel_discards_the_draft() {
    let api = TestApiService::default();
    let mut app = app_over(&api);
    app.open_upload_panel();
    fill_upload(&app);

    app.close_upload_panel();
    assert!(!app.upload.can_submit());
    assert!(app.upload.selected_file_name().is_none());
}

#[tokio::test]
async fn preview_opens_for_known_images_and_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let api = TestApiService::with_images(2);
    api.insert_blob("img-0001", vec![0xFF, 0xD8, 0xFF, 0xDB]);
    let mut app = app_over(&api);
    app.start().await;

    assert!(app.open_preview(&FileId::new("missing")).await.is_none());

    let preview = app.open_preview(&FileId::new("img-0001")).await.unwrap();
    assert_eq!(preview.title, "Image 1");

    let saved = app.download_active(Some(dir.path())).await.unwrap().unwrap();
    assert_eq!(saved.file_name().unwrap(), "Image 1.jpg");

    app.close_preview().await;
    assert!(app.active_preview().is_none());
    assert!(app.download_active(None).await.is_none());
}
