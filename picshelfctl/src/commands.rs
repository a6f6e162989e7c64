use anyhow::{Context, Result, bail};
use picshelf_client::{App, ClientConfig};
use picshelf_client::domains::gallery::LoadOutcome;
use picshelf_client::domains::upload::UploadOutcome;
use picshelf_model::{FileId, ImageSummary};
use tracing::info;

use crate::{DownloadArgs, ListArgs, UploadArgs};

fn build_app(config: ClientConfig) -> Result<App> {
    App::new(config).context("failed to create API client")
}

pub(crate) async fn list(mut config: ClientConfig, args: ListArgs) -> Result<()> {
    if let Some(limit) = args.limit {
        if limit == 0 {
            bail!("--limit must be at least 1");
        }
        config.page_size = limit;
    }
    let app = build_app(config)?;
    let query = args.search.unwrap_or_default();

    let mut outcome = app.search(&query).await;
    let mut pages = 1;
    loop {
        if let LoadOutcome::Failed(err) = outcome {
            return Err(anyhow::Error::new(err).context("failed to list images"));
        }
        let more_wanted = args.all || pages < args.pages;
        if !more_wanted || !app.gallery.has_more() {
            break;
        }
        outcome = app.gallery.load_next_page().await;
        pages += 1;
    }

    for image in app.gallery.images() {
        println!("{}", format_row(&image));
    }
    info!(
        count = app.gallery.len(),
        has_more = app.gallery.has_more(),
        "listing done"
    );
    Ok(())
}

fn format_row(image: &ImageSummary) -> String {
    let size = image
        .dimensions()
        .map(|(w, h)| format!("{w}x{h}"))
        .unwrap_or_else(|| "-".to_string());
    format!("{}\t{}\t{}\t{}", image.file_id, size, image.content_type, image.title)
}

pub(crate) async fn upload(config: ClientConfig, args: UploadArgs) -> Result<()> {
    let mut app = build_app(config)?;
    app.open_upload_panel();

    app.upload
        .select_path(&args.path)
        .await
        .with_context(|| format!("cannot upload {}", args.path.display()))?;
    app.upload.set_title(args.title);
    app.upload.set_description(args.description);
    app.upload.set_dimensions(args.width, args.height);

    match app.submit_upload().await {
        UploadOutcome::Completed { message } => {
            println!("{message}");
            Ok(())
        }
        UploadOutcome::Failed { message } => bail!("Upload failed: {message}"),
        UploadOutcome::Incomplete => {
            bail!("title, description and file are all required")
        }
    }
}

pub(crate) async fn download(
    config: ClientConfig,
    args: DownloadArgs,
) -> Result<()> {
    let app = build_app(config)?;
    let image = ImageSummary::new(args.file_id.as_str(), args.title)
        .with_content_type(args.content_type);
    let preview = app.preview.open(&image);
    let dir = args.out.unwrap_or_else(|| app.config().download_dir.clone());

    let path = app
        .preview
        .download(&preview, &dir)
        .await
        .with_context(|| format!("failed to download {}", args.file_id))?;
    println!("{}", path.display());
    Ok(())
}

pub(crate) fn url(config: ClientConfig, file_id: &str) -> Result<()> {
    let app = build_app(config)?;
    println!("{}", app.api().image_url(&FileId::new(file_id)));
    Ok(())
}
