// src/main.rs

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polscrape::{
    aggregate::CompatibilityTable,
    fetch::{self, directory::ProfileReference},
    render::{DocumentRenderer, PandocRenderer},
    transform,
};
use reqwest::Client;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Semaphore;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const OUTPUT_DIR: &str = "output";
const AGGREGATE_FILE: &str = "country_compatibilities.csv";
const MAX_IN_FLIGHT: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configure output dir ─────────────────────────────────────
    let out_dir = PathBuf::from(OUTPUT_DIR);
    fs::create_dir_all(&out_dir)?;

    // ─── 3) resolve the country directory ────────────────────────────
    let client = Client::new();
    let profiles = fetch::directory::collect_profiles(&client)
        .await
        .context("resolving country directory")?;
    let total = profiles.len();
    info!("{} country profiles discovered", total);

    // ─── 4) fetch + transform + render, bounded concurrency ──────────
    // The resolver keeps duplicate entries, so output names are
    // disambiguated up front; concurrent tasks must never share a path.
    let stems = fetch::directory::output_stems(&profiles);
    let renderer: Arc<dyn DocumentRenderer> = Arc::new(PandocRenderer::default());
    let sem = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let progress = ProgressBar::new(total as u64);
    let mut handles = Vec::with_capacity(total);

    for (profile, stem) in profiles.into_iter().zip(stems) {
        let client = client.clone();
        let renderer = Arc::clone(&renderer);
        let sem = Arc::clone(&sem);
        let out_dir = out_dir.clone();
        let progress = progress.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let result = process_profile(&client, renderer, &profile, &stem, &out_dir).await;
            progress.inc(1);
            (stem, result)
        }));
    }

    // ─── 5) collect ratings, isolate per-country failures ────────────
    let mut table = CompatibilityTable::new();
    let mut failures = Vec::new();
    for joined in futures::future::join_all(handles).await {
        let (name, result) = joined.context("worker task panicked")?;
        match result {
            Ok(Some(rating)) => table.insert(&name, rating),
            Ok(None) => info!(country = %name, "no rating on page"),
            Err(err) => failures.push((name, format!("{:#}", err))),
        }
    }
    progress.finish_and_clear();

    // ─── 6) write aggregate table ────────────────────────────────────
    if !table.is_empty() {
        let csv_path = out_dir.join(AGGREGATE_FILE);
        table
            .write_csv(&csv_path)
            .context("writing aggregate table")?;
        info!("wrote {} rated countries to {}", table.len(), csv_path.display());
    }

    // ─── 7) report failures ──────────────────────────────────────────
    if !failures.is_empty() {
        for (name, err) in &failures {
            error!(country = %name, "{err}");
        }
        anyhow::bail!("{} of {} profiles failed", failures.len(), total);
    }

    info!("all done");
    Ok(())
}

/// Run the full pipeline for one country: fetch, transform, render. Returns
/// the extracted rating, if the page carried one. Output files are named by
/// `stem`, which is unique within the batch; the intermediate Markdown
/// lives in a per-country temp dir that is dropped after rendering.
async fn process_profile(
    client: &Client,
    renderer: Arc<dyn DocumentRenderer>,
    profile: &ProfileReference,
    stem: &str,
    out_dir: &Path,
) -> Result<Option<String>> {
    let html = fetch::pages::fetch_page(client, &profile.url)
        .await
        .with_context(|| format!("fetching {}", profile.url))?;
    let page = transform::transform_page(&html)
        .with_context(|| format!("transforming {}", profile.short_name))?;

    let tmp = tempfile::tempdir()?;
    let md_path = tmp.path().join(format!("{}.md", stem));
    fs::write(&md_path, &page.markdown)?;

    let pdf_path = out_dir.join(format!("{}.pdf", stem));
    tokio::task::spawn_blocking(move || {
        let result = renderer.render(&md_path, &pdf_path);
        drop(tmp);
        result
    })
    .await
    .context("renderer task panicked")??;

    info!(country = %stem, "rendered");
    Ok(page.rating)
}
