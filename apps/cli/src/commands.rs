//! Command implementations

use anyhow::{Context, Result};
use jsonviews_engine::{CompiledView, ViewCompiler, ViewSpec};
use jsonviews_store::{JsonFileStore, PutOutcome, ViewManager};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use crate::config::Config;

/// Read and parse a view definition file.
pub async fn read_view(path: &Path) -> Result<ViewSpec> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read view file {}", path.display()))?;
    parse_view(&text).with_context(|| format!("Invalid view in {}", path.display()))
}

fn parse_view(text: &str) -> Result<ViewSpec> {
    let json: Value = serde_json::from_str(text).context("View file is not valid JSON")?;
    Ok(ViewSpec::from_json(&json)?)
}

/// Documents as a JSON array, a single object, or one JSON value per line.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Documents are not a valid JSON array");
    }
    if let Ok(single) = serde_json::from_str::<Value>(trimmed) {
        return Ok(vec![single]);
    }
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid JSON on line {}", i + 1))
        })
        .collect()
}

/// Write one `{"key": ..., "value": ...}` line per row, documents in order.
pub fn write_rows<W: Write>(out: &mut W, view: &CompiledView, documents: &[Value]) -> Result<usize> {
    let mut count = 0;
    for document in documents {
        for row in view.index.rows(document) {
            serde_json::to_writer(&mut *out, &row)?;
            out.write_all(b"\n")?;
            count += 1;
        }
    }
    Ok(count)
}

pub async fn check(view: &Path) -> Result<()> {
    let spec = read_view(view).await?;
    println!("{}", serde_json::to_string_pretty(&spec.to_json())?);
    Ok(())
}

pub async fn rows(config: &Config, view: &Path, docs: Option<&Path>) -> Result<()> {
    let spec = read_view(view).await?;
    let compiled = ViewCompiler::new(config.compile).compile(&spec);

    let text = match docs {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read documents from {}", path.display()))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read documents from stdin")?;
            text
        }
    };
    let documents = parse_documents(&text)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let count = write_rows(&mut out, &compiled, &documents)?;
    out.flush()?;

    tracing::info!(documents = documents.len(), rows = count, "Generated rows");
    Ok(())
}

fn manager(config: &Config, store: Option<PathBuf>) -> ViewManager<JsonFileStore> {
    let path = store.unwrap_or_else(|| config.store.path.clone());
    tracing::debug!(store = %path.display(), "Opening document store");
    ViewManager::with_compiler(JsonFileStore::new(path), ViewCompiler::new(config.compile))
}

pub async fn add(
    config: &Config,
    group: &str,
    name: &str,
    view: &Path,
    store: Option<PathBuf>,
) -> Result<()> {
    let spec = read_view(view).await?;
    let rev = manager(config, store).add_view(group, name, &spec).await?;
    println!("{}", rev);
    Ok(())
}

pub async fn put(
    config: &Config,
    group: &str,
    name: &str,
    view: &Path,
    store: Option<PathBuf>,
) -> Result<()> {
    let spec = read_view(view).await?;
    match manager(config, store).put_view(group, name, &spec).await? {
        PutOutcome::Written(rev) => println!("{}", rev),
        PutOutcome::Unchanged => println!("unchanged"),
    }
    Ok(())
}

pub async fn remove(config: &Config, group: &str, name: &str, store: Option<PathBuf>) -> Result<()> {
    let rev = manager(config, store).remove_view(group, name).await?;
    println!("{}", rev);
    Ok(())
}

pub async fn list(config: &Config, group: &str, store: Option<PathBuf>) -> Result<()> {
    for name in manager(config, store).list_views(group).await? {
        println!("{}", name);
    }
    Ok(())
}
