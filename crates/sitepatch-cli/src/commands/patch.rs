use anyhow::{Context, Result};
use serde_json::json;
use sitepatch_contracts::allocation::{AllocationStore, JsonFileStore, MemoryStore};
use sitepatch_contracts::events::EventWriter;
use sitepatch_contracts::pools::{PoolRegistry, PoolSelector};
use sitepatch_contracts::runs::miss_log::{MissLog, MissSink};
use sitepatch_contracts::runs::summary::{write_summary, RunSummary};
use sitepatch_contracts::PageIdentity;
use sitepatch_engine::{map_object, KeywordAllocator, KeywordSource, PageOutcome, PatchEngine};

use super::SiteContext;
use crate::html::HtmlPage;
use crate::site::{html_files, read_page, site_key, write_with_backup, WriteOutcome};

const PROGRESS_EVERY: usize = 500;

/// Fixes every page under the site root that fails the quality gate.
///
/// A dry run reads the persisted keyword state but keeps all new
/// allocations in memory, and prints diffs instead of writing pages.
pub fn run_patch(ctx: &SiteContext) -> Result<RunSummary> {
    let registry = PoolRegistry::load_dir(&ctx.keywords_dir)?;
    let selector = PoolSelector::new(registry);
    let key = site_key(&ctx.root);
    let mut store = JsonFileStore::in_dir(&ctx.keywords_dir);

    match ctx.event_writer() {
        Some(events) => {
            let allocator =
                KeywordAllocator::new(&key, store, selector, MissLog::in_dir(&ctx.logs_dir))?;
            let engine =
                PatchEngine::new(&ctx.config, &ctx.brand, allocator).with_events(events.clone());
            patch_pages(ctx, engine, events.run_id(), Some(&events))
        }
        None => {
            let state = store.load(&key)?;
            let allocator = KeywordAllocator::new(
                &key,
                MemoryStore::with_state(&key, state),
                selector,
                Vec::<String>::new(),
            )?;
            let engine = PatchEngine::new(&ctx.config, &ctx.brand, allocator);
            patch_pages(ctx, engine, "dry-run", None)
        }
    }
}

fn patch_pages<S: AllocationStore, M: MissSink>(
    ctx: &SiteContext,
    mut engine: PatchEngine<S, M>,
    run_id: &str,
    events: Option<&EventWriter>,
) -> Result<RunSummary> {
    let files = html_files(&ctx.root, &ctx.config)?;
    let mut summary = RunSummary::started(run_id);
    if let Some(events) = events {
        events.emit(
            "run_started",
            map_object(json!({
                "root": ctx.root.display().to_string(),
                "brand": ctx.brand,
                "pages": files.len(),
            })),
        )?;
    }

    for (idx, path) in files.iter().enumerate() {
        let Some(page) = PageIdentity::from_paths(&ctx.root, path) else {
            continue;
        };
        let original = read_page(path)?;
        let mut doc = HtmlPage::new(original.clone());
        summary.total_pages += 1;

        let outcome = engine
            .patch(&page, &mut doc)
            .with_context(|| format!("failed to patch {page}"))?;
        match outcome {
            PageOutcome::Skipped(_) => summary.skipped_pages += 1,
            PageOutcome::Patched(report) => {
                match report.keyword_source {
                    KeywordSource::Inferred => summary.keyword_misses += 1,
                    KeywordSource::Reused => summary.reused_keywords += 1,
                    KeywordSource::Existing | KeywordSource::Pool => {}
                }
                let written = write_with_backup(path, &original, doc.as_str(), ctx.dry_run)?;
                if let WriteOutcome::Previewed(diff) = &written {
                    print!("{diff}");
                }
                if written.changed() {
                    summary.modified_pages += 1;
                }
            }
        }

        if (idx + 1) % PROGRESS_EVERY == 0 {
            println!("[progress] {}/{} pages", idx + 1, files.len());
        }
    }

    summary.durable = engine.allocator().is_durable();
    summary.finish();
    println!(
        "[done] root={} total={} modified={}",
        ctx.root.display(),
        summary.total_pages,
        summary.modified_pages
    );

    if let Some(events) = events {
        let extra = map_object(json!({ "root": ctx.root.display().to_string() }));
        write_summary(&ctx.summary_path(), &summary, Some(&extra))?;
        events.emit("run_finished", map_object(serde_json::to_value(&summary)?))?;
    }
    Ok(summary)
}
