use std::path::Path;

use anyhow::{Context, Result};
use sitepatch_contracts::allocation::{AllocationStore, JsonFileStore, MemoryStore};
use sitepatch_contracts::pools::{PoolRegistry, PoolSelector};
use sitepatch_contracts::PageIdentity;
use sitepatch_engine::{
    infer_keyword, stream_for, KeywordAllocator, KeywordSource, PageDocument, PatchEngine, Purpose,
    QualityVerdict, SynthesizedContent,
};

use super::SiteContext;
use crate::html::HtmlPage;
use crate::site::{read_page, site_key, site_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewReport {
    pub page: PageIdentity,
    pub verdict: QualityVerdict,
    pub keyword: String,
    pub keyword_source: KeywordSource,
    pub content: SynthesizedContent,
    /// Seed fingerprint of every purpose stream for this page.
    pub fingerprints: Vec<(Purpose, String)>,
}

/// Shows what `patch` would do to one page without recording anything.
pub fn run_preview(ctx: &SiteContext, page_path: &Path) -> Result<PreviewReport> {
    let report = preview_page(ctx, page_path)?;
    let thresholds = ctx.config.quality;
    let failures = report.verdict.failures(&thresholds);
    println!("[page] {}", report.page);
    println!(
        "[verdict] rewrite={} title={} description={} body={} failing=[{}]",
        report.verdict.needs_rewrite,
        report.verdict.title_len,
        report.verdict.description_len,
        report.verdict.visible_text_len,
        failures.join(",")
    );
    println!("[keyword] {} ({})", report.keyword, report.keyword_source.label());
    println!("[title] {}", report.content.title);
    println!("[description] {}", report.content.description);
    println!("[paragraph] {}", report.content.paragraph);
    for (purpose, fingerprint) in &report.fingerprints {
        println!("[seed] {} {fingerprint}", purpose.label());
    }
    Ok(report)
}

fn preview_page(ctx: &SiteContext, page_path: &Path) -> Result<PreviewReport> {
    let path = if page_path.is_absolute() {
        page_path.to_path_buf()
    } else {
        ctx.root.join(page_path)
    };
    if !path.is_file() {
        anyhow::bail!("page {} does not exist", path.display());
    }
    let page = PageIdentity::from_paths(&ctx.root, &path)
        .with_context(|| format!("{} is outside {}", path.display(), ctx.root.display()))?;
    let doc = HtmlPage::new(read_page(&path)?);

    let key = site_key(&ctx.root);
    let state = JsonFileStore::in_dir(&ctx.keywords_dir).load(&key)?;
    let selector = PoolSelector::new(PoolRegistry::load_dir(&ctx.keywords_dir)?);
    let allocator = KeywordAllocator::new(
        &key,
        MemoryStore::with_state(&key, state),
        selector,
        Vec::<String>::new(),
    )?;
    let engine = PatchEngine::new(&ctx.config, &ctx.brand, allocator);

    let verdict = engine.assess(&doc.title(), &doc.meta_description(), doc.visible_text_len());
    let allocation = engine.allocator().peek(&page, &page.directory_context());
    let keyword_source = KeywordSource::of(&allocation);
    let keyword = match allocation.keyword() {
        Some(keyword) => keyword.to_string(),
        None => infer_keyword(doc.first_heading().as_deref(), page.stem()),
    };
    let content = engine.synthesize(&keyword, page.as_str());

    let site = site_name(&ctx.root);
    let fingerprints = Purpose::ALL
        .into_iter()
        .map(|purpose| {
            let key = match purpose {
                Purpose::Slogan => site.as_str(),
                _ => page.as_str(),
            };
            (purpose, stream_for(purpose, key).fingerprint())
        })
        .collect();

    Ok(PreviewReport {
        page,
        verdict,
        keyword,
        keyword_source,
        content,
        fingerprints,
    })
}
