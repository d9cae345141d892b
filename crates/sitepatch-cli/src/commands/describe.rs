use anyhow::Result;
use serde_json::json;
use sitepatch_contracts::PageIdentity;
use sitepatch_engine::blurbs::{is_category_page, CategoryDescriber};
use sitepatch_engine::map_object;

use super::SiteContext;
use crate::html::{HtmlPage, CATEGORY_MARK};
use crate::site::{html_files, read_page, write_with_backup, WriteOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeReport {
    pub category_pages: usize,
    pub described: usize,
    pub already_described: usize,
    pub no_insert_point: usize,
}

/// Adds a generated blurb to each category listing page that lacks one.
pub fn run_describe(ctx: &SiteContext) -> Result<DescribeReport> {
    let describer = CategoryDescriber::new(ctx.config.category_templates.clone());
    let events = ctx.event_writer();
    let mut report = DescribeReport::default();

    for path in html_files(&ctx.root, &ctx.config)? {
        let Some(page) = PageIdentity::from_paths(&ctx.root, &path) else {
            continue;
        };
        if !is_category_page(&page, &ctx.config) {
            continue;
        }
        report.category_pages += 1;

        let original = read_page(&path)?;
        let mut doc = HtmlPage::new(original.clone());
        if doc.has_marker(CATEGORY_MARK) {
            report.already_described += 1;
            continue;
        }
        let Some(text) = describer.describe(&page) else {
            continue;
        };
        let Some(placement) = doc.place_category_description(&text) else {
            println!("[skip] {page} no-insert-point");
            report.no_insert_point += 1;
            continue;
        };

        let written = write_with_backup(&path, &original, doc.as_str(), ctx.dry_run)?;
        if let WriteOutcome::Previewed(diff) = &written {
            print!("{diff}");
        }
        println!("[describe] {page} {}", placement.label());
        report.described += 1;
        if let Some(events) = &events {
            events.emit(
                "category_described",
                map_object(json!({
                    "page": page.as_str(),
                    "placement": placement.label(),
                })),
            )?;
        }
    }

    println!(
        "[done] category pages={} described={}",
        report.category_pages, report.described
    );
    Ok(report)
}
