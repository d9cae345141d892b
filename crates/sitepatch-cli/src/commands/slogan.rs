use anyhow::Result;
use serde_json::json;
use sitepatch_engine::blurbs::pick_slogan;
use sitepatch_engine::map_object;

use super::SiteContext;
use crate::html::{HtmlPage, SLOGAN_MARK};
use crate::site::{read_page, site_name, write_with_backup, WriteOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SloganOutcome {
    Inserted(String),
    AlreadyPresent,
    NoIndexPage,
    NoSlogans,
    NoInsertPoint,
}

impl SloganOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SloganOutcome::Inserted(_) => "inserted",
            SloganOutcome::AlreadyPresent => "already-present",
            SloganOutcome::NoIndexPage => "no-index",
            SloganOutcome::NoSlogans => "no-slogans",
            SloganOutcome::NoInsertPoint => "no-insert-point",
        }
    }
}

/// Puts the site's slogan under the heading of the root `index.html`.
pub fn run_slogan(ctx: &SiteContext) -> Result<SloganOutcome> {
    let outcome = insert_root_slogan(ctx)?;
    match &outcome {
        SloganOutcome::Inserted(slogan) => println!("[slogan] inserted: {slogan}"),
        other => println!("[slogan] skipped: {}", other.label()),
    }
    Ok(outcome)
}

fn insert_root_slogan(ctx: &SiteContext) -> Result<SloganOutcome> {
    let path = ctx.root.join("index.html");
    if !path.is_file() {
        return Ok(SloganOutcome::NoIndexPage);
    }
    let original = read_page(&path)?;
    let mut doc = HtmlPage::new(original.clone());
    if doc.has_marker(SLOGAN_MARK) {
        return Ok(SloganOutcome::AlreadyPresent);
    }
    let Some(slogan) = pick_slogan(&ctx.config.slogans, &site_name(&ctx.root)) else {
        return Ok(SloganOutcome::NoSlogans);
    };
    if !doc.insert_slogan(slogan) {
        return Ok(SloganOutcome::NoInsertPoint);
    }

    if let WriteOutcome::Previewed(diff) =
        write_with_backup(&path, &original, doc.as_str(), ctx.dry_run)?
    {
        print!("{diff}");
    }
    if let Some(events) = ctx.event_writer() {
        events.emit("slogan_inserted", map_object(json!({ "slogan": slogan })))?;
    }
    Ok(SloganOutcome::Inserted(slogan.to_string()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{run_slogan, SloganOutcome};
    use crate::commands::{SiteContext, SiteOptions};

    #[test]
    fn slogan_is_inserted_once() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path().join("lumen");
        fs::create_dir_all(&root)?;
        fs::write(root.join("index.html"), "<body><h1>Lumen</h1></body>")?;
        let ctx = SiteContext::resolve(SiteOptions {
            root: Some(root.clone()),
            ..SiteOptions::default()
        })?;

        let SloganOutcome::Inserted(slogan) = run_slogan(&ctx)? else {
            panic!("expected an insert");
        };
        let html = fs::read_to_string(root.join("index.html"))?;
        assert!(html.contains(&slogan));
        assert!(html.contains("data-sp-slogan"));

        assert_eq!(run_slogan(&ctx)?, SloganOutcome::AlreadyPresent);
        Ok(())
    }

    #[test]
    fn missing_index_is_reported() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let ctx = SiteContext::resolve(SiteOptions {
            root: Some(temp.path().to_path_buf()),
            ..SiteOptions::default()
        })?;
        assert_eq!(run_slogan(&ctx)?, SloganOutcome::NoIndexPage);
        Ok(())
    }
}
