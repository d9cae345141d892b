use sitepatch_contracts::config::SiteConfig;
use sitepatch_contracts::PageIdentity;

use crate::seed::{stream_for, Purpose};
use crate::template::expand;

/// Category listing pages: `index.html` or `page*` inside a configured category directory.
pub fn is_category_page(page: &PageIdentity, config: &SiteConfig) -> bool {
    let Some(dir) = page.parent_dir() else {
        return false;
    };
    if !config.is_category_dir(&dir) {
        return false;
    }
    let name = page.file_name().to_lowercase();
    name == "index.html" || name.starts_with("page")
}

/// Per-page category blurb from spintax templates.
#[derive(Debug, Clone)]
pub struct CategoryDescriber {
    templates: Vec<String>,
}

impl CategoryDescriber {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    /// One stream picks the template and then resolves its groups.
    pub fn describe(&self, page: &PageIdentity) -> Option<String> {
        let mut rand = stream_for(Purpose::CategoryDescription, page.as_str());
        let template = rand.choose(&self.templates)?.clone();
        Some(expand(&template, &mut rand))
    }
}

/// Stable slogan for a site.
pub fn pick_slogan<'a>(slogans: &'a [String], site_name: &str) -> Option<&'a str> {
    let mut rand = stream_for(Purpose::Slogan, site_name);
    rand.choose(slogans).map(String::as_str)
}
