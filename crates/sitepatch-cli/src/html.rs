//! Regex-level view of an HTML page.
//!
//! Pages are treated as text: only the handful of elements the patcher
//! touches are located, and everything else is preserved byte for byte.

use std::sync::OnceLock;

use regex::Regex;
use sitepatch_engine::PageDocument;

pub const PARAGRAPH_MARK: &str = "data-sp-paragraph";
pub const CATEGORY_MARK: &str = "data-sp-catdesc";
pub const SLOGAN_MARK: &str = "data-sp-slogan";

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($pattern).expect("valid html pattern"))
        }
    };
}

cached_regex!(title_re, r"(?is)<title\b[^>]*>(.*?)</title\s*>");
cached_regex!(
    meta_description_re,
    r#"(?is)<meta\b[^>]*\bname\s*=\s*(?:"description"[^>]*|'description'[^>]*|description(?:[\s/][^>]*)?)>"#
);
cached_regex!(content_attr_re, r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#);
cached_regex!(h1_re, r"(?is)<h1\b[^>]*>(.*?)</h1\s*>");
cached_regex!(img_re, r"(?is)<img\b[^>]*>");
cached_regex!(p_re, r"(?is)<p\b[^>]*>.*?</p\s*>");
cached_regex!(html_open_re, r"(?is)<html\b[^>]*>");
cached_regex!(html_close_re, r"(?i)</html\s*>");
cached_regex!(head_open_re, r"(?is)<head\b[^>]*>");
cached_regex!(head_close_re, r"(?i)</head\s*>");
cached_regex!(body_open_re, r"(?is)<body\b[^>]*>");
cached_regex!(body_close_re, r"(?i)</body\s*>");
cached_regex!(main_open_re, r"(?is)<main\b[^>]*>");
cached_regex!(
    hidden_re,
    r"(?is)<!--.*?-->|<head\b[^>]*>.*?</head\s*>|<title\b[^>]*>.*?</title\s*>|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>"
);
cached_regex!(tag_re, r"(?s)<[^>]*>");
cached_regex!(space_re, r"\s+");
cached_regex!(listing_words_re, r"(?i)browse|gallery|collection|images");

/// Where a category blurb ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Replaced,
    Inserted,
}

impl Placement {
    pub fn label(self) -> &'static str {
        match self {
            Placement::Replaced => "replaced",
            Placement::Inserted => "inserted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    html: String,
}

impl HtmlPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.html.contains(marker)
    }

    /// Body text a reader would see, whitespace collapsed. Head content
    /// (title included) is not counted.
    pub fn visible_text(&self) -> String {
        let without_hidden = hidden_re().replace_all(&self.html, " ");
        let without_tags = tag_re().replace_all(&without_hidden, " ");
        let decoded = decode_entities(&without_tags);
        space_re().replace_all(decoded.trim(), " ").to_string()
    }

    /// Puts a category blurb under the first `<h1>`, replacing a short
    /// boilerplate paragraph there when one exists.
    pub fn place_category_description(&mut self, text: &str) -> Option<Placement> {
        let block = format!(r#"<p {CATEGORY_MARK}="1">{}</p>"#, escape_text(text));
        if let Some(h1) = h1_re().find(&self.html) {
            let after = h1.end();
            if let Some(p) = p_re().find_at(&self.html, after) {
                let segment = p.as_str();
                let boilerplate = !segment.contains(PARAGRAPH_MARK)
                    && segment.chars().count() < 220
                    && listing_words_re().is_match(segment);
                let range = p.range();
                if boilerplate {
                    self.html.replace_range(range, &block);
                    return Some(Placement::Replaced);
                }
            }
            self.html.insert_str(after, &format!("\n{block}\n"));
            return Some(Placement::Inserted);
        }
        let at = main_open_re()
            .find(&self.html)
            .or_else(|| body_open_re().find(&self.html))?
            .end();
        self.html.insert_str(at, &format!("\n{block}\n"));
        Some(Placement::Inserted)
    }

    /// Adds a subtitle line after the first `<h1>`, else at the top of `<body>`.
    pub fn insert_slogan(&mut self, slogan: &str) -> bool {
        let Some(at) = h1_re()
            .find(&self.html)
            .or_else(|| body_open_re().find(&self.html))
            .map(|m| m.end())
        else {
            return false;
        };
        let block = format!(
            "\n<p class=\"sp-sub\" {SLOGAN_MARK}=\"1\" style=\"opacity:.9;margin:6px 0 12px\">{}</p>\n",
            escape_text(slogan)
        );
        self.html.insert_str(at, &block);
        true
    }

    /// Byte offset just inside `</head>`, creating the head when missing.
    fn head_insert_point(&mut self) -> usize {
        if let Some(close) = head_close_re().find(&self.html) {
            return close.start();
        }
        if let Some(at) = head_open_re().find(&self.html).map(|m| m.end()) {
            self.html.insert_str(at, "</head>");
            return at;
        }
        let at = html_open_re().find(&self.html).map(|m| m.end()).unwrap_or(0);
        self.html.insert_str(at, "<head></head>");
        at + "<head>".len()
    }
}

impl PageDocument for HtmlPage {
    fn title(&self) -> String {
        title_re()
            .captures(&self.html)
            .and_then(|caps| caps.get(1))
            .map(|inner| decode_entities(inner.as_str()).trim().to_string())
            .unwrap_or_default()
    }

    fn set_title(&mut self, title: &str) {
        let escaped = escape_text(title);
        if let Some(inner) = title_re()
            .captures(&self.html)
            .and_then(|caps| caps.get(1))
            .map(|inner| inner.range())
        {
            self.html.replace_range(inner, &escaped);
            return;
        }
        let at = self.head_insert_point();
        self.html.insert_str(at, &format!("<title>{escaped}</title>"));
    }

    fn meta_description(&self) -> String {
        meta_description_re()
            .find(&self.html)
            .and_then(|tag| content_attr_re().captures(tag.as_str()))
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|value| decode_entities(value.as_str()).trim().to_string())
            .unwrap_or_default()
    }

    fn set_meta_description(&mut self, description: &str) {
        let tag = format!(
            r#"<meta name="description" content="{}">"#,
            escape_attr(description)
        );
        if let Some(existing) = meta_description_re().find(&self.html).map(|m| m.range()) {
            self.html.replace_range(existing, &tag);
            return;
        }
        let at = self.head_insert_point();
        self.html.insert_str(at, &tag);
    }

    fn visible_text_len(&self) -> usize {
        self.visible_text().chars().count()
    }

    fn first_heading(&self) -> Option<String> {
        let inner = h1_re().captures(&self.html)?.get(1)?.as_str().to_string();
        let text = tag_re().replace_all(&inner, " ");
        let text = space_re()
            .replace_all(decode_entities(&text).trim(), " ")
            .to_string();
        (!text.is_empty()).then_some(text)
    }

    fn insert_paragraph(&mut self, text: &str) {
        if self.has_marker(PARAGRAPH_MARK) {
            return;
        }
        let block = format!(r#"<p {PARAGRAPH_MARK}="1">{}</p>"#, escape_text(text));
        if let Some(at) = h1_re()
            .find(&self.html)
            .or_else(|| img_re().find(&self.html))
            .map(|m| m.end())
        {
            self.html.insert_str(at, &format!("\n{block}"));
            return;
        }
        if let Some(at) = body_close_re().find(&self.html).map(|m| m.start()) {
            self.html.insert_str(at, &format!("{block}\n"));
            return;
        }
        let wrapped = format!("<body>{block}</body>");
        match html_close_re().find(&self.html).map(|m| m.start()) {
            Some(at) => self.html.insert_str(at, &wrapped),
            None => self.html.push_str(&wrapped),
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
