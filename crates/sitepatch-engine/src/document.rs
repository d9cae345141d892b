/// The parts of a parsed page the engine reads and writes.
pub trait PageDocument {
    /// Current `<title>` text, empty when absent.
    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);
    /// Current meta description, empty when absent.
    fn meta_description(&self) -> String;
    fn set_meta_description(&mut self, description: &str);
    /// Length in characters of the page text with whitespace runs collapsed.
    fn visible_text_len(&self) -> usize;
    /// Text of the first top-level heading, if it has any.
    fn first_heading(&self) -> Option<String>;
    fn insert_paragraph(&mut self, text: &str);
}

/// Keyword used when no pool covers the page: the first heading, else the
/// file stem with `_` and `-` read as spaces.
pub fn infer_keyword(heading: Option<&str>, stem: &str) -> String {
    if let Some(heading) = heading.map(str::trim).filter(|text| !text.is_empty()) {
        return heading.to_string();
    }
    stem.replace(['_', '-'], " ").trim().to_string()
}
