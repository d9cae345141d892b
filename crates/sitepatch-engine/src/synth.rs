use sitepatch_contracts::config::{FacetPools, LengthWindows};

use crate::compose::{char_len, clamp, pad, trim_dangling};
use crate::facets::Facets;
use crate::seed::{stream_for, Purpose};

const CLOSING_SENTENCE: &str = " Pages load quickly and related links help deeper viewing.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedContent {
    pub title: String,
    pub description: String,
    pub paragraph: String,
}

/// Builds title, description and body copy for a keyword.
///
/// Every method is a pure function of its arguments: the seed (normally the
/// page identity) keys one stream per field.
#[derive(Debug, Clone, Default)]
pub struct ContentSynthesizer {
    windows: LengthWindows,
    facets: FacetPools,
}

impl ContentSynthesizer {
    pub fn new(windows: LengthWindows, facets: FacetPools) -> Self {
        Self { windows, facets }
    }

    pub fn windows(&self) -> &LengthWindows {
        &self.windows
    }

    pub fn synthesize(&self, keyword: &str, brand: &str, seed: &str) -> SynthesizedContent {
        SynthesizedContent {
            title: self.title(keyword, brand, seed),
            description: self.description(keyword, seed),
            paragraph: self.paragraph(keyword, seed),
        }
    }

    pub fn title(&self, keyword: &str, brand: &str, seed: &str) -> String {
        let mut rand = stream_for(Purpose::Title, seed);
        let f = Facets::draw(&self.facets, &mut rand);
        let candidates = [
            format!("{keyword} {} portraits | {brand}", f.style),
            format!("{keyword} gallery — {} tone | {brand}", f.mood),
            format!("{keyword} photos, {} | {brand}", f.light),
            format!("High-quality {keyword} images — {} | {brand}", f.composition),
            format!("{keyword} {} lookbook | {brand}", f.mood),
        ];
        let mut title = rand.choose(&candidates).cloned().unwrap_or_default();
        if char_len(&title) < self.windows.title_min {
            title.push_str(&format!(" — {} {}", f.mood, f.style));
        }
        clamp(&title, self.windows.title_max)
    }

    pub fn description(&self, keyword: &str, seed: &str) -> String {
        let mut rand = stream_for(Purpose::Description, seed);
        let f = Facets::draw(&self.facets, &mut rand);
        let base = format!(
            "Explore {keyword} in {} style with {} vibe, {}, and {} framing. \
             Curated images on a fast, clean page.",
            f.style, f.mood, f.light, f.composition
        );
        let fillers = [
            format!("{} looks and {}", f.wardrobe, f.background),
            "Simple navigation helps discovery".to_string(),
            "Mobile-friendly layout for smooth viewing".to_string(),
            "Short notes keep context clear".to_string(),
            "Clean typography keeps focus on the visuals".to_string(),
        ];
        let padded = pad(&base, self.windows.description_min, &mut rand, &fillers);
        let clamped = clamp(&padded, self.windows.description_max);
        trim_dangling(&clamped, self.windows.description_max * 4 / 5)
    }

    pub fn paragraph(&self, keyword: &str, seed: &str) -> String {
        let mut rand = stream_for(Purpose::Paragraph, seed);
        let f = Facets::draw(&self.facets, &mut rand);
        let passages = [
            format!(
                "This set explores {keyword} through {} aesthetics and {} tone under {}. \
                 Compositions use {} with {}, keeping focus clear and tidy. \
                 Details like {} styling and balanced colors make browsing easy.",
                f.style, f.mood, f.light, f.composition, f.background, f.wardrobe
            ),
            format!(
                "Each frame shows {keyword} with {} energy, {} and {} styling built around {}. \
                 Expect {} looks against {}, arranged so the subject stays in focus.",
                f.mood, f.light, f.style, f.composition, f.wardrobe, f.background
            ),
        ];
        let mut passage = rand.choose(&passages).cloned().unwrap_or_default();
        if char_len(&passage) < self.windows.body_min {
            passage.push_str(CLOSING_SENTENCE);
        }
        clamp(&passage, self.windows.paragraph_max)
    }
}
