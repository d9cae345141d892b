use crate::seed::RandomStream;

/// Separator placed before each padding fragment.
pub const PAD_SEPARATOR: &str = " — ";

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Shortens `text` to at most `max` characters.
///
/// The cut backs off to the last whitespace when the remaining head keeps at
/// least 80% of `max`; otherwise it is a hard cut at `max`.
pub fn clamp(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    if let Some(idx) = cut.rfind(char::is_whitespace) {
        let head = &cut[..idx];
        if char_len(head) >= max * 4 / 5 {
            return head.to_string();
        }
    }
    cut
}

/// Words a cut can strand at the end of a fragment.
const DANGLING_WORDS: [&str; 9] = ["and", "with", "in", "on", "of", "for", "the", "a", "—"];

/// Drops trailing connectives and separators left by a word-boundary cut,
/// stopping before the text would fall under `floor` characters.
pub fn trim_dangling(text: &str, floor: usize) -> String {
    let mut out = text;
    while let Some((rest, last)) = out.rsplit_once(' ') {
        let rest = rest.trim_end_matches([',', ' ']);
        if !DANGLING_WORDS.contains(&last) || char_len(rest) < floor {
            break;
        }
        out = rest;
    }
    out.to_string()
}

/// Appends fillers until `text` reaches `min` characters or none are left.
/// Each filler is drawn from `rand` and used at most once.
pub fn pad(text: &str, min: usize, rand: &mut RandomStream, fillers: &[String]) -> String {
    let mut out = text.to_string();
    let mut remaining = fillers.iter().collect::<Vec<_>>();
    while char_len(&out) < min {
        let Some(idx) = rand.index(remaining.len()) else {
            break;
        };
        let filler = remaining.remove(idx);
        out.push_str(PAD_SEPARATOR);
        out.push_str(filler);
    }
    out
}
