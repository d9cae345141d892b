use std::sync::OnceLock;

use regex::Regex;

use crate::seed::RandomStream;

fn group_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid spintax pattern"))
}

/// Expands `{a|b|c}` alternation groups, choosing each alternative uniformly.
///
/// Groups are flat. The leftmost brace-free group is replaced first and the
/// scan repeats until none is left, so a nested group resolves from the inside
/// out. `{}` and unbalanced braces stay literal.
pub fn expand(template: &str, rand: &mut RandomStream) -> String {
    let pattern = group_pattern();
    let mut out = template.to_string();
    while let Some(caps) = pattern.captures(&out) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let alternatives = body.as_str().split('|').collect::<Vec<_>>();
        let choice = rand.choose(&alternatives).copied().unwrap_or("");
        let range = whole.range();
        out = format!("{}{}{}", &out[..range.start], choice, &out[range.end..]);
    }
    out
}
