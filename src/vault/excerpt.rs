use regex::{Regex, RegexBuilder};

/// Characters kept on each side of a match.
pub const DEFAULT_CHARS_AROUND: usize = 100;

/// Length of the leading excerpt used when the term is not in the content.
pub const FALLBACK_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

/// Case-insensitive literal matcher for `term`.
pub fn matcher(term: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
}

/// Snippet of `content` around the first case-insensitive occurrence of `term`.
///
/// Returns `chars_around` characters on either side of the match, with `...`
/// on each edge that was cut. Falls back to the first [`FALLBACK_CHARS`]
/// characters when the term does not occur (e.g. a filename-only match).
pub fn get_excerpt(content: &str, term: &str, chars_around: usize) -> String {
    match matcher(term) {
        Ok(re) if !term.is_empty() => excerpt_with(content, &re, chars_around),
        _ => leading(content, FALLBACK_CHARS),
    }
}

/// Same as [`get_excerpt`] with a matcher built once per search.
///
/// Slicing happens on char indices derived from the match's byte offsets,
/// so a code point is never split.
pub fn excerpt_with(content: &str, re: &Regex, chars_around: usize) -> String {
    let Some(mat) = re.find(content).filter(|m| !m.is_empty()) else {
        return leading(content, FALLBACK_CHARS);
    };

    let chars: Vec<char> = content.chars().collect();
    let char_start = content[..mat.start()].chars().count();
    let char_end = char_start + mat.as_str().chars().count();

    let start = char_start.saturating_sub(chars_around);
    let end = char_end.saturating_add(chars_around).min(chars.len());

    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt.extend(&chars[start..end]);
    if end < chars.len() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}

fn leading(content: &str, max: usize) -> String {
    let mut excerpt: String = content.chars().take(max).collect();
    if content.chars().nth(max).is_some() {
        excerpt.push_str(ELLIPSIS);
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_content_has_no_ellipsis() {
        assert_eq!(get_excerpt("hello world", "hello", 100), "hello world");
    }

    #[test]
    fn test_excerpt_trims_both_edges() {
        let content = format!("{}needle{}", "a".repeat(50), "b".repeat(50));
        let excerpt = get_excerpt(&content, "needle", 10);
        assert_eq!(excerpt, format!("...{}needle{}...", "a".repeat(10), "b".repeat(10)));
    }

    #[test]
    fn test_excerpt_length_is_bounded() {
        let content = "x".repeat(500) + "Target" + &"y".repeat(500);
        let n = 25;
        let excerpt = get_excerpt(&content, "target", n);
        assert!(excerpt.contains("Target"));
        assert!(excerpt.chars().count() <= 2 * n + "target".len() + 2 * ELLIPSIS.len());
    }

    #[test]
    fn test_excerpt_match_at_start_and_end() {
        let content = "start of the note and then the finish";
        assert_eq!(get_excerpt(content, "start", 3), "start of...");
        assert_eq!(get_excerpt(content, "finish", 4), "...the finish");
    }

    #[test]
    fn test_excerpt_is_case_insensitive_and_keeps_original_case() {
        let excerpt = get_excerpt("Meeting with ALICE tomorrow", "alice", 5);
        assert_eq!(excerpt, "...with ALICE tomo...");
    }

    #[test]
    fn test_excerpt_does_not_split_multibyte_chars() {
        let content = "café crème brûlée — déjà vu über alles";
        let excerpt = get_excerpt(content, "DÉJÀ", 3);
        assert_eq!(excerpt, "... — déjà vu...");

        let emoji = "🦀🦀🦀 rust 🦀🦀🦀";
        assert_eq!(get_excerpt(emoji, "RUST", 2), "...🦀 rust 🦀...");
    }

    #[test]
    fn test_greek_sigma_forms_match() {
        let re = matcher("οδυσσευς").unwrap();
        assert!(re.is_match("ΟΔΥΣΣΕΥΣ"));
        assert_eq!(get_excerpt("Ο ΟΔΥΣΣΕΥΣ ΓΥΡΙΖΕΙ", "οδυσσευς", 2), "Ο ΟΔΥΣΣΕΥΣ Γ...");
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let re = matcher("a.b (c)").unwrap();
        assert!(re.is_match("see A.B (C) here"));
        assert!(!re.is_match("axb (c)"));
    }

    #[test]
    fn test_excerpt_fallback_when_term_missing() {
        let short = "nothing to see here";
        assert_eq!(get_excerpt(short, "absent", 10), short);

        let long = "é".repeat(FALLBACK_CHARS + 10);
        let excerpt = get_excerpt(&long, "absent", 10);
        assert_eq!(excerpt, format!("{}...", "é".repeat(FALLBACK_CHARS)));
        assert_eq!(excerpt, get_excerpt(&long, "absent", 10));

        let exact = "x".repeat(FALLBACK_CHARS);
        assert_eq!(get_excerpt(&exact, "absent", 10), exact);
    }

    #[test]
    fn test_excerpt_empty_term_uses_fallback() {
        assert_eq!(get_excerpt("abc", "", 1), "abc");
        assert_eq!(get_excerpt("", "term", 5), "");
    }
}
