use serde::Deserialize;

/// Metadata block at the top of a note.
#[derive(Debug, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Parse the YAML block fenced by `---` lines at the very start of a note.
///
/// The block must open on the first line and close on a line that is exactly
/// `---`. Anything else, including YAML that fails to parse, yields `None`.
pub fn parse(note: &str) -> Option<Frontmatter> {
    let rest = note.strip_prefix('\u{feff}').unwrap_or(note);
    let rest = rest.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut block_len = None;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            block_len = Some(offset);
            break;
        }
        offset += line.len();
    }

    let block = &rest[..block_len?];
    if block.trim().is_empty() {
        return Some(Frontmatter::default());
    }

    serde_yaml::from_str(block)
        .map_err(|e| log::debug!("frontmatter: ignoring unparsable block: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_aliases_are_read() {
        let note = "---\ntags:\n  - rust\n  - coding\naliases: [ownership, borrowck]\n---\n# Body\n";
        let fm = parse(note).unwrap();
        assert_eq!(fm.tags, vec!["rust", "coding"]);
        assert_eq!(fm.aliases, vec!["ownership", "borrowck"]);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let fm = parse("---\ntitle: Minimal\ndate: 2024-01-15\n---\nbody").unwrap();
        assert!(fm.tags.is_empty());
        assert!(fm.aliases.is_empty());
    }

    #[test]
    fn test_dashes_inside_a_value_do_not_close_the_block() {
        let note = "---\nsummary: before---after\ntags: [a]\n---\nbody";
        assert_eq!(parse(note).unwrap().tags, vec!["a"]);
    }

    #[test]
    fn test_crlf_and_empty_blocks() {
        assert_eq!(parse("---\r\ntags: [x]\r\n---\r\nbody").unwrap().tags, vec!["x"]);
        assert!(parse("---\n---\nbody").unwrap().tags.is_empty());
    }

    #[test]
    fn test_block_must_open_the_note_and_be_closed() {
        assert!(parse("# Heading\n---\ntags: [a]\n---\n").is_none());
        assert!(parse("---\ntags: [a]\nno closing fence").is_none());
        assert!(parse("----\ntags: [a]\n---\n").is_none());
    }

    #[test]
    fn test_unparsable_yaml_yields_none() {
        assert!(parse("---\ntags: [unclosed\n---\nbody").is_none());
    }
}
