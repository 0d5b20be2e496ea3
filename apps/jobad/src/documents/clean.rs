//! Strips presentation noise from a job ad before it is sent for analysis.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static RE_FRONT_MATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n.*?\n---\n").expect("valid front matter regex"));
static RE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\(.*?\)").expect("valid image regex"));
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]\(.*?\)").expect("valid link regex"));

const READ_MARKER: &str = "(READ) - ";

pub fn strip_front_matter(text: &str) -> String {
    RE_FRONT_MATTER.replace(text, "").into_owned()
}

/// Images go first, otherwise the link pattern would leave a stray `!` behind.
pub fn strip_links_and_images(text: &str) -> String {
    let without_images = RE_IMAGE.replace_all(text, "");
    RE_LINK.replace_all(&without_images, "").into_owned()
}

/// Front matter removed, file stem prepended as an H1 title, links and images removed.
pub fn prepare_for_analysis(file_name: &str, text: &str) -> String {
    let title = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().replacen(READ_MARKER, "", 1))
        .unwrap_or_default();
    let body = strip_front_matter(text);
    strip_links_and_images(&format!("# {title}\n\n{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_front_matter() {
        assert_eq!(strip_front_matter("---\na: 1\n---\nbody"), "body");
        assert_eq!(strip_front_matter("no block\n---\na\n---\n"), "no block\n---\na\n---\n");
    }

    #[test]
    fn test_strip_links_and_images() {
        let text = "See ![logo](https://x/logo.png) and [apply here](https://x/apply).";
        assert_eq!(strip_links_and_images(text), "See  and .");
    }

    #[test]
    fn test_links_do_not_span_lines() {
        let text = "[open\nbracket](not a link)";
        assert_eq!(strip_links_and_images(text), text);
    }

    #[test]
    fn test_prepare_for_analysis() {
        let text = "---\ntags: [job-ad]\n---\nWe hire. [Apply](https://x).\n";
        assert_eq!(
            prepare_for_analysis("(READ) - Rust Engineer at Acme.md", text),
            "# Rust Engineer at Acme\n\nWe hire. .\n"
        );
    }
}
