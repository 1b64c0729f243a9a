//! Request path translation
//!
//! Maps a URL path onto the served root. Segments that could climb out of the
//! root (`..`, `.`, empty, or anything that is not a single plain component)
//! are dropped rather than rejected.

use std::path::{Component, Path, PathBuf};

/// Decode `%XX` escapes. Invalid escapes are kept as-is and non-UTF-8 results
/// are replaced lossily.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Encode everything outside the unreserved set, keeping `/`
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b'/') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Escape text for inclusion in HTML, quotes included
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Result of mapping a URL path onto the served root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    pub fs_path: PathBuf,
    /// The URL path ended with `/`
    pub trailing_slash: bool,
}

/// Translate a URL path (no query string) into a path under `root`
pub fn translate_path(root: &Path, url_path: &str) -> TranslatedPath {
    // Drop anything after '#' in case a client sent it
    let url_path = url_path.split('#').next().unwrap_or_default();
    let trailing_slash = url_path.trim_end().ends_with('/');

    let decoded = percent_decode(url_path);
    let mut fs_path = root.to_path_buf();
    for segment in decoded.split('/') {
        if is_plain_segment(segment) {
            fs_path.push(segment);
        }
    }

    TranslatedPath {
        fs_path,
        trailing_slash,
    }
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !segment.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/my%20game/a%2Bb.js"), "/my game/a+b.js");
        assert_eq!(percent_decode("/caf%C3%A9"), "/café");
        assert_eq!(percent_decode("/100%"), "/100%");
        assert_eq!(percent_decode("/bad%zzescape%4"), "/bad%zzescape%4");
    }

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("my game/a+b.js"), "my%20game/a%2Bb.js");
        assert_eq!(percent_encode("café"), "caf%C3%A9");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_translate_simple() {
        let t = translate_path(Path::new("/srv"), "/assets/player.png");
        assert_eq!(t.fs_path, Path::new("/srv/assets/player.png"));
        assert!(!t.trailing_slash);
    }

    #[test]
    fn test_translate_root_and_trailing_slash() {
        let t = translate_path(Path::new("/srv"), "/");
        assert_eq!(t.fs_path, Path::new("/srv"));
        assert!(t.trailing_slash);

        let t = translate_path(Path::new("/srv"), "/levels/");
        assert_eq!(t.fs_path, Path::new("/srv/levels"));
        assert!(t.trailing_slash);
    }

    #[test]
    fn test_translate_blocks_traversal() {
        let t = translate_path(Path::new("/srv"), "/../../etc/passwd");
        assert_eq!(t.fs_path, Path::new("/srv/etc/passwd"));

        let t = translate_path(Path::new("/srv"), "/a/%2e%2e/%2E%2E/secret");
        assert_eq!(t.fs_path, Path::new("/srv/a/secret"));

        let t = translate_path(Path::new("/srv"), "/a/.//./b");
        assert_eq!(t.fs_path, Path::new("/srv/a/b"));
    }

    #[test]
    fn test_translate_decodes_segments() {
        let t = translate_path(Path::new("/srv"), "/my%20game/index.html");
        assert_eq!(t.fs_path, Path::new("/srv/my game/index.html"));
    }
}
