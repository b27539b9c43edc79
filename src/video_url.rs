//! Recognise watch-page URLs that can be summarized.

use url::Url;

/// Hosts whose watch pages the scraper understands
pub const SUPPORTED_HOSTS: [&str; 4] = ["www.youtube.com", "youtube.com", "m.youtube.com", "youtu.be"];

/// Extract the video id from a supported watch URL
pub fn parse_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    if !SUPPORTED_HOSTS.contains(&host) {
        return None;
    }

    let id = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else {
        match url.path() {
            "/watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            path => {
                let mut segments = path.trim_start_matches('/').split('/');
                match (segments.next(), segments.next()) {
                    (Some("shorts" | "embed" | "live"), Some(id)) => Some(id.to_string()),
                    _ => None,
                }
            }
        }
    }?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_urls() {
        assert_eq!(
            parse_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            parse_video_id("https://m.youtube.com/watch?feature=share&v=abc_DEF-123").as_deref(),
            Some("abc_DEF-123")
        );
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(parse_video_id("https://youtu.be/dQw4w9WgXcQ?si=x").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            parse_video_id("https://www.youtube.com/shorts/abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(parse_video_id("https://vimeo.com/12345"), None);
        assert_eq!(parse_video_id("https://www.youtube.com/feed/trending"), None);
        assert_eq!(parse_video_id("https://www.youtube.com/watch"), None);
        assert_eq!(parse_video_id("not a url"), None);
        assert_eq!(parse_video_id("https://www.youtube.com/watch?v=<script>"), None);
    }
}
