use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// URL fragments that mark tracking, analytics and ad pixels. Matched case-sensitively.
const TRACKING_PATTERNS: &[&str] = &["pixel", "tracker", "analytics", "adServer", "impression"];

/// Declared dimensions below this (and above zero) mark an image as too small to keep.
const MIN_DIMENSION: u32 = 10;

/// An `<img>` element reduced to its best source URL and declared size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl ImageCandidate {
    /// Whether the candidate survives the http, tracking-pixel and size filters.
    pub fn is_acceptable(&self) -> bool {
        if !self.url.starts_with("http") {
            return false;
        }

        let is_tracking_pixel = TRACKING_PATTERNS
            .iter()
            .any(|pattern| self.url.contains(pattern));

        // 0 means the size is unknown
        let is_tiny = |dimension: u32| dimension > 0 && dimension < MIN_DIMENSION;
        let is_tiny_image = is_tiny(self.width) || is_tiny(self.height);

        !is_tracking_pixel && !is_tiny_image
    }
}

/// Extract every `<img>` element with a resolvable source, in document order.
pub fn extract_image_candidates(html_content: &str) -> Vec<ImageCandidate> {
    let document = Html::parse_document(html_content);
    let selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let url = resolve_source(&element)?;
            Some(ImageCandidate {
                url,
                width: parse_dimension(element.value().attr("width")),
                height: parse_dimension(element.value().attr("height")),
            })
        })
        .collect()
}

/// Extract the image URLs worth downloading from HTML content.
///
/// Duplicates are kept and document order is preserved.
pub fn extract_image_urls(html_content: &str) -> Vec<String> {
    extract_image_candidates(html_content)
        .into_iter()
        .filter(ImageCandidate::is_acceptable)
        .map(|candidate| candidate.url)
        .collect()
}

/// `src`, then `data-src`, then the first `srcset` entry.
fn resolve_source(element: &ElementRef) -> Option<String> {
    let attributes = element.value();

    let non_empty = |name: &str| {
        attributes
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    non_empty("src")
        .or_else(|| non_empty("data-src"))
        .or_else(|| attributes.attr("srcset").and_then(first_srcset_url))
}

fn first_srcset_url(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .next()?
        .trim()
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// Reads the leading integer of a dimension attribute (`"50px"` -> 50).
/// Missing, negative or unparseable values are treated as unknown (0).
fn parse_dimension(value: Option<&str>) -> u32 {
    static LEADING_INT: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_INT.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"));

    value
        .and_then(|value| re.captures(value))
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<i64>().ok())
        .map(|parsed| parsed.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_images_with_tiny_declared_width() {
        let html = r#"
            <img src="http://x/a.jpg" width="5">
            <img src="http://x/b.jpg" width="50">
        "#;

        assert_eq!(extract_image_urls(html), vec!["http://x/b.jpg"]);
    }

    #[test]
    fn falls_back_to_data_src_then_srcset() {
        let html = r#"
            <img data-src="https://cdn.example.com/lazy.png">
            <img src="" srcset="https://cdn.example.com/small.jpg 480w, https://cdn.example.com/big.jpg 1080w">
            <img src="https://cdn.example.com/direct.webp" data-src="https://cdn.example.com/ignored.webp">
        "#;

        assert_eq!(
            extract_image_urls(html),
            vec![
                "https://cdn.example.com/lazy.png",
                "https://cdn.example.com/small.jpg",
                "https://cdn.example.com/direct.webp",
            ]
        );
    }

    #[test]
    fn rejects_relative_and_non_http_sources() {
        let html = r#"
            <img src="/images/logo.png">
            <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
            <img>
            <img src="http://x/ok.jpg">
        "#;

        assert_eq!(extract_image_urls(html), vec!["http://x/ok.jpg"]);
    }

    #[test]
    fn rejects_tracking_urls_case_sensitively() {
        let html = r#"
            <img src="http://x/pixel.gif">
            <img src="http://x/tracker/1.png">
            <img src="http://analytics.example.com/a.png">
            <img src="http://x/adServer/banner.jpg">
            <img src="http://x/impression?id=3">
            <img src="http://x/adserver/banner.jpg">
            <img src="http://x/Pixel.jpg">
        "#;

        assert_eq!(
            extract_image_urls(html),
            vec!["http://x/adserver/banner.jpg", "http://x/Pixel.jpg"]
        );
    }

    #[test]
    fn unknown_or_zero_dimensions_are_kept() {
        let html = r#"
            <img src="http://x/a.jpg" width="0" height="0">
            <img src="http://x/b.jpg" width="auto">
            <img src="http://x/c.jpg" height="9">
            <img src="http://x/d.jpg" width="10px" height="10">
            <img src="http://x/e.jpg" width="-4">
        "#;

        assert_eq!(
            extract_image_urls(html),
            vec!["http://x/a.jpg", "http://x/b.jpg", "http://x/d.jpg", "http://x/e.jpg"]
        );
    }

    #[test]
    fn keeps_duplicates_in_document_order() {
        let html = r#"
            <div><img src="http://x/1.jpg"></div>
            <p><img src="http://x/2.jpg"><img src="http://x/1.jpg"></p>
        "#;

        assert_eq!(
            extract_image_urls(html),
            vec!["http://x/1.jpg", "http://x/2.jpg", "http://x/1.jpg"]
        );
    }

    #[test]
    fn candidates_carry_parsed_dimensions() {
        let candidates =
            extract_image_candidates(r#"<img src="http://x/a.jpg" width="120px" height=" 80">"#);

        assert_eq!(
            candidates,
            vec![ImageCandidate {
                url: "http://x/a.jpg".to_string(),
                width: 120,
                height: 80,
            }]
        );
    }

    #[test]
    fn malformed_html_yields_nothing() {
        assert!(extract_image_urls("<<<not html at all").is_empty());
        assert!(extract_image_urls("").is_empty());
    }
}
