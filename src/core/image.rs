//! # Product Image Fallback
//!
//! Each product card tries an ordered chain of image URLs:
//!
//! 1. the product's own `image`, when the backend sent one
//! 2. a keyword search URL built from the first word of the product name
//! 3. a generated placeholder embedding the product name
//!
//! ```text
//! Pending(0) ──error──▶ Pending(1) ──error──▶ Pending(2) ──error──▶ Failed
//!     │                     │                     │
//!    load                  load                  load
//!     ▼                     ▼                     ▼
//! Loaded(0)             Loaded(1)             Loaded(2)
//! ```
//!
//! `Loaded` and `Failed` are terminal. A candidate that failed is never
//! tried again; `Failed` shows the placeholder unconditionally.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::core::message::MessageId;
use crate::core::product::Product;

const KEYWORD_SEARCH_BASE: &str = "https://source.unsplash.com/400x400/?";
const PLACEHOLDER_BASE: &str = "https://via.placeholder.com/400x400/667eea/ffffff?text=";
/// UTF-16 code units of the product name embedded in the placeholder.
const PLACEHOLDER_NAME_UNITS: usize = 20;
const FALLBACK_KEYWORD: &str = "product";

/// Same unreserved set as JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Identity of one product card: the message it belongs to and its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub message_id: MessageId,
    pub index: usize,
}

/// The name is cut at 20 UTF-16 code units, so an emoji outside the BMP
/// counts twice. A character that would straddle the cut is dropped whole.
pub fn placeholder_url(name: &str) -> String {
    let mut units = 0;
    let short: String = name
        .chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= PLACEHOLDER_NAME_UNITS
        })
        .collect();
    format!("{PLACEHOLDER_BASE}{}", encode_component(&short))
}

pub fn keyword_search_url(name: &str) -> String {
    let keyword = name
        .split(' ')
        .next()
        .filter(|w| !w.is_empty())
        .unwrap_or(FALLBACK_KEYWORD);
    format!("{KEYWORD_SEARCH_BASE}{}", encode_component(keyword))
}

/// Ordered candidate chain for a product; the placeholder is always last.
pub fn image_candidates(product: &Product) -> Vec<String> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(image) = product.image.as_deref().filter(|s| !s.trim().is_empty()) {
        candidates.push(image.to_string());
    }
    candidates.push(keyword_search_url(&product.name));
    candidates.push(placeholder_url(&product.name));
    candidates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// Showing candidate `i`; its load outcome is not known yet.
    Pending(usize),
    /// Candidate `i` loaded.
    Loaded(usize),
    /// Every candidate failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResolution {
    /// The `(image, name)` pair the candidates were built from.
    source: (Option<String>, String),
    candidates: Vec<String>,
    status: ImageStatus,
}

impl ImageResolution {
    pub fn new(product: &Product) -> Self {
        Self {
            source: (product.image.clone(), product.name.clone()),
            candidates: image_candidates(product),
            status: ImageStatus::Pending(0),
        }
    }

    /// Restarts from the first candidate if the product's image or name changed.
    /// Returns true when a reset happened.
    pub fn sync(&mut self, product: &Product) -> bool {
        if self.source.0 == product.image && self.source.1 == product.name {
            return false;
        }
        *self = Self::new(product);
        true
    }

    pub fn status(&self) -> ImageStatus {
        self.status
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn placeholder(&self) -> &str {
        // image_candidates always ends with the placeholder.
        self.candidates.last().map(String::as_str).unwrap_or_default()
    }

    pub fn current_url(&self) -> &str {
        match self.status {
            ImageStatus::Pending(i) | ImageStatus::Loaded(i) => &self.candidates[i],
            ImageStatus::Failed => self.placeholder(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, ImageStatus::Pending(_))
    }

    pub fn on_load(&mut self, index: usize) {
        if self.status == ImageStatus::Pending(index) {
            self.status = ImageStatus::Loaded(index);
        }
    }

    /// Records a load failure for candidate `index`.
    ///
    /// Returns the next candidate `(index, url)` to try, or `None` when the
    /// chain is exhausted or the report is stale.
    pub fn on_error(&mut self, index: usize) -> Option<(usize, &str)> {
        if self.status != ImageStatus::Pending(index) {
            return None;
        }
        let next = index + 1;
        if next < self.candidates.len() {
            self.status = ImageStatus::Pending(next);
            Some((next, &self.candidates[next]))
        } else {
            self.status = ImageStatus::Failed;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, image: Option<&str>) -> Product {
        Product {
            name: name.to_string(),
            image: image.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_candidates_with_own_image() {
        let p = named("Sony WH-1000XM5", Some("https://img.example/sony.jpg"));
        assert_eq!(
            image_candidates(&p),
            vec![
                "https://img.example/sony.jpg".to_string(),
                "https://source.unsplash.com/400x400/?Sony".to_string(),
                "https://via.placeholder.com/400x400/667eea/ffffff?text=Sony%20WH-1000XM5".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidates_without_image_skip_first_slot() {
        let p = named("Laptop", None);
        let candidates = image_candidates(&p);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].ends_with("?Laptop"));

        let blank = named("Laptop", Some("  "));
        assert_eq!(image_candidates(&blank).len(), 2);
    }

    #[test]
    fn test_placeholder_truncates_and_encodes_name() {
        assert_eq!(
            placeholder_url("Bose QuietComfort 45 Wireless"),
            "https://via.placeholder.com/400x400/667eea/ffffff?text=Bose%20QuietComfort%2045"
        );
        assert!(placeholder_url("₹ deals").contains("%E2%82%B9"));
    }

    #[test]
    fn test_placeholder_counts_utf16_units() {
        // Each 🎧 is a surrogate pair, so only ten fit
        let ten = "🎧".repeat(10);
        assert_eq!(placeholder_url(&"🎧".repeat(12)), placeholder_url(&ten));
        assert!(placeholder_url(&ten).ends_with(&"%F0%9F%8E%A7".repeat(10)));

        // A pair that would straddle the cut is dropped
        let name = format!("{}🎧tail", "a".repeat(19));
        assert!(placeholder_url(&name).ends_with(&format!("text={}", "a".repeat(19))));
    }

    #[test]
    fn test_keyword_falls_back_to_product() {
        assert!(keyword_search_url("").ends_with("?product"));
        assert!(keyword_search_url(" leading space").ends_with("?product"));
        assert!(keyword_search_url("Tom's Shoes").ends_with("?Tom's"));
    }

    #[test]
    fn test_failures_converge_to_placeholder() {
        let p = named("Widget", None);
        let mut res = ImageResolution::new(&p);
        assert_eq!(res.status(), ImageStatus::Pending(0));

        let (next, url) = res.on_error(0).unwrap();
        assert_eq!(next, 1);
        assert_eq!(url, placeholder_url("Widget"));

        assert!(res.on_error(1).is_none());
        assert_eq!(res.status(), ImageStatus::Failed);
        assert_eq!(res.current_url(), placeholder_url("Widget"));
        assert!(res.is_terminal());

        // No further attempts once failure is marked.
        assert!(res.on_error(1).is_none());
        assert!(res.on_error(0).is_none());
        res.on_load(1);
        assert_eq!(res.status(), ImageStatus::Failed);
    }

    #[test]
    fn test_stale_error_is_ignored() {
        let p = named("Widget", Some("https://img.example/w.png"));
        let mut res = ImageResolution::new(&p);
        res.on_error(0);
        assert_eq!(res.status(), ImageStatus::Pending(1));
        // A late duplicate report for candidate 0 must not skip candidate 1.
        assert!(res.on_error(0).is_none());
        assert_eq!(res.status(), ImageStatus::Pending(1));
    }

    #[test]
    fn test_load_is_terminal() {
        let p = named("Widget", Some("https://img.example/w.png"));
        let mut res = ImageResolution::new(&p);
        res.on_load(0);
        assert_eq!(res.status(), ImageStatus::Loaded(0));
        assert_eq!(res.current_url(), "https://img.example/w.png");
        assert!(res.on_error(0).is_none());
    }

    #[test]
    fn test_sync_resets_on_name_or_image_change() {
        let mut res = ImageResolution::new(&named("Widget", None));
        res.on_error(0);
        assert!(!res.sync(&named("Widget", None)));
        assert_eq!(res.status(), ImageStatus::Pending(1));

        assert!(res.sync(&named("Gadget", None)));
        assert_eq!(res.status(), ImageStatus::Pending(0));
        assert!(res.current_url().ends_with("?Gadget"));

        assert!(res.sync(&named("Gadget", Some("https://img.example/g.png"))));
        assert_eq!(res.candidates().len(), 3);
    }
}
