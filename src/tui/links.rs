//! Opening marketplace links in the system browser.
//!
//! The browser runs as its own process and gets nothing but the URL.

use log::{info, warn};

use crate::core::product::{Marketplace, Product};

pub trait LinkOpener {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// Opens the product's link for `marketplace` and returns the status bar text.
/// `None` when the product has no link there.
pub fn open_purchase_link(
    opener: &dyn LinkOpener,
    product: &Product,
    marketplace: Marketplace,
) -> Option<String> {
    let url = product.link(marketplace)?;
    match opener.open(url) {
        Ok(()) => {
            info!("Opened {:?} link for '{}': {}", marketplace, product.name, url);
            Some(format!("Opened {}", marketplace_name(marketplace)))
        }
        Err(e) => {
            warn!("Failed to open {}: {}", url, e);
            Some(format!("Could not open browser: {}", e))
        }
    }
}

fn marketplace_name(marketplace: Marketplace) -> &'static str {
    match marketplace {
        Marketplace::Flipkart => "Flipkart",
        Marketplace::Amazon => "Amazon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::product;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        opened: RefCell<Vec<String>>,
        fail: bool,
    }

    impl LinkOpener for Recorder {
        fn open(&self, url: &str) -> std::io::Result<()> {
            if self.fail {
                return Err(std::io::Error::other("no browser"));
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    fn with_links() -> Product {
        Product {
            flipkart_link: Some("https://flipkart.example/mug".into()),
            amazon_link: Some("https://amazon.example/mug".into()),
            ..product("Mug", "$5")
        }
    }

    #[test]
    fn test_opens_requested_marketplace() {
        let recorder = Recorder::default();
        let status = open_purchase_link(&recorder, &with_links(), Marketplace::Amazon);
        assert_eq!(status.as_deref(), Some("Opened Amazon"));
        assert_eq!(*recorder.opened.borrow(), vec!["https://amazon.example/mug".to_string()]);
    }

    #[test]
    fn test_missing_link_opens_nothing() {
        let recorder = Recorder::default();
        let p = Product {
            amazon_link: None,
            ..with_links()
        };
        assert_eq!(open_purchase_link(&recorder, &p, Marketplace::Amazon), None);
        assert!(recorder.opened.borrow().is_empty());
    }

    #[test]
    fn test_failure_reported_in_status() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let status = open_purchase_link(&recorder, &with_links(), Marketplace::Flipkart).unwrap();
        assert!(status.contains("no browser"));
    }
}
