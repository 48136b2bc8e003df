//! # ProductCard Component
//!
//! One recommended product, drawn as a bordered card:
//!
//! ```text
//! ╭──────────────────────────────────────────╮
//! │ JBL Tune 760NC              ✓ In Stock   │
//! │ Affordable ANC headphones                │
//! │ ★★★★ 4.3                                 │
//! │ Price: ₹5,000 - ₹8,000                   │
//! │ 🖼 https://source.unsplash.com/… (loaded) │
//! │ [🛒 Buy on Flipkart]  [🛒 Buy on Amazon]  │
//! ╰──────────────────────────────────────────╯
//! ```
//!
//! The button row is omitted when the product has no usable links.
//! [`ProductCard::button_at`] maps a click inside the card to a marketplace.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::image::{ImageResolution, ImageStatus};
use crate::core::product::{Marketplace, Product};

const CONTENT_PAD_H: u16 = 1;
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
const VERTICAL_OVERHEAD: u16 = 2;
/// Name, rating, price and image rows.
const FIXED_ROWS: u16 = 4;
const BUTTON_GAP: &str = "  ";
const IN_STOCK_BADGE: &str = " ✓ In Stock";

pub fn button_label(marketplace: Marketplace) -> String {
    format!("[🛒 {}]", marketplace.label())
}

fn wrap_description(description: &str, content_width: u16) -> Vec<String> {
    let description = description.trim();
    if description.is_empty() || content_width == 0 {
        return Vec::new();
    }
    let options = textwrap::Options::new(content_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    textwrap::wrap(description, options)
        .into_iter()
        .map(|l| l.into_owned())
        .collect()
}

pub struct ProductCard<'a> {
    pub product: &'a Product,
    pub image: Option<&'a ImageResolution>,
    /// Without probing the first candidate is shown with no load state.
    pub probe_images: bool,
    pub is_selected: bool,
}

impl<'a> ProductCard<'a> {
    pub fn calculate_height(product: &Product, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let description_rows = wrap_description(&product.description, content_width).len() as u16;
        let button_rows = u16::from(!product.marketplaces().is_empty());
        VERTICAL_OVERHEAD + FIXED_ROWS + description_rows + button_rows
    }

    /// The marketplace button under a point given relative to the card's
    /// top-left corner.
    pub fn button_at(product: &Product, width: u16, col: u16, row: u16) -> Option<Marketplace> {
        let marketplaces = product.marketplaces();
        if marketplaces.is_empty() {
            return None;
        }
        let height = Self::calculate_height(product, width);
        // Buttons sit on the last inner row, just above the bottom border.
        if row + 2 != height {
            return None;
        }
        let mut x = 1 + CONTENT_PAD_H;
        for marketplace in marketplaces {
            let w = button_label(marketplace).width() as u16;
            if col >= x && col < x + w {
                return Some(marketplace);
            }
            x += w + BUTTON_GAP.width() as u16;
        }
        None
    }

    fn image_line(&self) -> Line<'a> {
        let dim = Style::default().fg(Color::DarkGray);
        let Some(image) = self.image else {
            return Line::from(Span::styled("🖼 (no image)", dim));
        };
        let state = match (self.probe_images, image.status()) {
            (false, _) => None,
            (true, ImageStatus::Pending(_)) => Some("loading…"),
            (true, ImageStatus::Loaded(_)) => Some("loaded"),
            (true, ImageStatus::Failed) => Some("placeholder"),
        };
        let mut spans = vec![
            Span::raw("🖼 "),
            Span::styled(image.current_url().to_string(), dim),
        ];
        if let Some(state) = state {
            spans.push(Span::styled(format!(" ({state})"), dim));
        }
        Line::from(spans)
    }

    fn lines(&self, content_width: u16) -> Vec<Line<'a>> {
        let product = self.product;
        let mut lines = Vec::new();

        let mut name = vec![Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if product.in_stock() {
            name.push(Span::styled(IN_STOCK_BADGE, Style::default().fg(Color::Green)));
        }
        lines.push(Line::from(name));

        for row in wrap_description(&product.description, content_width) {
            lines.push(Line::from(row));
        }

        lines.push(Line::from(vec![
            Span::styled(
                "★".repeat(product.star_count()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!(" {}", product.rating_label())),
        ]));
        lines.push(Line::from(vec![
            Span::raw("Price: "),
            Span::styled(
                product.price_label().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(self.image_line());

        let marketplaces = product.marketplaces();
        if !marketplaces.is_empty() {
            let mut buttons = Vec::new();
            for (i, marketplace) in marketplaces.into_iter().enumerate() {
                if i > 0 {
                    buttons.push(Span::raw(BUTTON_GAP));
                }
                buttons.push(Span::styled(
                    button_label(marketplace),
                    Style::default().fg(Color::Black).bg(Color::Yellow),
                ));
            }
            lines.push(Line::from(buttons));
        }
        lines
    }
}

impl<'a> Widget for ProductCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.is_selected {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::DIM)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines(inner_area.width)).render(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::product;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(card: ProductCard, width: u16) -> String {
        let height = ProductCard::calculate_height(card.product, width);
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(card, f.area())).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn linked(name: &str) -> Product {
        Product {
            flipkart_link: Some("https://flipkart.example/p".into()),
            amazon_link: Some("https://amazon.example/p".into()),
            ..product(name, "₹999")
        }
    }

    #[test]
    fn test_height_counts_description_and_buttons() {
        let bare = product("A", "$10");
        assert_eq!(ProductCard::calculate_height(&bare, 40), 2 + 4);

        let full = Product {
            description: "Noise cancelling".into(),
            ..linked("A")
        };
        assert_eq!(ProductCard::calculate_height(&full, 40), 2 + 4 + 1 + 1);
    }

    #[test]
    fn test_render_minimal_product_with_fallbacks() {
        let p = product("A", "$10");
        let image = ImageResolution::new(&p);
        let text = render(
            ProductCard {
                product: &p,
                image: Some(&image),
                probe_images: false,
                is_selected: false,
            },
            60,
        );
        assert!(text.contains("A ✓ In Stock"));
        assert!(text.contains("★★★★ 4.0"));
        assert!(text.contains("Price: $10"));
        assert!(!text.contains("Buy on"));
    }

    #[test]
    fn test_out_of_stock_has_no_badge() {
        let p = Product {
            in_stock: Some(false),
            ..product("Lamp", "$5")
        };
        let text = render(
            ProductCard {
                product: &p,
                image: None,
                probe_images: false,
                is_selected: false,
            },
            60,
        );
        assert!(text.contains("Lamp"));
        assert!(!text.contains("In Stock"));
    }

    #[test]
    fn test_buttons_render_for_present_links_only() {
        let p = Product {
            amazon_link: None,
            ..linked("Mug")
        };
        let text = render(
            ProductCard {
                product: &p,
                image: None,
                probe_images: false,
                is_selected: false,
            },
            60,
        );
        assert!(text.contains("Buy on Flipkart"));
        assert!(!text.contains("Buy on Amazon"));
    }

    #[test]
    fn test_image_state_shown_when_probing() {
        let p = product("Mug", "$5");
        let mut image = ImageResolution::new(&p);
        image.on_error(0);
        image.on_error(1);
        let text = render(
            ProductCard {
                product: &p,
                image: Some(&image),
                probe_images: true,
                is_selected: false,
            },
            120,
        );
        assert!(text.contains("(placeholder)"));
        assert!(text.contains("via.placeholder.com"));
    }

    #[test]
    fn test_button_hit_testing() {
        let p = linked("Mug");
        let width = 60;
        let height = ProductCard::calculate_height(&p, width);
        let row = height - 2;
        let flipkart_width = button_label(Marketplace::Flipkart).width() as u16;

        assert_eq!(ProductCard::button_at(&p, width, 2, row), Some(Marketplace::Flipkart));
        assert_eq!(
            ProductCard::button_at(&p, width, 2 + flipkart_width - 1, row),
            Some(Marketplace::Flipkart)
        );
        // The gap between buttons
        assert_eq!(ProductCard::button_at(&p, width, 2 + flipkart_width, row), None);
        assert_eq!(
            ProductCard::button_at(&p, width, 2 + flipkart_width + 2, row),
            Some(Marketplace::Amazon)
        );
        // Wrong row, left border
        assert_eq!(ProductCard::button_at(&p, width, 2, row - 1), None);
        assert_eq!(ProductCard::button_at(&p, width, 0, row), None);
    }
}
