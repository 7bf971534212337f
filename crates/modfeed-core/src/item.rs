use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical gender code used across parsing, validation, and the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Men,
    #[serde(rename = "W")]
    Women,
    #[serde(rename = "U")]
    Unisex,
}

impl Gender {
    /// Single-letter code as stored in item layers and the catalog.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Gender::Men => "M",
            Gender::Women => "W",
            Gender::Unisex => "U",
        }
    }

    /// Parses a single-letter code. Anything other than `M`/`W`/`U` is `None`.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Men),
            "W" => Some(Gender::Women),
            "U" => Some(Gender::Unisex),
            _ => None,
        }
    }
}

/// One product offer as emitted by a vendor adapter.
///
/// This is the wire shape of the canonical field set: any vendor-specific
/// field naming or page parsing has already happened inside the adapter.
/// Feed snapshot files are JSON lines of this shape. Prices arrive as raw
/// display tokens (e.g. `"1 299 SEK"`) and are parsed during ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedItem {
    /// Stable per-vendor identity of the offer; pairs with the vendor slug
    /// to key the import record.
    pub key: String,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    /// Free-text gender signal as scraped; normalized later by the parser.
    pub gender: Option<String>,
    /// Vendor slug, matching `vendors.slug`.
    pub vendor: String,
    pub url: Option<String>,
    /// Per-item affiliate tracking id, when the network issues one.
    pub affiliate_id: Option<String>,
    /// Raw price tokens; `price` is a flat "current price" some feeds emit
    /// instead of a regular/discount pair.
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub discount_price: Option<String>,
    pub currency: Option<String>,
    /// Free-text color/pattern description, e.g. `"Navy striped"`.
    pub colors: Option<String>,
    pub in_stock: Option<bool>,
    pub stock: Option<i32>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// The one field shape shared by the four processing layers of an import
/// record (`scraped`, `parsed`, `manual`, `final`).
///
/// Every field is an explicit `Option`: a module that cannot resolve a field
/// sets it to `None`, so "never set" and "cleared this run" are the same
/// unambiguous signal to validation and downstream modules. There is no
/// delete-the-key protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Catalog brand id, copied from a curated mapping row.
    pub brand_id: Option<i64>,
    pub category: Option<String>,
    /// Catalog category id, copied from a curated mapping row.
    pub category_id: Option<i64>,
    /// Single-letter gender code in `parsed`/`final`; raw text in `scraped`.
    pub gender: Option<String>,
    pub vendor: Option<String>,
    /// Raw product URL in `scraped`; outbound affiliate-tracked URL in
    /// `parsed`/`final`.
    pub url: Option<String>,
    pub affiliate_id: Option<String>,
    /// Flat "current price" from feeds that do not split regular/discount.
    pub price: Option<Decimal>,
    pub regular_price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub is_discount: Option<bool>,
    pub currency: Option<String>,
    /// Free-text option description in `scraped`; canonical color keys in
    /// `parsed`/`final`.
    pub colors: Option<Vec<String>>,
    pub patterns: Option<Vec<String>>,
    pub in_stock: Option<bool>,
    pub stock: Option<i32>,
    /// Content-addressed storage paths of fetched images.
    pub images: Option<Vec<String>>,
}

impl ItemFields {
    /// Returns `true` if at least one image path is recorded.
    #[must_use]
    pub fn has_images(&self) -> bool {
        self.images.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// First stored image path, used as the catalog product's primary image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// The price a buyer currently pays: discount price when a discount is
    /// active, otherwise the regular price.
    #[must_use]
    pub fn current_price(&self) -> Option<Decimal> {
        self.discount_price.or(self.regular_price)
    }
}
