//! Product feed loading.
//!
//! The feed is an XML document whose root element holds repeated
//! `<product>` children:
//!
//! ```xml
//! <products>
//!   <product>
//!     <id>42</id>
//!     <title>Aviator Classic</title>
//!     <price>89.99</price>
//!     <category>Sunglasses</category>
//!     <url>https://shop.example/aviator-classic</url>
//!     <image_url>https://shop.example/img/aviator-classic.jpg</image_url>
//!     <inventory>25</inventory>
//!     <rating>4.6</rating>
//!   </product>
//! </products>
//! ```
//!
//! Every field element is required. Numeric fields must parse; text fields
//! may be empty. Only direct children of the root named `product` count as
//! products, and only the first occurrence of a field is used.

use std::path::{Path, PathBuf};

use journey_seeder_core::Product;
use quick_xml::Reader as XmlReader;
use quick_xml::events::Event;
use thiserror::Error;
use tracing::{debug, info};

/// Depth of `<product>` elements (root is 1).
const PRODUCT_DEPTH: usize = 2;
/// Depth of the field elements inside a product.
const FIELD_DEPTH: usize = 3;

/// Errors that can occur when loading the product feed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Feed file does not exist.
    #[error("Product feed not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Feed file could not be read.
    #[error("Failed to read product feed {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Feed is not well-formed XML.
    #[error("Malformed product feed: {0}")]
    Xml(String),

    /// A product is missing a required element.
    #[error("Product #{index} is missing <{field}>")]
    MissingField { index: usize, field: &'static str },

    /// A numeric element could not be coerced.
    #[error("Product #{index} has invalid <{field}> {value:?}: {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Load the product feed at `path`.
///
/// # Errors
///
/// Returns `CatalogError::NotFound` if the file does not exist, `Io` for
/// other read failures, and the [`parse_catalog`] errors for bad content.
pub async fn load_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let xml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => CatalogError::NotFound(path.to_path_buf()),
            _ => CatalogError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

    let products = parse_catalog(&xml)?;
    info!(path = %path.display(), products = products.len(), "Loaded product feed");
    Ok(products)
}

/// Parse a product feed document.
///
/// # Errors
///
/// Returns `CatalogError::Xml` for malformed XML (including a feed that
/// ends with elements still open), `MissingField` when a
/// product lacks an element, and `InvalidField` when price, rating or
/// inventory cannot be coerced.
pub fn parse_catalog(xml: &str) -> Result<Vec<Product>, CatalogError> {
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);

    let mut products = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<RawProduct> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) => {
                depth += 1;
                let name = element.local_name();
                match depth {
                    PRODUCT_DEPTH if name.as_ref() == b"product" => {
                        current = Some(RawProduct::default());
                    }
                    FIELD_DEPTH => {
                        field = current
                            .as_mut()
                            .and_then(|raw| raw.open(name.as_ref()));
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(element)) => {
                let name = element.local_name();
                match depth + 1 {
                    PRODUCT_DEPTH if name.as_ref() == b"product" => {
                        products.push(RawProduct::default().finish(products.len())?);
                    }
                    FIELD_DEPTH => {
                        if let Some(raw) = current.as_mut() {
                            raw.open(name.as_ref());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(text)) if depth == FIELD_DEPTH => {
                if let (Some(raw), Some(open)) = (current.as_mut(), field) {
                    let text = text
                        .unescape()
                        .map_err(|e| CatalogError::Xml(e.to_string()))?;
                    raw.append(open, &text);
                }
            }
            Ok(Event::CData(data)) if depth == FIELD_DEPTH => {
                if let (Some(raw), Some(open)) = (current.as_mut(), field) {
                    raw.append(open, String::from_utf8_lossy(data.as_ref()).trim());
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    FIELD_DEPTH => field = None,
                    PRODUCT_DEPTH => {
                        if let Some(raw) = current.take() {
                            products.push(raw.finish(products.len())?);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => {
                if depth != 0 || current.is_some() {
                    return Err(CatalogError::Xml(format!(
                        "unexpected end of feed with {depth} element(s) still open"
                    )));
                }
                break;
            }
            Err(err) => return Err(CatalogError::Xml(err.to_string())),
            _ => {}
        }
    }

    debug!(products = products.len(), "Parsed product feed");
    Ok(products)
}

/// A product field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Price,
    Category,
    Url,
    ImageUrl,
    Inventory,
    Rating,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"id" => Some(Self::Id),
            b"title" => Some(Self::Title),
            b"price" => Some(Self::Price),
            b"category" => Some(Self::Category),
            b"url" => Some(Self::Url),
            b"image_url" => Some(Self::ImageUrl),
            b"inventory" => Some(Self::Inventory),
            b"rating" => Some(Self::Rating),
            _ => None,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Price => "price",
            Self::Category => "category",
            Self::Url => "url",
            Self::ImageUrl => "image_url",
            Self::Inventory => "inventory",
            Self::Rating => "rating",
        }
    }
}

/// Field text collected for one `<product>` before coercion.
#[derive(Debug, Default)]
struct RawProduct {
    id: Option<String>,
    title: Option<String>,
    price: Option<String>,
    category: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    inventory: Option<String>,
    rating: Option<String>,
}

impl RawProduct {
    const fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Price => &mut self.price,
            Field::Category => &mut self.category,
            Field::Url => &mut self.url,
            Field::ImageUrl => &mut self.image_url,
            Field::Inventory => &mut self.inventory,
            Field::Rating => &mut self.rating,
        }
    }

    /// Mark a field element as present. Returns the field only on its first
    /// occurrence so later duplicates are ignored.
    fn open(&mut self, tag: &[u8]) -> Option<Field> {
        let field = Field::from_tag(tag)?;
        let slot = self.slot(field);
        if slot.is_some() {
            return None;
        }
        *slot = Some(String::new());
        Some(field)
    }

    fn append(&mut self, field: Field, text: &str) {
        if let Some(value) = self.slot(field) {
            value.push_str(text);
        }
    }

    fn finish(self, index: usize) -> Result<Product, CatalogError> {
        let require = |value: Option<String>, field: Field| {
            value.ok_or(CatalogError::MissingField {
                index,
                field: field.tag(),
            })
        };

        let price = require(self.price, Field::Price)?;
        let inventory = require(self.inventory, Field::Inventory)?;
        let rating = require(self.rating, Field::Rating)?;

        Ok(Product {
            id: require(self.id, Field::Id)?,
            title: require(self.title, Field::Title)?,
            price: parse_finite(&price, index, Field::Price)?,
            category: require(self.category, Field::Category)?,
            url: require(self.url, Field::Url)?,
            image_url: require(self.image_url, Field::ImageUrl)?,
            inventory: inventory
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(index, Field::Inventory, &inventory, &e.to_string()))?,
            rating: parse_finite(&rating, index, Field::Rating)?,
        })
    }
}

fn parse_finite(raw: &str, index: usize, field: Field) -> Result<f64, CatalogError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(index, field, raw, &e.to_string()))?;
    if !value.is_finite() {
        return Err(invalid(index, field, raw, "not a finite number"));
    }
    Ok(value)
}

fn invalid(index: usize, field: Field, value: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidField {
        index,
        field: field.tag(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
