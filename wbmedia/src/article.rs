//! Article (product identifier) parsing.
//!
//! Articles arrive from users either as a bare number or embedded in a
//! marketplace link. Both shapes are normalised to a [`ProductId`].

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Shortest accepted article, in decimal digits.
pub const MIN_ARTICLE_DIGITS: usize = 6;

/// Longest accepted article, in decimal digits.
pub const MAX_ARTICLE_DIGITS: usize = 10;

/// Errors produced while parsing an article.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleError {
    /// Input was empty after trimming.
    #[error("article is empty")]
    Empty,

    /// Input contained something other than ASCII digits.
    #[error("article '{0}' is not numeric")]
    NotNumeric(String),

    /// Digit count outside the accepted range.
    #[error("article '{value}' has {digits} digits (expected 6-10)")]
    InvalidLength { value: String, digits: usize },

    /// Neither a bare article nor a recognised product link.
    #[error("no article found in '{0}'")]
    NotFound(String),
}

/// Numeric marketplace product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw identifier without validation.
    ///
    /// Engine code accepts any non-negative value; validation only applies at
    /// the string boundary via [`FromStr`].
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for ProductId {
    type Err = ArticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ArticleError::Empty);
        }
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArticleError::NotNumeric(text.to_string()));
        }
        let digits = text.len();
        if !(MIN_ARTICLE_DIGITS..=MAX_ARTICLE_DIGITS).contains(&digits) {
            return Err(ArticleError::InvalidLength {
                value: text.to_string(),
                digits,
            });
        }
        // At most 10 digits always fits in u64.
        text.parse::<u64>()
            .map(ProductId)
            .map_err(|_| ArticleError::NotNumeric(text.to_string()))
    }
}

fn link_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"wildberries\.ru/catalog/(\d+)/",
            r"wb\.ru/catalog/(\d+)/",
            r"wildberries\.ru.*?/(\d{6,10})/",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Extract an article from user input.
///
/// Accepts a bare 6–10 digit article or a product link such as
/// `https://www.wildberries.ru/catalog/12345678/detail.aspx`.
pub fn extract_article(text: &str) -> Result<ProductId, ArticleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ArticleError::Empty);
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed.parse();
    }

    link_patterns()
        .iter()
        .filter_map(|re| re.captures(trimmed))
        .filter_map(|caps| caps.get(1))
        .find_map(|m| m.as_str().parse::<ProductId>().ok())
        .ok_or_else(|| ArticleError::NotFound(trimmed.to_string()))
}
