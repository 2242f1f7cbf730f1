//! Request flags to [`ConversionOptions`].
//!
//! Flags arrive as query strings or JSON values. Only the exact boolean or
//! its `"true"`/`"false"` spelling counts; anything else leaves the default.

use serde::Deserialize;
use serde_json::Value;

use crate::markdown_converter::ConversionOptions;

/// A `title`/`links`/`clean` flag as sent by the client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
    Other(Value),
}

impl Flag {
    fn is(&self, expected: bool) -> bool {
        match self {
            Self::Bool(b) => *b == expected,
            Self::Text(s) => s == if expected { "true" } else { "false" },
            Self::Other(_) => false,
        }
    }
}

impl From<String> for Flag {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flags shared by the query string and the JSON body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RequestFlags {
    pub title: Option<Flag>,
    pub links: Option<Flag>,
    pub clean: Option<Flag>,
}

impl RequestFlags {
    /// Title only when asked for, links unless refused, readability unless
    /// refused.
    #[must_use]
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            inline_title: self.title.as_ref().is_some_and(|f| f.is(true)),
            ignore_links: self.links.as_ref().is_some_and(|f| f.is(false)),
            improve_readability: !self.clean.as_ref().is_some_and(|f| f.is(false)),
            element_id: None,
        }
    }
}

/// `GET /?url=…` parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertQuery {
    pub url: Option<String>,
    pub title: Option<String>,
    pub links: Option<String>,
    pub clean: Option<String>,
}

impl ConvertQuery {
    #[must_use]
    pub fn flags(&self) -> RequestFlags {
        RequestFlags {
            title: self.title.clone().map(Flag::from),
            links: self.links.clone().map(Flag::from),
            clean: self.clean.clone().map(Flag::from),
        }
    }
}

/// `POST /` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertRequest {
    pub url: Option<String>,
    pub html: Option<String>,
    #[serde(flatten)]
    pub flags: RequestFlags,
}
