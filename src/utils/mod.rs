pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{SourceLocation, is_valid_url, parse_source_url};
