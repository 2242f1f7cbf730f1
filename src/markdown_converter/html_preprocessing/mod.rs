//! HTML preprocessing ahead of htmd conversion:
//! - style/script stripping and inline text cleaning
//! - title and element selection
//! - main content extraction via CSS selectors
//! - code block and table protection through the placeholder vault

pub mod code_block_protection;
pub mod document_selection;
pub mod html_cleaning;
pub mod main_content_extraction;
pub mod table_rendering;

pub use code_block_protection::{protect_code_blocks, render_code_block};
pub use document_selection::{document_markup, element_document_markup, page_title};
pub use html_cleaning::{clean_inline_fragment, strip_style_and_script_blocks};
pub use main_content_extraction::extract_main_content;
pub use table_rendering::{Grid, protect_tables, render_table};
