//! Output generation for JSON artifacts and Markdown reports.
//!
//! # Submodules
//!
//! - [`json`]: Writes pipeline reports to JSON files for chart and table renderers
//! - [`markdown`]: Renders reports to Markdown with an explicit [`RenderConfig`]
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── trends.json
//! ├── keywords.json
//! └── crawl.json
//!
//! markdown_output_dir/
//! ├── trends.md
//! ├── keywords.md
//! └── crawl.md
//! ```
//!
//! [`RenderConfig`]: crate::config::RenderConfig

pub mod json;
pub mod markdown;
