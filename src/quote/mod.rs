//! Quote generation - business logic for turning a project plus its estimate
//! data into a bill-of-materials and a rendered quote document.
//!
//! The pipeline has three stages:
//! - `items` - builds the ordered line-item list from project + estimate data
//! - `templates` - resolves item descriptions from the product_descriptions table
//! - `document` - renders the final artifact (DOCX template fill, programmatic
//!   DOCX, or plain text, in that fallback order)

pub mod classify;
pub mod document;
pub mod estimate;
pub mod handlers;
pub mod items;
pub mod models;
pub mod templates;

pub use document::{render, QuoteFormat, RenderedDocument};
pub use estimate::EstimateData;
pub use items::build_items;
pub use models::LineItem;
pub use templates::TemplateSet;
