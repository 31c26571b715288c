//! Pagination pipeline: wrap, break, number, aggregate

mod aggregate;
mod dual;
mod engine;
mod line_break;
mod metrics;
mod numbering;

pub use aggregate::aggregate;
pub use engine::{BreakEngine, LayoutOutcome, Measured, PageDraft};
pub use line_break::{LineWrapper, WrappedLine, WrappedText};
pub use metrics::TextMetrics;
pub use numbering::{number_pages, NumberedPages};
