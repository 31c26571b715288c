//! Wire-level data model: elements in, pages and positions out

pub mod config;
pub mod element;
pub mod page;
pub mod result;

pub use config::{
    ContinuationStyle, EffectiveConfig, EffectiveStyle, ElementStyle, Margins, OrphanControl,
    PageConfig, PageNumbering, PaperSize, Preset,
};
pub use element::{DualSide, Element, ElementId, ElementType};
pub use page::{
    compare_page_identifiers, insert_suffix, LineRange, Page, PageElement, PageIdentifier,
    TextRange, OMITTED_PLACEHOLDER,
};
pub use result::{
    ElementPosition, PaginationResult, PaginationStats, PaginationWarning, WarningKind,
};
