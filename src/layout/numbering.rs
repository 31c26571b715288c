//! Page numbering for revised scripts
//!
//! Physical pages normally count up from 1. Revision workflows lock page
//! numbers: new material becomes inserted pages (`12A`, `12B`) after the page
//! it follows, and removed pages keep their number as an OMITTED placeholder.

use crate::layout::engine::PageDraft;
use crate::model::{insert_suffix, EffectiveConfig, Page, PageIdentifier, PaginationWarning};
use tracing::debug;

/// Final page list
#[derive(Debug, Clone, Default)]
pub struct NumberedPages {
    pub pages: Vec<Page>,
    /// Final page index of every physical page
    pub index_map: Vec<usize>,
}

impl NumberedPages {
    /// Final index of a physical page
    pub fn final_index(&self, physical: usize) -> usize {
        self.index_map.get(physical).copied().unwrap_or(physical)
    }
}

/// Assign identifiers to the physical pages and insert omitted placeholders
pub fn number_pages(
    drafts: Vec<PageDraft>,
    config: &EffectiveConfig,
    warnings: &mut Vec<PaginationWarning>,
) -> NumberedPages {
    let physical_count = drafts.len();
    for &index in &config.inserted_pages {
        if index == 0 {
            warnings.push(PaginationWarning::config(
                "the first page cannot be an inserted page; numbering it 1",
            ));
        } else if index >= physical_count {
            warnings.push(PaginationWarning::config(format!(
                "inserted page {} is past the last page ({} pages); ignored",
                index, physical_count
            )));
        }
    }

    let mut pages = Vec::with_capacity(physical_count + config.omitted_pages.len());
    let mut index_map = Vec::with_capacity(physical_count);
    let mut next_number = 1u32;
    let mut base = 0u32;
    let mut inserted_after_base = 0u32;

    for (physical, draft) in drafts.into_iter().enumerate() {
        let identifier = if physical > 0 && config.inserted_pages.contains(&physical) {
            let suffix = insert_suffix(inserted_after_base);
            inserted_after_base += 1;
            PageIdentifier::inserted(base, suffix)
        } else {
            while config.omitted_pages.contains(&next_number) {
                pages.push(Page::omitted(next_number));
                next_number += 1;
            }
            base = next_number;
            inserted_after_base = 0;
            next_number += 1;
            PageIdentifier::sequential(base)
        };

        index_map.push(pages.len());
        pages.push(Page {
            identifier,
            elements: draft.elements,
            bottom_continuation: draft.bottom_continuation,
            lines_used: draft.lines_used,
        });
    }

    for &number in &config.omitted_pages {
        if number == 0 || number >= next_number {
            warnings.push(PaginationWarning::config(format!(
                "omitted page {} is outside the document's page numbers 1-{}; ignored",
                number,
                next_number - 1
            )));
        }
    }

    debug!(
        physical = physical_count,
        total = pages.len(),
        "pages numbered"
    );
    NumberedPages { pages, index_map }
}
