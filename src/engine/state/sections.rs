//! Section index and the active-section rule.

use crate::host::Host;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifier of a document section, matching its element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A measured section: its id and top offset from the document start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub offset: f32,
}

impl Section {
    pub fn new(id: impl Into<String>, offset: f32) -> Self {
        Self {
            id: SectionId::new(id),
            offset,
        }
    }
}

/// Snapshot of the document's sections in document order.
///
/// Offsets are measured once; after layout changes the caller scans again and
/// hands the new index to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionIndex {
    sections: Vec<Section>,
}

impl SectionIndex {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Enumerate the host's sections and measure each one. Sections whose
    /// element cannot be measured are left out.
    pub fn scan<H: Host + ?Sized>(host: &H) -> Self {
        let sections = host
            .section_ids()
            .into_iter()
            .filter_map(|id| match host.element_offset(&id) {
                Some(offset) if offset.is_finite() => Some(Section { id, offset }),
                _ => {
                    debug!(section = %id, "Skipping section without a measurable offset");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!(count = sections.len(), "Scanned document sections");
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| &section.id == id)
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Resolve which section is active at `scroll_offset`.
///
/// A section qualifies once the offset reaches `section.offset - margin`.
/// Every qualifying section overwrites the previous one, so the furthest-down
/// qualifying section in document order wins, and nothing is active before
/// the first section qualifies.
pub fn resolve_active(scroll_offset: f32, index: &SectionIndex, margin: f32) -> Option<&Section> {
    let mut active = None;
    for section in index.sections() {
        if scroll_offset >= section.offset - margin {
            active = Some(section);
        }
    }
    active
}
