//! Navigation links and the exclusive "active" highlight.

use super::sections::SectionId;
use crate::host::ElementId;
use once_cell::sync::Lazy;
use regex::Regex;

static FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([^#\s]+)$").expect("fragment pattern is valid"));

/// Extract the target section of an in-page link (`#cars`, `/index.html#cars`).
pub fn link_target(href: &str) -> Option<SectionId> {
    FRAGMENT
        .captures(href.trim())
        .and_then(|caps| caps.get(1))
        .map(|fragment| SectionId::new(fragment.as_str()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub element: ElementId,
    pub target: SectionId,
    pub active: bool,
}

impl NavLink {
    pub fn new(element: ElementId, target: SectionId) -> Self {
        Self {
            element,
            target,
            active: false,
        }
    }
}

/// Owns the nav links and keeps at most one of them active.
#[derive(Debug, Clone, Default)]
pub struct NavHighlight {
    links: Vec<NavLink>,
    synced: bool,
}

impl NavHighlight {
    pub fn new(links: Vec<NavLink>) -> Self {
        Self {
            links,
            synced: false,
        }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn active_link(&self) -> Option<&NavLink> {
        self.links.iter().find(|link| link.active)
    }

    /// Point the highlight at `active` and return the links whose flag must be
    /// written to the document.
    ///
    /// Only the first link targeting the active section is lit. The first pass
    /// reports every link so stale markup is cleared; later passes report only
    /// the links that flipped.
    pub fn sync(&mut self, active: Option<&SectionId>) -> Vec<(ElementId, bool)> {
        let winner = active.and_then(|id| self.links.iter().position(|link| &link.target == id));
        let full_pass = !self.synced;
        self.synced = true;

        let mut changes = Vec::new();
        for (idx, link) in self.links.iter_mut().enumerate() {
            let next = Some(idx) == winner;
            if full_pass || link.active != next {
                link.active = next;
                changes.push((link.element.clone(), next));
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav(pairs: &[(&str, &str)]) -> NavHighlight {
        NavHighlight::new(
            pairs
                .iter()
                .map(|(element, target)| NavLink::new(ElementId::new(*element), SectionId::new(*target)))
                .collect(),
        )
    }

    fn active_count(nav: &NavHighlight) -> usize {
        nav.links().iter().filter(|link| link.active).count()
    }

    #[test]
    fn parses_fragment_targets() {
        assert_eq!(link_target("#cars"), Some(SectionId::new("cars")));
        assert_eq!(link_target("/index.html#contact"), Some(SectionId::new("contact")));
        assert_eq!(link_target(" #hero "), Some(SectionId::new("hero")));
        assert_eq!(link_target("https://example.com/about"), None);
        assert_eq!(link_target("#"), None);
    }

    #[test]
    fn first_sync_reports_every_link() {
        let mut nav = nav(&[("nav-hero", "hero"), ("nav-cars", "cars")]);
        let changes = nav.sync(Some(&SectionId::new("cars")));
        assert_eq!(
            changes,
            vec![
                (ElementId::new("nav-hero"), false),
                (ElementId::new("nav-cars"), true),
            ]
        );
        assert_eq!(nav.active_link().map(|l| l.element.as_str()), Some("nav-cars"));
    }

    #[test]
    fn later_syncs_only_report_flips() {
        let mut nav = nav(&[("nav-hero", "hero"), ("nav-cars", "cars"), ("nav-contact", "contact")]);
        nav.sync(Some(&SectionId::new("hero")));

        assert!(nav.sync(Some(&SectionId::new("hero"))).is_empty());
        let changes = nav.sync(Some(&SectionId::new("contact")));
        assert_eq!(
            changes,
            vec![
                (ElementId::new("nav-hero"), false),
                (ElementId::new("nav-contact"), true),
            ]
        );
    }

    #[test]
    fn no_section_clears_the_highlight() {
        let mut nav = nav(&[("nav-hero", "hero"), ("nav-cars", "cars")]);
        nav.sync(Some(&SectionId::new("cars")));
        let changes = nav.sync(None);
        assert_eq!(changes, vec![(ElementId::new("nav-cars"), false)]);
        assert_eq!(active_count(&nav), 0);
    }

    #[test]
    fn overlapping_ids_do_not_light_two_links() {
        let mut nav = nav(&[("nav-car", "car"), ("nav-cars", "cars"), ("nav-cars-2", "cars")]);
        nav.sync(Some(&SectionId::new("cars")));
        assert_eq!(active_count(&nav), 1);
        assert_eq!(nav.active_link().map(|l| l.element.as_str()), Some("nav-cars"));

        nav.sync(Some(&SectionId::new("car")));
        assert_eq!(active_count(&nav), 1);
        assert_eq!(nav.active_link().map(|l| l.element.as_str()), Some("nav-car"));
    }

    #[test]
    fn unknown_section_leaves_every_link_inactive() {
        let mut nav = nav(&[("nav-hero", "hero")]);
        nav.sync(Some(&SectionId::new("pricing")));
        assert_eq!(active_count(&nav), 0);
    }
}
