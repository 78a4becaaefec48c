use super::super::state::{Engine, SectionIndex, Visibility, resolve_active};
use super::Effect;
use tracing::{debug, info, trace};

impl Engine {
    pub(super) fn handle_scrolled(&mut self, offset: f32, effects: &mut Vec<Effect>) {
        self.scroll_offset = Self::sanitize_offset(offset);
        trace!(offset = self.scroll_offset, "Scroll notification");

        self.sync_active_section(effects);

        if let Some(next) = self.scroll_top.update(self.scroll_offset) {
            debug!(visibility = ?next, offset = self.scroll_offset, "Scroll-to-top visibility changed");
            if let Some(control) = self.scroll_top.element() {
                effects.push(Effect::SetScrollTopVisible {
                    control: control.clone(),
                    visible: next == Visibility::Visible,
                });
            }
        }
    }

    /// The last reduced offset may lag behind the host (debounced scrolls),
    /// so the request is always forwarded; scrolling to 0 is idempotent.
    pub(super) fn handle_scroll_to_top(&mut self, effects: &mut Vec<Effect>) {
        debug!(last_seen = self.scroll_offset, "Scrolling to top");
        effects.push(Effect::ScrollTo {
            offset: 0.0,
            smooth: self.config.smooth_scroll,
        });
    }

    pub(super) fn handle_sections_measured(&mut self, index: SectionIndex, effects: &mut Vec<Effect>) {
        info!(sections = index.len(), "Section index rebuilt");
        self.sections = index;
        self.sync_active_section(effects);
    }

    fn sync_active_section(&mut self, effects: &mut Vec<Effect>) {
        let active = resolve_active(
            self.scroll_offset,
            &self.sections,
            self.config.activation_margin_px,
        )
        .map(|section| section.id.clone());

        if active != self.active_section {
            info!(
                section = active.as_ref().map(|id| id.as_str()).unwrap_or(""),
                offset = self.scroll_offset,
                "Active section changed"
            );
        }

        for (link, is_active) in self.nav.sync(active.as_ref()) {
            effects.push(Effect::SetLinkActive {
                link,
                active: is_active,
            });
        }
        self.active_section = active;
    }

    pub(super) fn sanitize_offset(offset: f32) -> f32 {
        if offset.is_finite() { offset.max(0.0) } else { 0.0 }
    }
}
