use super::super::messages::Notification;
use super::super::state::Engine;
use super::Effect;

impl Engine {
    /// Apply one notification to the engine state.
    pub fn reduce(&mut self, notification: Notification) -> Vec<Effect> {
        let mut effects = Vec::new();

        match notification {
            Notification::Scrolled { offset } => self.handle_scrolled(offset, &mut effects),
            Notification::VisibilityChanged { image, entered } => {
                self.handle_visibility_changed(image, entered, &mut effects);
            }
            Notification::ScrollToTopRequested => self.handle_scroll_to_top(&mut effects),
            Notification::SectionsMeasured(index) => {
                self.handle_sections_measured(index, &mut effects);
            }
        }

        effects
    }
}
