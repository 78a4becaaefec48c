use super::super::state::Engine;
use super::Effect;
use crate::host::ElementId;
use tracing::{debug, info, trace};

impl Engine {
    pub(super) fn handle_visibility_changed(
        &mut self,
        image: ElementId,
        entered: bool,
        effects: &mut Vec<Effect>,
    ) {
        if !entered {
            trace!(image = %image, "Image left the viewport");
            return;
        }

        match self.images.activate(&image) {
            Some(activation) => {
                info!(image = %activation.element, src = %activation.src, "Loading deferred image");
                effects.push(Effect::ActivateImage {
                    image: activation.element.clone(),
                    src: activation.src,
                });
                effects.push(Effect::Unobserve {
                    image: activation.element,
                });
            }
            None => {
                debug!(image = %image, "Visibility notification without a pending image; ignored");
            }
        }
    }
}
