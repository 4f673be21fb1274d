use super::state::CarouselSnapshot;

/// Gradient overlay opacity on a card that is not previewing.
const RESTING_OVERLAY_OPACITY: f64 = 0.6;

/// How one card should render for a given controller snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPresentation {
    pub preview: bool,
    /// Index into the card's images of the one to show.
    pub visible_image: usize,
    pub overlay_opacity: f64,
    pub badge_opacity: f64,
    /// Opacity of the title, author row and bookmark button.
    pub chrome_opacity: f64,
}

impl CardPresentation {
    pub fn for_card(snapshot: &CarouselSnapshot, index: i64) -> Self {
        match snapshot.preview.slide_for(index) {
            Some(slide) => Self {
                preview: true,
                visible_image: slide,
                overlay_opacity: 0.0,
                badge_opacity: 1.0,
                chrome_opacity: 0.0,
            },
            None => Self {
                preview: false,
                visible_image: 0,
                overlay_opacity: RESTING_OVERLAY_OPACITY,
                badge_opacity: 0.0,
                chrome_opacity: 1.0,
            },
        }
    }

    /// Opacity of image `image_index` in the card's crossfade stack.
    pub fn image_opacity(&self, image_index: usize) -> f64 {
        if image_index == self.visible_image {
            1.0
        } else {
            0.0
        }
    }
}
