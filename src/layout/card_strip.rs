use crate::error::{CarouselError, Result};

/// Fraction of the viewport width a card occupies.
const CARD_VIEWPORT_FRACTION: f64 = 0.7;

/// Scale lost by a card one full pitch away from the scroll position.
const MAX_SCALE_LOSS: f64 = 0.1;

/// Opacity lost by a card one full pitch away from the scroll position.
const MAX_OPACITY_LOSS: f64 = 0.4;

/// Horizontal drift (px) of a card one full pitch away.
const MAX_DRIFT_PX: f64 = 20.0;

/// Geometry of a horizontally scrolling strip of equally sized cards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStrip {
    /// Card width in pixels (default: 300)
    pub card_width: f64,
    /// Gap between neighbouring cards in pixels (default: 16)
    pub gap: f64,
}

impl Default for CardStrip {
    fn default() -> Self {
        Self {
            card_width: 300.0,
            gap: 16.0,
        }
    }
}

/// Visual treatment of one card for the current scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub scale: f64,
    pub opacity: f64,
    pub translate_x: f64,
}

impl CardStrip {
    pub fn new(card_width: f64, gap: f64) -> Self {
        Self { card_width, gap }
    }

    /// Strip sized for a viewport: cards take 70% of its width.
    pub fn from_viewport(viewport_width: f64, gap: f64) -> Self {
        Self {
            card_width: viewport_width.max(0.0) * CARD_VIEWPORT_FRACTION,
            gap,
        }
    }

    /// Distance between the leading edges of two neighbouring cards.
    pub fn pitch(&self) -> f64 {
        self.card_width + self.gap
    }

    /// Scroll offset at which card `index` is aligned to the leading edge.
    pub fn card_start(&self, index: i64) -> f64 {
        index as f64 * self.pitch()
    }

    pub fn closest_index(&self, offset: f64) -> Result<i64> {
        closest_index(offset, self.pitch())
    }

    /// Computes scale, opacity and drift for card `index` at `scroll_x`.
    ///
    /// The treatment falls off linearly with distance from the scroll
    /// position and saturates one pitch away. A degenerate pitch yields the
    /// untouched treatment for the card under the offset and the saturated one
    /// elsewhere.
    pub fn transform(&self, index: i64, scroll_x: f64) -> CardTransform {
        let pitch = self.pitch();
        let distance = (scroll_x - self.card_start(index)).abs();
        let progress = if pitch > 0.0 && pitch.is_finite() {
            (distance / pitch).min(1.0)
        } else if distance == 0.0 {
            0.0
        } else {
            1.0
        };

        CardTransform {
            scale: 1.0 - progress * MAX_SCALE_LOSS,
            opacity: 1.0 - progress * MAX_OPACITY_LOSS,
            translate_x: -progress * MAX_DRIFT_PX,
        }
    }
}

/// Maps a scroll offset to the nearest card index.
///
/// Ties round towards the larger index (`floor(x + 0.5)`). The result is not
/// clamped to the deck, so offsets past either end yield out-of-range indices.
///
/// # Errors
/// `InvalidArgument` if `pitch` is not a positive finite number or `offset` is
/// not finite.
pub fn closest_index(offset: f64, pitch: f64) -> Result<i64> {
    if !pitch.is_finite() || pitch <= 0.0 {
        return Err(CarouselError::invalid("card_pitch", pitch));
    }
    if !offset.is_finite() {
        return Err(CarouselError::invalid("offset", offset));
    }
    Ok((offset / pitch + 0.5).floor() as i64)
}
