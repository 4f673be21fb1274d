use crate::timers::Generation;

/// Preview status of the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// No card is previewing and no debounce is running.
    #[default]
    Idle,
    /// The debounce for `index` is running.
    Pending { index: i64 },
    /// `index` is previewing and shows image `slide`.
    Active { index: i64, slide: usize },
}

impl PreviewState {
    pub fn active_index(&self) -> Option<i64> {
        match *self {
            Self::Active { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn pending_index(&self) -> Option<i64> {
        match *self {
            Self::Pending { index } => Some(index),
            _ => None,
        }
    }

    /// Slide shown by `index`, if that card is previewing.
    pub fn slide_for(&self, index: i64) -> Option<usize> {
        match *self {
            Self::Active { index: i, slide } if i == index => Some(slide),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Read-only view of the controller handed to the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarouselSnapshot {
    /// Card the choreography currently targets.
    pub focused: Option<i64>,
    pub preview: PreviewState,
    /// Bumped on every observable change.
    pub revision: u64,
}

impl CarouselSnapshot {
    pub fn is_previewing(&self, index: i64) -> bool {
        self.preview.active_index() == Some(index)
    }
}

/// Timer events owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselTimer {
    /// The focus debounce for `index` elapsed.
    Debounce { generation: Generation, index: i64 },
    /// The preview slideshow period elapsed.
    SlideTick { generation: Generation },
}

impl CarouselTimer {
    pub fn generation(&self) -> Generation {
        match *self {
            Self::Debounce { generation, .. } | Self::SlideTick { generation } => generation,
        }
    }
}
