/// A card in the carousel strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Image identifiers shown by the preview slideshow, in order.
    pub images: Vec<String>,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// Immutable ordered card sequence supplied to the carousel at mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardDeck {
    cards: Vec<Card>,
}

impl CardDeck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Demo deck of `count` cards with `images_per_card` images each.
    pub fn uniform(count: usize, images_per_card: usize) -> Self {
        let cards = (0..count)
            .map(|i| {
                let images =
                    (0..images_per_card).map(|j| format!("/prank-{}-{}.jpg", i + 1, j + 1));
                Card::new(format!("{}", i + 1), format!("Prank #{}", i + 1), "community")
                    .with_images(images)
            })
            .collect();
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card at a signed focus index. Negative and past-the-end indices are `None`.
    pub fn get(&self, index: i64) -> Option<&Card> {
        usize::try_from(index).ok().and_then(|i| self.cards.get(i))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Per-card image counts, in deck order.
    pub fn image_counts(&self) -> Vec<usize> {
        self.cards.iter().map(Card::image_count).collect()
    }
}
