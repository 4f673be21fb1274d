use crate::error::{CarouselError, Result};

/// A built-in prank template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub prompt: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "1",
        name: "Birthday Surprise",
        description: "Add party hats and confetti to any photo",
        image: "/template-1.jpg",
        prompt: "Add party hats, confetti, and birthday decorations to everyone in the photo",
    },
    Template {
        id: "2",
        name: "Office Chaos",
        description: "Turn boring meetings into wild scenarios",
        image: "/template-2.jpg",
        prompt: "Transform this boring office scene into absolute chaos with flying papers, confetti cannons, and people celebrating",
    },
    Template {
        id: "3",
        name: "Pet Takeover",
        description: "Your pet becomes the main character",
        image: "/template-3.jpg",
        prompt: "Make the pet in this photo the boss, sitting at a desk, wearing a suit, giving orders",
    },
    Template {
        id: "4",
        name: "Time Traveler",
        description: "Place anyone in a different era",
        image: "/template-4.jpg",
        prompt: "Transport the person in this photo to medieval times, wearing knight armor in a castle",
    },
    Template {
        id: "5",
        name: "Celebrity Swap",
        description: "Your friend meets their idol",
        image: "/template-5.jpg",
        prompt: "Place the person next to a celebrity on a red carpet event with paparazzi flashing",
    },
    Template {
        id: "6",
        name: "Vacation Fake",
        description: "Pretend you're somewhere exotic",
        image: "/template-6.jpg",
        prompt: "Put the person on a tropical beach in the Maldives with crystal clear water and overwater bungalows",
    },
];

/// Looks up a built-in template by id.
pub fn find_template(id: &str) -> Result<&'static Template> {
    TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| CarouselError::UnknownTemplate(id.to_string()))
}
