pub mod card_strip;

pub use card_strip::*;
