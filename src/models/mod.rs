pub mod card;
pub mod template;

pub use card::*;
pub use template::*;
