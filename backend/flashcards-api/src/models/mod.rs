pub mod applet;
pub mod card;
pub mod study;

pub use card::Card;
