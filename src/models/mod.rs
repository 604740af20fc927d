pub mod ability;
pub mod section;

pub use ability::{Abilities, Ability};
pub use section::{Section, SectionInput};
