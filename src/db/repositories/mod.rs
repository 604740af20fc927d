pub mod section;
pub mod token;
pub mod user;
