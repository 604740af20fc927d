pub mod prelude;

pub mod personal_access_tokens;
pub mod sections;
pub mod users;
