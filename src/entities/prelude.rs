pub use super::personal_access_tokens::Entity as PersonalAccessTokens;
pub use super::sections::Entity as Sections;
pub use super::users::Entity as Users;
