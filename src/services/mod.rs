pub mod auth_service;
pub use auth_service::{AuthError, AuthService, LoginResult};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod token_service;
pub use token_service::{IssuedToken, ResolvedToken, TokenError, TokenService};

pub mod token_service_impl;
pub use token_service_impl::SeaOrmTokenService;

pub mod section_service;
pub use section_service::{SectionError, SectionService};

pub mod section_service_impl;
pub use section_service_impl::SeaOrmSectionService;
