// Services layer - Business logic and orchestration
pub mod access_resolver;
pub mod auth_service;
pub mod authorization_gate;
pub mod session_continuity;
pub mod token_service;

pub use access_resolver::AccessResolver;
pub use auth_service::{AuthService, LoginOutcome};
pub use authorization_gate::AuthorizationGate;
pub use session_continuity::{hydrate, Continuity, HydrationOutcome, SessionContinuity};
pub use token_service::TokenService;
