pub mod access;
pub mod audit;
pub mod claims;
pub mod request_meta;
pub mod session;

pub use access::{AccessDecision, AccessProfile, AccessRequirement, DenialReason};
pub use audit::{AuditEvent, EventType, Outcome};
pub use claims::AuthClaims;
pub use request_meta::RequestMeta;
pub use session::SessionState;
