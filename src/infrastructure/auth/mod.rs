//! Authentication infrastructure module
//!
//! Session tokens and the identity resolver that accepts passwords, API keys
//! and sessions.

mod resolver;
mod session;

pub use resolver::{Credential, IdentityResolver};
pub use session::{SessionClaims, SessionConfig, SessionService};
