//! Access control: origin matching, the authorization policy and the CORS
//! headers that go on every guarded response.

pub mod cors;
pub mod origin;
pub mod policy;

pub use cors::apply_cors;
pub use origin::is_allowed;
pub use policy::{authorize, evaluate, AuthDecision, AuthReason, RequestCredentials};
