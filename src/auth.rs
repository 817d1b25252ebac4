//! Auth-domain identifiers, scope sets, secrets, and the token record.

pub mod id;
pub mod request;
pub mod scope;
pub mod secret;
pub mod token;

pub use id::*;
pub use request::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
