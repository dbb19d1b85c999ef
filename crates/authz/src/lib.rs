//! Authentication for bookshelf: signed session tokens, the guards that
//! check them on incoming requests, the session cookie, and password hashing.

pub mod cookie;
pub mod guard;
pub mod password;
pub mod token;

pub use cookie::{clear_session_cookie, session_cookie, session_token, SESSION_COOKIE};
pub use guard::{require_bearer, require_cookie, AuthenticatedUser, GuardRejection, GuardState};
pub use password::{hash_password, verify_against_dummy, verify_password};
pub use token::{Claims, TokenError, TokenService, TOKEN_TTL};
