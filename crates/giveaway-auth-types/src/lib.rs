//! Admin authentication types: roles, the permission matrix and the session cookie.

pub mod cookie;
pub mod role;
