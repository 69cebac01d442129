pub mod auth;
pub mod campaigns;
pub mod claims;
pub mod extract;
pub mod invite_codes;
pub mod public;
pub mod users;
