//! sea-orm entities for the giveaway datastore.

pub mod admin_sessions;
pub mod admin_users;
pub mod campaign_versions;
pub mod campaigns;
pub mod claims;
pub mod email_verifications;
pub mod invite_codes;
pub mod otp_requests;
