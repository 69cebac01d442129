pub mod admin_claim;
pub mod admin_user;
pub mod campaign;
pub mod claim;
pub mod claim_csv;
pub mod claim_token;
pub mod invite_code;
pub mod otp;
pub mod session;
pub mod version;
