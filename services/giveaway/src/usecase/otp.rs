use std::fmt;

use chrono::{Duration, Utc};
use uuid::Uuid;

use giveaway_domain::email::{is_valid_email, normalize_email};
use giveaway_domain::hash::{generate_otp, hash};

use crate::domain::repository::{AdminUserRepository, Mailer, OtpRepository, SessionRepository};
use crate::domain::types::{
    AdminUser, OTP_MAX_ATTEMPTS, OTP_MAX_REQUESTS_PER_EMAIL, OTP_MAX_REQUESTS_PER_IP,
    OTP_RATE_WINDOW_MINUTES, OTP_TTL_MINUTES, OtpRequest,
};
use crate::error::ApiError;
use crate::usecase::session::SessionManager;

// ── Request ──────────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub email: String,
    pub ip_hash: Option<String>,
}

pub struct RequestOtpUseCase<U, O, M>
where
    U: AdminUserRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub admins: U,
    pub otps: O,
    pub mailer: M,
}

impl<U, O, M> RequestOtpUseCase<U, O, M>
where
    U: AdminUserRepository,
    O: OtpRepository,
    M: Mailer,
{
    /// Succeeds without side effects for unknown or inactive admins.
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), ApiError> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(ApiError::MissingFields);
        }
        if !is_valid_email(&email) {
            return Err(ApiError::InvalidEmail);
        }

        // 1. Unknown or inactive → success-shaped no-op
        let Some(admin) = self.admins.find_by_email(&email).await? else {
            return Ok(());
        };
        if !admin.is_active {
            return Ok(());
        }

        // 2. Rolling-window limits per email and per IP
        let now = Utc::now();
        let since = now - Duration::minutes(OTP_RATE_WINDOW_MINUTES);
        if self.otps.count_by_email_since(&email, since).await? >= OTP_MAX_REQUESTS_PER_EMAIL {
            return Err(ApiError::RateLimited);
        }
        if let Some(ip_hash) = input.ip_hash.as_deref() {
            if self.otps.count_by_ip_since(ip_hash, since).await? >= OTP_MAX_REQUESTS_PER_IP {
                return Err(ApiError::RateLimited);
            }
        }

        // 3. Persist the hashed code
        let code = generate_otp();
        let otp = OtpRequest {
            id: Uuid::new_v4(),
            email: email.clone(),
            otp_hash: hash(&code),
            ip_hash: input.ip_hash,
            attempts: 0,
            max_attempts: OTP_MAX_ATTEMPTS,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            used_at: None,
            created_at: now,
        };
        self.otps.create(&otp).await?;

        // 4. Deliver; failure is fatal here since login depends on it
        let text = format!(
            "Your sign-in code is {code}. It expires in {OTP_TTL_MINUTES} minutes.\n\n\
             If you did not request this code you can ignore this message."
        );
        self.mailer.send(&email, "Your sign-in code", &text).await?;
        tracing::info!(otp_id = %otp.id, admin_id = %admin.id, "otp issued");
        Ok(())
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub otp: String,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
}

pub struct VerifyOtpOutput {
    pub admin: AdminUser,
    /// Raw session token for the cookie.
    pub token: String,
}

impl fmt::Debug for VerifyOtpOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOtpOutput")
            .field("admin", &self.admin.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

pub struct VerifyOtpUseCase<U, O, S>
where
    U: AdminUserRepository,
    O: OtpRepository,
    S: SessionRepository,
{
    pub admins: U,
    pub otps: O,
    pub sessions: SessionManager<S>,
}

impl<U, O, S> VerifyOtpUseCase<U, O, S>
where
    U: AdminUserRepository,
    O: OtpRepository,
    S: SessionRepository,
{
    /// Every failure is `Unauthorized`.
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, ApiError> {
        let email = normalize_email(&input.email);
        let code = input.otp.trim();
        if email.is_empty() || code.is_empty() {
            return Err(ApiError::MissingFields);
        }

        // 1. Latest unused code, still live, with attempts left
        let otp = self
            .otps
            .find_latest_unused(&email)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        let now = Utc::now();
        if otp.is_expired_at(now) || otp.attempts_exhausted() {
            return Err(ApiError::Unauthorized);
        }

        // 2. Every guess spends an attempt before the comparison
        if !self.otps.try_take_attempt(otp.id).await? {
            return Err(ApiError::Unauthorized);
        }
        if hash(code) != otp.otp_hash {
            return Err(ApiError::Unauthorized);
        }

        // 3. Single use
        if !self.otps.mark_used(otp.id, now).await? {
            return Err(ApiError::Unauthorized);
        }

        // 4. Admin must still be active
        let admin = self
            .admins
            .find_by_email(&email)
            .await?
            .filter(|a| a.is_active)
            .ok_or(ApiError::Unauthorized)?;

        let token = self
            .sessions
            .create(admin.id, input.ip_hash, input.user_agent.as_deref())
            .await?;
        Ok(VerifyOtpOutput { admin, token })
    }
}
