use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Giveaway service error variants.
///
/// Authentication failures all collapse into `Unauthorized` so the wire never
/// tells an unknown account apart from a wrong code or a dead session.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // validation
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid slug")]
    InvalidSlug,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("campaign is closed")]
    CampaignClosed,
    #[error("campaign has not started")]
    CampaignNotStarted,
    #[error("campaign has ended")]
    CampaignEnded,
    #[error("email is required")]
    EmailRequired,
    #[error("invalid invite code")]
    InvalidInviteCode,
    #[error("invalid or already used")]
    InvalidVerificationToken,

    // authorization
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,

    // not found
    #[error("campaign not found")]
    CampaignNotFound,
    #[error("claim not found")]
    ClaimNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("invite code not found")]
    InviteCodeNotFound,
    #[error("version not found")]
    VersionNotFound,
    #[error("draft not found")]
    DraftNotFound,

    // conflict
    #[error("campaign is at capacity")]
    CapacityReached,
    #[error("a claim for this address already exists")]
    DuplicateAddress,
    #[error("too many claims for this email")]
    TooManyClaimsForEmail,
    #[error("too many claims at this address")]
    TooManyClaimsAtAddress,
    #[error("slug already taken")]
    SlugTaken,
    #[error("email already taken")]
    EmailTaken,
    #[error("campaign has claims")]
    CampaignHasClaims,
    #[error("claim already completed")]
    ClaimAlreadyCompleted,
    #[error("invite code already exists")]
    InviteCodeTaken,

    #[error("too many requests")]
    RateLimited,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidSlug => "INVALID_SLUG",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::CampaignClosed => "CAMPAIGN_CLOSED",
            Self::CampaignNotStarted => "CAMPAIGN_NOT_STARTED",
            Self::CampaignEnded => "CAMPAIGN_ENDED",
            Self::EmailRequired => "EMAIL_REQUIRED",
            Self::InvalidInviteCode => "INVALID_INVITE_CODE",
            Self::InvalidVerificationToken => "INVALID_VERIFICATION_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::CampaignNotFound => "CAMPAIGN_NOT_FOUND",
            Self::ClaimNotFound => "CLAIM_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InviteCodeNotFound => "INVITE_CODE_NOT_FOUND",
            Self::VersionNotFound => "VERSION_NOT_FOUND",
            Self::DraftNotFound => "DRAFT_NOT_FOUND",
            Self::CapacityReached => "CAPACITY_REACHED",
            Self::DuplicateAddress => "DUPLICATE_ADDRESS",
            Self::TooManyClaimsForEmail => "TOO_MANY_CLAIMS_FOR_EMAIL",
            Self::TooManyClaimsAtAddress => "TOO_MANY_CLAIMS_AT_ADDRESS",
            Self::SlugTaken => "SLUG_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::CampaignHasClaims => "CAMPAIGN_HAS_CLAIMS",
            Self::ClaimAlreadyCompleted => "CLAIM_ALREADY_COMPLETED",
            Self::InviteCodeTaken => "INVITE_CODE_TAKEN",
            Self::RateLimited => "RATE_LIMITED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields
            | Self::InvalidEmail
            | Self::InvalidSlug
            | Self::InvalidInput(_)
            | Self::CampaignClosed
            | Self::CampaignNotStarted
            | Self::CampaignEnded
            | Self::EmailRequired
            | Self::InvalidInviteCode
            | Self::InvalidVerificationToken => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CampaignNotFound
            | Self::ClaimNotFound
            | Self::UserNotFound
            | Self::InviteCodeNotFound
            | Self::VersionNotFound
            | Self::DraftNotFound => StatusCode::NOT_FOUND,
            Self::CapacityReached
            | Self::DuplicateAddress
            | Self::TooManyClaimsForEmail
            | Self::TooManyClaimsAtAddress
            | Self::SlugTaken
            | Self::EmailTaken
            | Self::CampaignHasClaims
            | Self::ClaimAlreadyCompleted
            | Self::InviteCodeTaken => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // TraceLayer already records every status; only the 500 chain needs logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
