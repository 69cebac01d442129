use chrono::{Duration, Utc};

use uuid::Uuid;

use giveaway_api::domain::types::{CampaignSettings, ClaimStatus, EmailVerification};
use giveaway_api::error::ApiError;
use giveaway_api::usecase::claim::{
    GetPublicCampaignUseCase, SubmitClaimInput, SubmitClaimOutput, SubmitClaimUseCase,
    VerifyEmailUseCase,
};
use giveaway_domain::hash::hash;

use crate::helpers::{
    BASE_URL, MockCampaignRepo, MockClaimRepo, MockInviteCodeRepo, MockMailer,
    MockVerificationRepo, test_address, test_applicant, test_campaign, test_invite,
    test_claim, test_settings, token_after,
};

/// Everything one campaign's submit flow touches.
struct Fixture {
    campaigns: MockCampaignRepo,
    claims: MockClaimRepo,
    invite_codes: MockInviteCodeRepo,
    verifications: MockVerificationRepo,
    mailer: MockMailer,
}

impl Fixture {
    fn new(settings: CampaignSettings) -> Self {
        let claims = MockClaimRepo::default();
        Self {
            campaigns: MockCampaignRepo::new(vec![test_campaign(settings)]),
            verifications: MockVerificationRepo::new(claims.clone()),
            claims,
            invite_codes: MockInviteCodeRepo::default(),
            mailer: MockMailer::default(),
        }
    }

    fn campaign_id(&self) -> uuid::Uuid {
        self.campaigns.campaigns.lock().unwrap()[0].id
    }

    fn usecase(
        &self,
    ) -> SubmitClaimUseCase<
        MockCampaignRepo,
        MockClaimRepo,
        MockInviteCodeRepo,
        MockVerificationRepo,
        MockMailer,
    > {
        SubmitClaimUseCase {
            campaigns: self.campaigns.clone(),
            claims: self.claims.clone(),
            invite_codes: self.invite_codes.clone(),
            verifications: self.verifications.clone(),
            mailer: self.mailer.clone(),
            public_base_url: BASE_URL.to_owned(),
        }
    }

    async fn submit(&self, input: SubmitClaimInput) -> Result<SubmitClaimOutput, ApiError> {
        self.usecase().execute(input).await
    }
}

fn input() -> SubmitClaimInput {
    SubmitClaimInput {
        slug: "free-book".to_owned(),
        applicant: test_applicant(),
        address: test_address(),
        invite_code: None,
        ip_hash: Some(hash("203.0.113.5")),
        user_agent: Some("test-agent".to_owned()),
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_confirm_claim_immediately_without_verification() {
    let fx = Fixture::new(test_settings());

    let output = fx.submit(input()).await.unwrap();
    assert!(!output.requires_verification);

    let claim = fx.claims.get(output.claim_id).unwrap();
    assert_eq!(claim.status, ClaimStatus::Confirmed);
    assert!(claim.confirmed_at.is_some());
    assert_eq!(claim.email_normalized.as_deref(), Some("ada@example.com"));
    assert!(claim.location_fingerprint.is_some());
    assert!(fx.mailer.sent().is_empty());
}

#[tokio::test]
async fn should_flag_claims_made_in_test_mode() {
    let fx = Fixture::new(CampaignSettings {
        test_mode: true,
        ..test_settings()
    });
    let output = fx.submit(input()).await.unwrap();
    assert!(fx.claims.get(output.claim_id).unwrap().is_test_claim);
}

// ── Gates, in order ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_slug() {
    let fx = Fixture::new(test_settings());
    let result = fx
        .submit(SubmitClaimInput {
            slug: "nope".to_owned(),
            ..input()
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::CampaignNotFound)),
        "expected CampaignNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_refuse_inactive_campaign() {
    let fx = Fixture::new(CampaignSettings {
        is_active: false,
        ..test_settings()
    });
    assert!(matches!(
        fx.submit(input()).await,
        Err(ApiError::CampaignClosed)
    ));
}

#[tokio::test]
async fn should_enforce_campaign_window() {
    let now = Utc::now();
    let early = Fixture::new(CampaignSettings {
        starts_at: Some(now + Duration::hours(1)),
        ..test_settings()
    });
    assert!(matches!(
        early.submit(input()).await,
        Err(ApiError::CampaignNotStarted)
    ));

    let late = Fixture::new(CampaignSettings {
        ends_at: Some(now - Duration::hours(1)),
        ..test_settings()
    });
    assert!(matches!(
        late.submit(input()).await,
        Err(ApiError::CampaignEnded)
    ));
}

#[tokio::test]
async fn should_require_name_and_full_address() {
    let fx = Fixture::new(test_settings());
    let mut missing_city = input();
    missing_city.address.city = "   ".to_owned();
    assert!(matches!(
        fx.submit(missing_city).await,
        Err(ApiError::MissingFields)
    ));

    let mut missing_name = input();
    missing_name.applicant.last_name = String::new();
    assert!(matches!(
        fx.submit(missing_name).await,
        Err(ApiError::MissingFields)
    ));
}

#[tokio::test]
async fn should_require_email_when_configured() {
    let fx = Fixture::new(CampaignSettings {
        require_email: true,
        ..test_settings()
    });
    let mut no_email = input();
    no_email.applicant.email = None;
    assert!(matches!(
        fx.submit(no_email).await,
        Err(ApiError::EmailRequired)
    ));
}

#[tokio::test]
async fn should_reject_malformed_email_even_when_optional() {
    let fx = Fixture::new(test_settings());
    let mut bad = input();
    bad.applicant.email = Some("ada@nowhere".to_owned());
    assert!(matches!(fx.submit(bad).await, Err(ApiError::InvalidEmail)));
}

#[tokio::test]
async fn should_consume_invite_code_case_insensitively() {
    let fx = Fixture::new(CampaignSettings {
        require_invite_code: true,
        ..test_settings()
    });
    let invite = test_invite(fx.campaign_id(), "VIP2026", Some(1));
    fx.invite_codes.codes.lock().unwrap().push(invite.clone());

    let output = fx
        .submit(SubmitClaimInput {
            invite_code: Some(" vip2026 ".to_owned()),
            ..input()
        })
        .await
        .unwrap();
    assert_eq!(fx.invite_codes.get(invite.id).unwrap().uses, 1);
    assert_eq!(
        fx.claims.get(output.claim_id).unwrap().invite_code.as_deref(),
        Some("VIP2026")
    );

    // Cap reached: a different applicant is turned away.
    let mut second = input();
    second.applicant.first_name = "Charles".to_owned();
    second.invite_code = Some("VIP2026".to_owned());
    assert!(matches!(
        fx.submit(second).await,
        Err(ApiError::InvalidInviteCode)
    ));
}

#[tokio::test]
async fn should_reject_missing_or_unknown_invite_code() {
    let fx = Fixture::new(CampaignSettings {
        require_invite_code: true,
        ..test_settings()
    });
    assert!(matches!(
        fx.submit(input()).await,
        Err(ApiError::InvalidInviteCode)
    ));
    assert!(matches!(
        fx.submit(SubmitClaimInput {
            invite_code: Some("WRONG".to_owned()),
            ..input()
        })
        .await,
        Err(ApiError::InvalidInviteCode)
    ));
}

#[tokio::test]
async fn should_stop_at_capacity() {
    let fx = Fixture::new(CampaignSettings {
        capacity_total: Some(1),
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();

    let mut second = input();
    second.applicant.first_name = "Charles".to_owned();
    assert!(matches!(
        fx.submit(second).await,
        Err(ApiError::CapacityReached)
    ));
}

#[tokio::test]
async fn should_treat_zero_capacity_as_unlimited() {
    let fx = Fixture::new(CampaignSettings {
        capacity_total: Some(0),
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();
}

#[tokio::test]
async fn should_limit_claims_per_ip_per_day() {
    let fx = Fixture::new(CampaignSettings {
        max_claims_per_ip_per_day: 1,
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();

    let mut second = input();
    second.applicant.first_name = "Charles".to_owned();
    second.address.address1 = "1 Difference Rd".to_owned();
    assert!(matches!(
        fx.submit(second).await,
        Err(ApiError::RateLimited)
    ));
}

#[tokio::test]
async fn should_detect_duplicate_address_despite_formatting() {
    let fx = Fixture::new(test_settings());
    fx.submit(input()).await.unwrap();

    let mut again = input();
    again.applicant.first_name = " ADA ".to_owned();
    again.address.postal_code = "n19gu".to_owned();
    again.address.country = "gb".to_owned();
    again.ip_hash = None;
    let result = fx.submit(again).await;
    assert!(
        matches!(result, Err(ApiError::DuplicateAddress)),
        "expected DuplicateAddress, got {result:?}"
    );
}

#[tokio::test]
async fn should_limit_claimants_per_location() {
    let fx = Fixture::new(CampaignSettings {
        max_claims_per_address: 1,
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();

    let mut housemate = input();
    housemate.applicant.first_name = "Annabella".to_owned();
    housemate.applicant.email = Some("annabella@example.com".to_owned());
    assert!(matches!(
        fx.submit(housemate).await,
        Err(ApiError::TooManyClaimsAtAddress)
    ));
}

#[tokio::test]
async fn should_limit_claims_per_email() {
    let fx = Fixture::new(CampaignSettings {
        max_claims_per_email: 1,
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();

    let mut other = input();
    other.applicant.first_name = "Charles".to_owned();
    other.address.address1 = "1 Difference Rd".to_owned();
    other.applicant.email = Some("ADA@example.com".to_owned());
    assert!(matches!(
        fx.submit(other).await,
        Err(ApiError::TooManyClaimsForEmail)
    ));
}

// ── Email verification ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_claim_pending_until_link_is_followed() {
    let fx = Fixture::new(CampaignSettings {
        require_email_verification: true,
        ..test_settings()
    });

    let output = fx.submit(input()).await.unwrap();
    assert!(output.requires_verification);
    assert_eq!(
        fx.claims.get(output.claim_id).unwrap().status,
        ClaimStatus::Pending
    );

    let sent = fx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].text.contains(&format!("{BASE_URL}/verify?token=")));
    let token = token_after(&sent[0].text, "token=");

    let verify = VerifyEmailUseCase {
        verifications: fx.verifications.clone(),
    };
    assert_eq!(verify.execute(&token).await.unwrap(), output.claim_id);
    let claim = fx.claims.get(output.claim_id).unwrap();
    assert_eq!(claim.status, ClaimStatus::Confirmed);
    assert!(claim.confirmed_at.is_some());

    let again = verify.execute(&token).await;
    assert!(
        matches!(again, Err(ApiError::InvalidVerificationToken)),
        "expected InvalidVerificationToken, got {again:?}"
    );
}

#[tokio::test]
async fn should_require_email_when_verification_is_on() {
    let fx = Fixture::new(CampaignSettings {
        require_email_verification: true,
        ..test_settings()
    });
    let mut no_email = input();
    no_email.applicant.email = None;
    assert!(matches!(
        fx.submit(no_email).await,
        Err(ApiError::EmailRequired)
    ));
}

#[tokio::test]
async fn should_create_pending_claim_even_if_mail_fails() {
    let mut fx = Fixture::new(CampaignSettings {
        require_email_verification: true,
        ..test_settings()
    });
    fx.mailer = MockMailer::failing();

    let output = fx.submit(input()).await.unwrap();
    assert_eq!(
        fx.claims.get(output.claim_id).unwrap().status,
        ClaimStatus::Pending
    );
}

#[tokio::test]
async fn should_leave_claim_pending_when_link_expired() {
    let mut claim = test_claim(Uuid::new_v4());
    claim.status = ClaimStatus::Pending;
    claim.confirmed_at = None;
    let claims = MockClaimRepo::new(vec![claim.clone()]);
    let verifications = MockVerificationRepo::new(claims.clone());
    let issued = Utc::now() - Duration::hours(25);
    verifications
        .verifications
        .lock()
        .unwrap()
        .push(EmailVerification {
            id: Uuid::new_v4(),
            claim_id: claim.id,
            token_hash: hash("stale-token"),
            expires_at: issued + Duration::hours(24),
            used_at: None,
            created_at: issued,
        });

    let result = VerifyEmailUseCase { verifications }
        .execute("stale-token")
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidVerificationToken)),
        "expected InvalidVerificationToken, got {result:?}"
    );
    let stored = claims.get(claim.id).unwrap();
    assert_eq!(stored.status, ClaimStatus::Pending);
    assert!(stored.confirmed_at.is_none());
}

#[tokio::test]
async fn should_reject_blank_verification_token() {
    let verify = VerifyEmailUseCase {
        verifications: MockVerificationRepo::default(),
    };
    assert!(matches!(
        verify.execute("  ").await,
        Err(ApiError::InvalidVerificationToken)
    ));
}

// ── Public view ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_show_remaining_capacity_when_scarcity_is_on() {
    let fx = Fixture::new(CampaignSettings {
        capacity_total: Some(5),
        show_scarcity: true,
        ..test_settings()
    });
    fx.submit(input()).await.unwrap();

    let uc = GetPublicCampaignUseCase {
        campaigns: fx.campaigns.clone(),
        claims: fx.claims.clone(),
    };
    let view = uc.execute("free-book").await.unwrap();
    assert_eq!(view.title, "Free book");
    assert_eq!(view.remaining, Some(4));
}

#[tokio::test]
async fn should_hide_inactive_campaign_from_public() {
    let fx = Fixture::new(CampaignSettings {
        is_active: false,
        ..test_settings()
    });
    let uc = GetPublicCampaignUseCase {
        campaigns: fx.campaigns.clone(),
        claims: fx.claims.clone(),
    };
    assert!(matches!(
        uc.execute("free-book").await,
        Err(ApiError::CampaignNotFound)
    ));
}
