use giveaway_api::domain::types::{
    Applicant, BulkAction, Campaign, ClaimFilter, ClaimStatus, CampaignSettings,
};
use giveaway_api::error::ApiError;
use giveaway_api::usecase::admin_claim::{
    BulkClaimsUseCase, ClaimPatch, DeleteClaimUseCase, GenerateGiftCodesUseCase, GetClaimUseCase,
    ListClaimsUseCase, PrecreateClaimUseCase, RegisterClaimInput, RegisterClaimUseCase,
    UpdateClaimUseCase,
};
use giveaway_api::usecase::claim_token::{
    CompleteClaimTokenInput, CompleteClaimTokenUseCase, GetClaimTokenUseCase,
};
use giveaway_auth_types::role::AdminRole;
use giveaway_domain::fingerprint::placeholder_fingerprint;
use giveaway_domain::pagination::PageRequest;

use crate::helpers::{
    BASE_URL, MockCampaignRepo, MockClaimRepo, identity, test_address, test_applicant,
    test_campaign, test_settings,
};

fn setup() -> (Campaign, MockCampaignRepo, MockClaimRepo) {
    let campaign = test_campaign(test_settings());
    let campaigns = MockCampaignRepo::new(vec![campaign.clone()]);
    (campaign, campaigns, MockClaimRepo::default())
}

async fn register(
    campaigns: &MockCampaignRepo,
    claims: &MockClaimRepo,
    campaign: &Campaign,
    first_name: &str,
) -> Result<giveaway_api::domain::types::Claim, ApiError> {
    let uc = RegisterClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
    };
    let mut applicant = test_applicant();
    applicant.first_name = first_name.to_owned();
    uc.execute(
        identity(AdminRole::Admin),
        campaign.id,
        RegisterClaimInput {
            applicant,
            address: test_address(),
        },
    )
    .await
}

// ── Registration ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_confirmed_claim() {
    let (campaign, campaigns, claims) = setup();
    let claim = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Confirmed);
    assert!(claim.confirmed_at.is_some());
    assert!(claim.claim_token.is_none());
}

#[tokio::test]
async fn should_keep_duplicate_check_for_registration() {
    let (campaign, campaigns, claims) = setup();
    register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    let result = register(&campaigns, &claims, &campaign, "ada").await;
    assert!(
        matches!(result, Err(ApiError::DuplicateAddress)),
        "expected DuplicateAddress, got {result:?}"
    );
}

#[tokio::test]
async fn should_forbid_viewer_from_registering() {
    let (campaign, campaigns, claims) = setup();
    let uc = RegisterClaimUseCase {
        campaigns,
        claims: claims.clone(),
    };
    let result = uc
        .execute(
            identity(AdminRole::Viewer),
            campaign.id,
            RegisterClaimInput {
                applicant: test_applicant(),
                address: test_address(),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
    assert!(claims.all().is_empty());
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_page_and_filter_claims() {
    let (campaign, campaigns, claims) = setup();
    for name in ["Ada", "Charles", "Mary"] {
        register(&campaigns, &claims, &campaign, name).await.unwrap();
    }
    let precreate = PrecreateClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    precreate
        .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
        .await
        .unwrap();

    let uc = ListClaimsUseCase {
        campaigns,
        claims,
    };
    let page = uc
        .execute(
            identity(AdminRole::Viewer),
            campaign.id,
            ClaimFilter::default(),
            PageRequest {
                per_page: 2,
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 2);

    let pending = uc
        .execute(
            identity(AdminRole::Viewer),
            campaign.id,
            ClaimFilter {
                status: Some(ClaimStatus::Pending),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.total, 1);
}

// ── Update / delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_refingerprint_on_address_change() {
    let (campaign, campaigns, claims) = setup();
    let claim = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();

    let uc = UpdateClaimUseCase {
        claims: claims.clone(),
    };
    let updated = uc
        .execute(
            identity(AdminRole::Admin),
            claim.id,
            ClaimPatch {
                address1: Some("99 Engine Street".to_owned()),
                shipped: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_ne!(updated.address_fingerprint, claim.address_fingerprint);
    assert_ne!(updated.location_fingerprint, claim.location_fingerprint);
    assert!(updated.shipped_at.is_some());
}

#[tokio::test]
async fn should_reject_update_that_duplicates_another_claim() {
    let (campaign, campaigns, claims) = setup();
    register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    let charles = register(&campaigns, &claims, &campaign, "Charles")
        .await
        .unwrap();

    let uc = UpdateClaimUseCase {
        claims: claims.clone(),
    };
    let result = uc
        .execute(
            identity(AdminRole::Admin),
            charles.id,
            ClaimPatch {
                first_name: Some("Ada".to_owned()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::DuplicateAddress)));
    assert_eq!(
        claims.get(charles.id).unwrap().applicant.first_name,
        "Charles"
    );
}

#[tokio::test]
async fn should_not_treat_unchanged_claim_as_its_own_duplicate() {
    let (campaign, campaigns, claims) = setup();
    let claim = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();

    let uc = UpdateClaimUseCase {
        claims: claims.clone(),
    };
    let updated = uc
        .execute(
            identity(AdminRole::Admin),
            claim.id,
            ClaimPatch {
                phone: Some("+44 20 0000 0000".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.address_fingerprint, claim.address_fingerprint);
    assert_eq!(updated.applicant.phone.as_deref(), Some("+44 20 0000 0000"));
}

#[tokio::test]
async fn should_delete_claim_and_report_missing_one() {
    let (campaign, campaigns, claims) = setup();
    let claim = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();

    let uc = DeleteClaimUseCase {
        claims: claims.clone(),
    };
    uc.execute(identity(AdminRole::Admin), claim.id).await.unwrap();
    assert!(claims.get(claim.id).is_none());

    let get = GetClaimUseCase { claims };
    assert!(matches!(
        get.execute(identity(AdminRole::Viewer), claim.id).await,
        Err(ApiError::ClaimNotFound)
    ));
    assert!(matches!(
        uc.execute(identity(AdminRole::Admin), claim.id).await,
        Err(ApiError::ClaimNotFound)
    ));
}

// ── Bulk ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_confirm_only_pending_claims_in_bulk() {
    let (campaign, campaigns, claims) = setup();
    let confirmed = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    let precreate = PrecreateClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    let pending = precreate
        .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
        .await
        .unwrap();

    let uc = BulkClaimsUseCase {
        campaigns,
        claims: claims.clone(),
    };
    let affected = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            BulkAction::Confirm,
            vec![confirmed.id, pending.claim_id],
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(
        claims.get(pending.claim_id).unwrap().status,
        ClaimStatus::Confirmed
    );
}

#[tokio::test]
async fn should_mark_shipped_and_delete_in_bulk() {
    let (campaign, campaigns, claims) = setup();
    let a = register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    let b = register(&campaigns, &claims, &campaign, "Charles").await.unwrap();

    let uc = BulkClaimsUseCase {
        campaigns,
        claims: claims.clone(),
    };
    let shipped = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            BulkAction::MarkShipped,
            vec![a.id, b.id],
        )
        .await
        .unwrap();
    assert_eq!(shipped, 2);
    assert!(claims.all().iter().all(|c| c.shipped_at.is_some()));

    let deleted = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            BulkAction::Delete,
            vec![a.id],
        )
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(claims.all().len(), 1);
}

#[tokio::test]
async fn should_require_claim_ids_for_bulk() {
    let (campaign, campaigns, claims) = setup();
    let uc = BulkClaimsUseCase { campaigns, claims };
    let result = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            BulkAction::Confirm,
            vec![],
        )
        .await;
    assert!(matches!(result, Err(ApiError::MissingFields)));
}

// ── Pre-created claims ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_precreate_claim_with_placeholder_fingerprint() {
    let (campaign, campaigns, claims) = setup();
    let uc = PrecreateClaimUseCase {
        campaigns,
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    let created = uc
        .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
        .await
        .unwrap();

    assert_eq!(created.link, format!("{BASE_URL}/claim/{}", created.token));
    let claim = claims.get(created.claim_id).unwrap();
    assert_eq!(claim.status, ClaimStatus::Pending);
    assert!(claim.awaiting_address());
    assert_eq!(
        claim.address_fingerprint,
        placeholder_fingerprint(&created.token)
    );
}

#[tokio::test]
async fn should_complete_precreated_claim_once() {
    let (campaign, campaigns, claims) = setup();
    let precreate = PrecreateClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    let created = precreate
        .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
        .await
        .unwrap();

    let lookup = GetClaimTokenUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
    };
    let view = lookup.execute(&created.token).await.unwrap();
    assert_eq!(view.campaign_title, "Free book");
    assert_eq!(view.first_name, "Ada");
    assert!(!view.completed);

    let complete = CompleteClaimTokenUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
    };
    let input = || CompleteClaimTokenInput {
        token: created.token.clone(),
        applicant: Applicant::default(),
        address: test_address(),
    };
    let claim_id = complete.execute(input()).await.unwrap();
    assert_eq!(claim_id, created.claim_id);

    let claim = claims.get(claim_id).unwrap();
    assert_eq!(claim.status, ClaimStatus::Confirmed);
    assert_eq!(claim.applicant.last_name, "Lovelace");
    assert_ne!(
        claim.address_fingerprint,
        placeholder_fingerprint(&created.token)
    );
    assert!(lookup.execute(&created.token).await.unwrap().completed);

    let again = complete.execute(input()).await;
    assert!(
        matches!(again, Err(ApiError::ClaimAlreadyCompleted)),
        "expected ClaimAlreadyCompleted, got {again:?}"
    );
}

#[tokio::test]
async fn should_reject_completion_that_duplicates_existing_claim() {
    let (campaign, campaigns, claims) = setup();
    register(&campaigns, &claims, &campaign, "Ada").await.unwrap();
    let precreate = PrecreateClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    let created = precreate
        .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
        .await
        .unwrap();

    let complete = CompleteClaimTokenUseCase { campaigns, claims };
    let result = complete
        .execute(CompleteClaimTokenInput {
            token: created.token,
            applicant: Applicant::default(),
            address: test_address(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::DuplicateAddress)));
}

#[tokio::test]
async fn should_refuse_completion_for_closed_campaign() {
    let campaign = test_campaign(CampaignSettings {
        is_active: false,
        ..test_settings()
    });
    let campaigns = MockCampaignRepo::new(vec![campaign.clone()]);
    let claims = MockClaimRepo::default();
    let created = PrecreateClaimUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    }
    .execute(identity(AdminRole::Admin), campaign.id, test_applicant())
    .await
    .unwrap();

    let complete = CompleteClaimTokenUseCase { campaigns, claims };
    let result = complete
        .execute(CompleteClaimTokenInput {
            token: created.token,
            applicant: Applicant::default(),
            address: test_address(),
        })
        .await;
    assert!(matches!(result, Err(ApiError::CampaignClosed)));
}

#[tokio::test]
async fn should_not_find_unknown_claim_token() {
    let (_, campaigns, claims) = setup();
    let lookup = GetClaimTokenUseCase { campaigns, claims };
    assert!(matches!(
        lookup.execute("nope").await,
        Err(ApiError::ClaimNotFound)
    ));
}

// ── Gift codes ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mint_anonymous_gift_codes() {
    let (campaign, campaigns, claims) = setup();
    let uc = GenerateGiftCodesUseCase {
        campaigns,
        claims: claims.clone(),
        public_base_url: BASE_URL.to_owned(),
    };
    let codes = uc
        .execute(identity(AdminRole::Admin), campaign.id, 3)
        .await
        .unwrap();

    assert_eq!(codes.len(), 3);
    let all = claims.all();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|c| c.awaiting_address() && !c.applicant.has_name()));
    let mut tokens: Vec<_> = codes.iter().map(|c| c.token.clone()).collect();
    tokens.dedup();
    assert_eq!(tokens.len(), 3, "tokens are distinct");
}

#[tokio::test]
async fn should_bound_gift_code_batch_size() {
    let (campaign, campaigns, claims) = setup();
    let uc = GenerateGiftCodesUseCase {
        campaigns,
        claims,
        public_base_url: BASE_URL.to_owned(),
    };
    for count in [0, 501] {
        let result = uc.execute(identity(AdminRole::Admin), campaign.id, count).await;
        assert!(
            matches!(result, Err(ApiError::InvalidInput(_))),
            "count {count}: expected InvalidInput, got {result:?}"
        );
    }
}
