use serde_json::{Map, Value, json};

use giveaway_api::error::ApiError;
use giveaway_api::usecase::campaign::{
    CreateCampaignInput, CreateCampaignUseCase, DeleteCampaignUseCase, GetCampaignUseCase,
    ListCampaignsUseCase, UpdateCampaignUseCase,
};
use giveaway_auth_types::role::AdminRole;

use crate::helpers::{
    MockCampaignRepo, MockClaimRepo, identity, test_campaign, test_claim, test_settings,
};

fn patch(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn create_input(slug: &str) -> CreateCampaignInput {
    CreateCampaignInput {
        slug: slug.to_owned(),
        settings: test_settings(),
    }
}

#[tokio::test]
async fn should_create_campaign_with_valid_slug() {
    let campaigns = MockCampaignRepo::default();
    let uc = CreateCampaignUseCase {
        campaigns: campaigns.clone(),
    };
    let admin = identity(AdminRole::Admin);
    let created = uc
        .execute(admin.clone(), create_input("spring-2026"))
        .await
        .unwrap();

    assert_eq!(created.slug, "spring-2026");
    assert_eq!(created.created_by, Some(admin.admin_id));
    assert!(campaigns.get(created.id).is_some());
}

#[tokio::test]
async fn should_reject_bad_or_taken_slug() {
    let campaigns = MockCampaignRepo::default();
    let uc = CreateCampaignUseCase {
        campaigns: campaigns.clone(),
    };

    let result = uc
        .execute(identity(AdminRole::Admin), create_input("Spring 2026"))
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidSlug)),
        "expected InvalidSlug, got {result:?}"
    );

    uc.execute(identity(AdminRole::Admin), create_input("spring"))
        .await
        .unwrap();
    let result = uc
        .execute(identity(AdminRole::Admin), create_input("spring"))
        .await;
    assert!(matches!(result, Err(ApiError::SlugTaken)));
}

#[tokio::test]
async fn should_forbid_viewer_from_creating() {
    let uc = CreateCampaignUseCase {
        campaigns: MockCampaignRepo::default(),
    };
    let result = uc
        .execute(identity(AdminRole::Viewer), create_input("spring"))
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_patch_settings_and_slug() {
    let campaign = test_campaign(test_settings());
    let campaigns = MockCampaignRepo::new(vec![campaign.clone()]);
    let uc = UpdateCampaignUseCase {
        campaigns: campaigns.clone(),
    };

    let updated = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            patch(json!({ "slug": "renamed", "capacity_total": 25, "show_scarcity": true })),
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "renamed");
    assert_eq!(updated.settings.capacity_total, Some(25));
    assert!(updated.settings.show_scarcity);
    assert_eq!(updated.settings.title, "Free book", "untouched keys survive");
    assert_eq!(campaigns.get(campaign.id).unwrap().slug, "renamed");
}

#[tokio::test]
async fn should_reject_invalid_settings_patch() {
    let campaign = test_campaign(test_settings());
    let uc = UpdateCampaignUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
    };

    let result = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            patch(json!({ "max_claims_per_email": -1 })),
        )
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = uc
        .execute(
            identity(AdminRole::Admin),
            campaign.id,
            patch(json!({ "title": "  " })),
        )
        .await;
    assert!(matches!(result, Err(ApiError::MissingFields)));
}

#[tokio::test]
async fn should_report_counts_in_detail() {
    let campaign = test_campaign(test_settings());
    let uc = GetCampaignUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: MockClaimRepo::default(),
    };
    let detail = uc
        .execute(identity(AdminRole::Viewer), campaign.id)
        .await
        .unwrap();
    assert_eq!(detail.campaign.id, campaign.id);
    assert_eq!(detail.claim_count, 0);
}

#[tokio::test]
async fn should_list_campaigns_for_viewer() {
    let uc = ListCampaignsUseCase {
        campaigns: MockCampaignRepo::new(vec![test_campaign(test_settings())]),
    };
    let list = uc.execute(identity(AdminRole::Viewer)).await.unwrap();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn should_delete_only_as_super_admin_and_only_when_empty() {
    let campaign = test_campaign(test_settings());
    let campaigns = MockCampaignRepo::new(vec![campaign.clone()]);
    let claims = MockClaimRepo::default();
    let uc = DeleteCampaignUseCase {
        campaigns: campaigns.clone(),
        claims: claims.clone(),
    };

    let result = uc.execute(identity(AdminRole::Admin), campaign.id).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));

    claims.claims.lock().unwrap().push(test_claim(campaign.id));
    let result = uc.execute(identity(AdminRole::SuperAdmin), campaign.id).await;
    assert!(matches!(result, Err(ApiError::CampaignHasClaims)));

    claims.claims.lock().unwrap().clear();
    uc.execute(identity(AdminRole::SuperAdmin), campaign.id)
        .await
        .unwrap();
    assert!(campaigns.get(campaign.id).is_none());
}

#[tokio::test]
async fn should_return_not_found_for_missing_campaign() {
    let uc = GetCampaignUseCase {
        campaigns: MockCampaignRepo::default(),
        claims: MockClaimRepo::default(),
    };
    let result = uc
        .execute(identity(AdminRole::Viewer), uuid::Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ApiError::CampaignNotFound)));
}
