use uuid::Uuid;

use giveaway_api::domain::types::ClaimStatus;
use giveaway_api::error::ApiError;
use giveaway_api::usecase::claim_csv::{ExportClaimsUseCase, ImportClaimsUseCase};
use giveaway_auth_types::role::AdminRole;

use crate::helpers::{
    MockCampaignRepo, MockClaimRepo, identity, test_campaign, test_claim, test_settings,
};

const HEADER: &str = "first_name,last_name,email,address1,address2,city,state,zip,country\n";

#[tokio::test]
async fn should_export_claims_as_named_csv() {
    let campaign = test_campaign(test_settings());
    let claim = test_claim(campaign.id);
    let uc = ExportClaimsUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: MockClaimRepo::new(vec![claim.clone(), test_claim(Uuid::new_v4())]),
    };

    let csv = uc
        .execute(identity(AdminRole::Viewer), campaign.id)
        .await
        .unwrap();
    assert_eq!(csv.filename, "free-book-claims.csv");

    let text = String::from_utf8(csv.body).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("id,status,first_name"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&format!("{},confirmed,Ada,Lovelace", claim.id)));
    assert!(lines.next().is_none(), "other campaigns stay out of the export");
}

#[tokio::test]
async fn should_import_rows_and_report_problems() {
    let campaign = test_campaign(test_settings());
    let claims = MockClaimRepo::default();
    let uc = ImportClaimsUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: claims.clone(),
    };

    let body = format!(
        "{HEADER}\
         Grace,Hopper,grace@example.com,1 Navy Yard,,Arlington,VA,22202,US\n\
         Alan,Turing,,2 Bletchley Park,,Milton Keynes,BKM,MK3 6EB,GB\n\
         ,,,,,,,,\n\
         Bad,Email,not-an-email,3 Some St,,City,ST,12345,US\n"
    );
    let report = uc
        .execute(identity(AdminRole::Admin), campaign.id, body.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 0);
    let rows: Vec<_> = report.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![4, 5]);

    let stored = claims.all();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|c| c.status == ClaimStatus::Confirmed));
    assert!(stored.iter().all(|c| c.confirmed_at.is_some()));
    let grace = stored
        .iter()
        .find(|c| c.applicant.first_name == "Grace")
        .unwrap();
    assert_eq!(grace.address.region, "VA");
    assert_eq!(grace.address.postal_code, "22202");
    assert_eq!(grace.email_normalized.as_deref(), Some("grace@example.com"));
}

#[tokio::test]
async fn should_report_file_line_when_quoted_field_spans_lines() {
    let campaign = test_campaign(test_settings());
    let uc = ImportClaimsUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: MockClaimRepo::default(),
    };

    let body = format!(
        "{HEADER}\
         Grace,Hopper,,1 Navy Yard,\"Building 7\nSuite 2\",Arlington,VA,22202,US\n\
         Bad,Email,not-an-email,3 Some St,,City,ST,12345,US\n"
    );
    let report = uc
        .execute(identity(AdminRole::Admin), campaign.id, body.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    let rows: Vec<_> = report.errors.iter().map(|e| e.row).collect();
    assert_eq!(rows, vec![4], "the bad row starts on the fourth line of the file");
}

#[tokio::test]
async fn should_skip_addresses_seen_anywhere() {
    let campaign = test_campaign(test_settings());
    let elsewhere = test_claim(Uuid::new_v4());
    let claims = MockClaimRepo::new(vec![elsewhere]);
    let uc = ImportClaimsUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: claims.clone(),
    };

    let body = format!(
        "{HEADER}\
         Ada,Lovelace,,12 Analytical Way.,,London,LDN,n1 9gu,gb\n\
         Grace,Hopper,,1 Navy Yard,,Arlington,VA,22202,US\n\
         Grace,Hopper,,1 NAVY YARD,,Arlington,VA,22202,US\n"
    );
    let report = uc
        .execute(identity(AdminRole::Admin), campaign.id, body.as_bytes())
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.duplicates, 2, "one from another campaign, one within the file");
    assert!(report.errors.is_empty());
    assert_eq!(claims.all().len(), 2);
}

#[tokio::test]
async fn should_forbid_viewer_from_importing() {
    let campaign = test_campaign(test_settings());
    let uc = ImportClaimsUseCase {
        campaigns: MockCampaignRepo::new(vec![campaign.clone()]),
        claims: MockClaimRepo::default(),
    };
    let result = uc
        .execute(identity(AdminRole::Viewer), campaign.id, HEADER.as_bytes())
        .await;
    assert!(
        matches!(result, Err(ApiError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
}
