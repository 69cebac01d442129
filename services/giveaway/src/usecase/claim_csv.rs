//! Claim export and bulk import as CSV.

use std::collections::HashSet;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use giveaway_auth_types::role::Permission;

use crate::domain::repository::{CampaignRepository, ClaimRepository};
use crate::domain::types::{AdminIdentity, Address, Applicant, Claim, ClaimStatus};
use crate::error::ApiError;
use crate::usecase::admin_claim::{checked_email, refingerprint};
use crate::usecase::campaign::load_campaign;

// ── Export ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExportRow<'a> {
    id: Uuid,
    status: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: Option<&'a str>,
    company: Option<&'a str>,
    title: Option<&'a str>,
    phone: Option<&'a str>,
    address1: &'a str,
    address2: Option<&'a str>,
    city: &'a str,
    region: &'a str,
    postal_code: &'a str,
    country: &'a str,
    invite_code: Option<&'a str>,
    is_test_claim: bool,
    confirmed_at: Option<String>,
    shipped_at: Option<String>,
    created_at: String,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

impl<'a> From<&'a Claim> for ExportRow<'a> {
    fn from(c: &'a Claim) -> Self {
        Self {
            id: c.id,
            status: c.status.as_str(),
            first_name: &c.applicant.first_name,
            last_name: &c.applicant.last_name,
            email: c.applicant.email.as_deref(),
            company: c.applicant.company.as_deref(),
            title: c.applicant.title.as_deref(),
            phone: c.applicant.phone.as_deref(),
            address1: &c.address.address1,
            address2: c.address.address2.as_deref(),
            city: &c.address.city,
            region: &c.address.region,
            postal_code: &c.address.postal_code,
            country: &c.address.country,
            invite_code: c.invite_code.as_deref(),
            is_test_claim: c.is_test_claim,
            confirmed_at: c.confirmed_at.map(timestamp),
            shipped_at: c.shipped_at.map(timestamp),
            created_at: timestamp(c.created_at),
        }
    }
}

pub struct ClaimsCsv {
    pub filename: String,
    pub body: Vec<u8>,
}

pub struct ExportClaimsUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> ExportClaimsUseCase<Ca, Cl> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
    ) -> Result<ClaimsCsv, ApiError> {
        identity.require(Permission::ViewClaims)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;
        let claims = self.claims.list_all(campaign_id).await?;
        let body = write_claims(&claims)?;
        Ok(ClaimsCsv {
            filename: format!("{}-claims.csv", campaign.slug),
            body,
        })
    }
}

fn write_claims(claims: &[Claim]) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for claim in claims {
        writer
            .serialize(ExportRow::from(claim))
            .context("write csv row")?;
    }
    if claims.is_empty() {
        writer.write_record(EXPORT_HEADER).context("write csv header")?;
    }
    let body = writer.into_inner().context("flush csv")?;
    Ok(body)
}

const EXPORT_HEADER: [&str; 19] = [
    "id",
    "status",
    "first_name",
    "last_name",
    "email",
    "company",
    "title",
    "phone",
    "address1",
    "address2",
    "city",
    "region",
    "postal_code",
    "country",
    "invite_code",
    "is_test_claim",
    "confirmed_at",
    "shipped_at",
    "created_at",
];

// ── Import ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImportRow {
    first_name: String,
    last_name: String,
    email: Option<String>,
    company: Option<String>,
    title: Option<String>,
    phone: Option<String>,
    address1: String,
    address2: Option<String>,
    city: String,
    #[serde(alias = "state")]
    region: String,
    #[serde(alias = "zip")]
    postal_code: String,
    country: String,
}

#[derive(Debug, Serialize)]
pub struct RowError {
    /// 1-based line of the file where the record starts, header included.
    pub row: u64,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub imported: u64,
    pub duplicates: u64,
    pub errors: Vec<RowError>,
}

pub struct ImportClaimsUseCase<Ca: CampaignRepository, Cl: ClaimRepository> {
    pub campaigns: Ca,
    pub claims: Cl,
}

impl<Ca: CampaignRepository, Cl: ClaimRepository> ImportClaimsUseCase<Ca, Cl> {
    /// Rows whose fingerprint exists in any campaign, or earlier in the file,
    /// are skipped as duplicates. Imported claims are confirmed.
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        body: &[u8],
    ) -> Result<ImportReport, ApiError> {
        identity.require(Permission::ImportClaims)?;
        let campaign = load_campaign(&self.campaigns, campaign_id).await?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(body);
        let headers = reader
            .headers()
            .map_err(|e| ApiError::InvalidInput(format!("unreadable CSV header: {e}")))?
            .clone();
        let mut report = ImportReport::default();
        let mut seen = HashSet::new();

        for result in reader.records() {
            // Quoted fields may span lines, so count by where the record starts.
            let parsed = match result {
                Ok(record) => {
                    let row = record.position().map_or(0, |p| p.line());
                    record
                        .deserialize::<ImportRow>(Some(&headers))
                        .map(|parsed| (row, parsed))
                        .map_err(|e| (row, e))
                }
                Err(e) => Err((e.position().map_or(0, |p| p.line()), e)),
            };
            let (row, parsed) = match parsed {
                Ok(ok) => ok,
                Err((row, e)) => {
                    report.errors.push(RowError {
                        row,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let now = Utc::now();
            let mut claim = match row_to_claim(parsed, campaign.id, campaign.settings.test_mode, now) {
                Ok(claim) => claim,
                Err(e) => {
                    report.errors.push(RowError {
                        row,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            refingerprint(&mut claim);

            if !seen.insert(claim.address_fingerprint.clone())
                || self
                    .claims
                    .fingerprint_exists_anywhere(&claim.address_fingerprint)
                    .await?
            {
                report.duplicates += 1;
                continue;
            }
            match self.claims.create(&claim).await {
                Ok(()) => report.imported += 1,
                Err(ApiError::DuplicateAddress) => report.duplicates += 1,
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            campaign_id = %campaign_id,
            imported = report.imported,
            duplicates = report.duplicates,
            errors = report.errors.len(),
            "claims imported"
        );
        Ok(report)
    }
}

fn row_to_claim(
    row: ImportRow,
    campaign_id: Uuid,
    is_test_claim: bool,
    now: DateTime<Utc>,
) -> Result<Claim, ApiError> {
    let applicant = Applicant {
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        company: row.company,
        title: row.title,
        phone: row.phone,
    }
    .trimmed();
    let address = Address {
        address1: row.address1,
        address2: row.address2,
        city: row.city,
        region: row.region,
        postal_code: row.postal_code,
        country: row.country,
    }
    .trimmed();
    if !applicant.has_name() || !address.is_complete() {
        return Err(ApiError::MissingFields);
    }
    let email_normalized = checked_email(&applicant)?;

    Ok(Claim {
        id: Uuid::new_v4(),
        campaign_id,
        status: ClaimStatus::Confirmed,
        applicant,
        email_normalized,
        address,
        address_fingerprint: String::new(),
        location_fingerprint: None,
        ip_hash: None,
        user_agent: None,
        invite_code: None,
        is_test_claim,
        claim_token: None,
        confirmed_at: Some(now),
        shipped_at: None,
        created_at: now,
        updated_at: now,
    })
}
