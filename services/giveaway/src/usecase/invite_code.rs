use chrono::Utc;
use uuid::Uuid;

use giveaway_auth_types::role::Permission;

use crate::domain::repository::{CampaignRepository, InviteCodeRepository};
use crate::domain::types::{AdminIdentity, InviteCode};
use crate::error::ApiError;
use crate::usecase::campaign::load_campaign;

fn checked_max_uses(max_uses: Option<i32>) -> Result<Option<i32>, ApiError> {
    match max_uses {
        Some(n) if n < 1 => Err(ApiError::InvalidInput("max_uses must be at least 1".into())),
        other => Ok(other),
    }
}

async fn load_code<I: InviteCodeRepository>(codes: &I, id: Uuid) -> Result<InviteCode, ApiError> {
    codes.find_by_id(id).await?.ok_or(ApiError::InviteCodeNotFound)
}

pub struct CreateInviteCodeInput {
    pub code: String,
    pub max_uses: Option<i32>,
}

pub struct CreateInviteCodeUseCase<Ca: CampaignRepository, I: InviteCodeRepository> {
    pub campaigns: Ca,
    pub invite_codes: I,
}

impl<Ca: CampaignRepository, I: InviteCodeRepository> CreateInviteCodeUseCase<Ca, I> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
        input: CreateInviteCodeInput,
    ) -> Result<InviteCode, ApiError> {
        identity.require(Permission::ManageInviteCodes)?;
        let code = InviteCode::normalize(&input.code);
        if code.is_empty() {
            return Err(ApiError::MissingFields);
        }
        let max_uses = checked_max_uses(input.max_uses)?;
        load_campaign(&self.campaigns, campaign_id).await?;

        let invite = InviteCode {
            id: Uuid::new_v4(),
            campaign_id,
            code,
            uses: 0,
            max_uses,
            is_active: true,
            created_at: Utc::now(),
        };
        self.invite_codes.create(&invite).await?;
        Ok(invite)
    }
}

pub struct ListInviteCodesUseCase<Ca: CampaignRepository, I: InviteCodeRepository> {
    pub campaigns: Ca,
    pub invite_codes: I,
}

impl<Ca: CampaignRepository, I: InviteCodeRepository> ListInviteCodesUseCase<Ca, I> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        campaign_id: Uuid,
    ) -> Result<Vec<InviteCode>, ApiError> {
        identity.require(Permission::ViewCampaigns)?;
        load_campaign(&self.campaigns, campaign_id).await?;
        self.invite_codes.list(campaign_id).await
    }
}

#[derive(Debug, Default)]
pub struct UpdateInviteCodeInput {
    /// `Some(None)` removes the cap.
    pub max_uses: Option<Option<i32>>,
    pub is_active: Option<bool>,
}

pub struct UpdateInviteCodeUseCase<I: InviteCodeRepository> {
    pub invite_codes: I,
}

impl<I: InviteCodeRepository> UpdateInviteCodeUseCase<I> {
    pub async fn execute(
        &self,
        identity: AdminIdentity,
        id: Uuid,
        input: UpdateInviteCodeInput,
    ) -> Result<InviteCode, ApiError> {
        identity.require(Permission::ManageInviteCodes)?;
        let mut invite = load_code(&self.invite_codes, id).await?;
        if let Some(max_uses) = input.max_uses {
            invite.max_uses = checked_max_uses(max_uses)?;
        }
        if let Some(is_active) = input.is_active {
            invite.is_active = is_active;
        }
        self.invite_codes.update(&invite).await?;
        Ok(invite)
    }
}

pub struct DeleteInviteCodeUseCase<I: InviteCodeRepository> {
    pub invite_codes: I,
}

impl<I: InviteCodeRepository> DeleteInviteCodeUseCase<I> {
    pub async fn execute(&self, identity: AdminIdentity, id: Uuid) -> Result<(), ApiError> {
        identity.require(Permission::ManageInviteCodes)?;
        if !self.invite_codes.delete(id).await? {
            return Err(ApiError::InviteCodeNotFound);
        }
        Ok(())
    }
}
