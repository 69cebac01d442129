use axum::{
    Router,
    routing::{get, patch, post, put},
};
use tower::ServiceBuilder;

use giveaway_core::health::{healthz, readyz};
use giveaway_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    auth::{current_session, logout, request_otp, verify_otp},
    campaigns::{
        create_campaign, delete_campaign, get_campaign, list_campaigns, list_versions,
        publish_draft, revert_version, save_draft, update_campaign,
    },
    claims::{
        bulk_claims, delete_claim, export_claims, generate_gift_codes, get_claim, import_claims,
        list_claims, precreate_claim, register_claim, update_claim,
    },
    invite_codes::{create_invite_code, delete_invite_code, list_invite_codes, update_invite_code},
    public::{complete_claim_token, get_claim_token, submit_claim, verify_email},
    users::{create_admin, delete_admin, get_me, list_admins, update_admin, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Admin auth
        .route("/auth/request-otp", post(request_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
        // Public
        .route("/campaigns/{slug}", get(crate::handlers::public::get_campaign))
        .route("/campaigns/{slug}/claim", post(submit_claim))
        .route("/verify", get(verify_email))
        .route(
            "/claim-token/{token}",
            get(get_claim_token).post(complete_claim_token),
        )
        // Campaigns
        .route(
            "/admin/campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .route(
            "/admin/campaigns/{id}",
            get(get_campaign)
                .patch(update_campaign)
                .delete(delete_campaign),
        )
        // Versions
        .route("/admin/campaigns/{id}/draft", put(save_draft))
        .route("/admin/campaigns/{id}/publish", post(publish_draft))
        .route("/admin/campaigns/{id}/revert", post(revert_version))
        .route("/admin/campaigns/{id}/versions", get(list_versions))
        // Claims
        .route(
            "/admin/campaigns/{id}/claims",
            get(list_claims).post(register_claim),
        )
        .route("/admin/campaigns/{id}/claims/bulk", post(bulk_claims))
        .route("/admin/campaigns/{id}/claims.csv", get(export_claims))
        .route("/admin/campaigns/{id}/claims/import", post(import_claims))
        .route("/admin/campaigns/{id}/precreated", post(precreate_claim))
        .route("/admin/campaigns/{id}/gift-codes", post(generate_gift_codes))
        .route(
            "/admin/claims/{id}",
            get(get_claim).patch(update_claim).delete(delete_claim),
        )
        // Invite codes
        .route(
            "/admin/campaigns/{id}/invite-codes",
            get(list_invite_codes).post(create_invite_code),
        )
        .route(
            "/admin/invite-codes/{id}",
            patch(update_invite_code).delete(delete_invite_code),
        )
        // Admin users
        .route("/admin/users", get(list_admins).post(create_admin))
        .route(
            "/admin/users/{id}",
            patch(update_admin).delete(delete_admin),
        )
        .route("/admin/me", get(get_me).patch(update_me))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
