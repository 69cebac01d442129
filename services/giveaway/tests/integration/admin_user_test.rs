use giveaway_api::domain::types::AdminProfile;
use giveaway_api::error::ApiError;
use giveaway_api::usecase::admin_user::{
    CreateAdminInput, CreateAdminUseCase, DeleteAdminUseCase, GetMeUseCase, ListAdminsUseCase,
    ProfilePatch, UpdateAdminInput, UpdateAdminUseCase, UpdateMeUseCase,
};
use giveaway_auth_types::role::AdminRole;

use crate::helpers::{MockAdminRepo, MockSessionRepo, test_admin};

fn create_input(email: &str, role: AdminRole) -> CreateAdminInput {
    CreateAdminInput {
        email: email.to_owned(),
        role,
        profile: AdminProfile::default(),
    }
}

// ── Management ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_admin_with_normalized_email() {
    let boss = test_admin(AdminRole::SuperAdmin);
    let admins = MockAdminRepo::new(vec![boss.clone()]);
    let uc = CreateAdminUseCase {
        admins: admins.clone(),
    };

    let created = uc
        .execute(boss.identity(), create_input(" New.Hire@Example.COM ", AdminRole::Viewer))
        .await
        .unwrap();
    assert_eq!(created.email, "new.hire@example.com");
    assert!(created.is_active);
    assert_eq!(
        ListAdminsUseCase { admins }
            .execute(boss.identity())
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn should_reject_taken_or_malformed_email() {
    let boss = test_admin(AdminRole::SuperAdmin);
    let uc = CreateAdminUseCase {
        admins: MockAdminRepo::new(vec![boss.clone()]),
    };

    let result = uc
        .execute(boss.identity(), create_input(&boss.email, AdminRole::Admin))
        .await;
    assert!(
        matches!(result, Err(ApiError::EmailTaken)),
        "expected EmailTaken, got {result:?}"
    );

    let result = uc
        .execute(boss.identity(), create_input("nope", AdminRole::Admin))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidEmail)));
}

#[tokio::test]
async fn should_allow_only_super_admin_to_manage_users() {
    let admin = test_admin(AdminRole::Admin);
    let result = ListAdminsUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
    }
    .execute(admin.identity())
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_forbid_changing_own_role_or_status() {
    let boss = test_admin(AdminRole::SuperAdmin);
    let uc = UpdateAdminUseCase {
        admins: MockAdminRepo::new(vec![boss.clone()]),
        sessions: MockSessionRepo::default(),
    };

    let demote = uc
        .execute(
            boss.identity(),
            boss.id,
            UpdateAdminInput {
                role: Some(AdminRole::Viewer),
                is_active: None,
            },
        )
        .await;
    assert!(matches!(demote, Err(ApiError::Forbidden)));

    let deactivate = uc
        .execute(
            boss.identity(),
            boss.id,
            UpdateAdminInput {
                role: None,
                is_active: Some(false),
            },
        )
        .await;
    assert!(matches!(deactivate, Err(ApiError::Forbidden)));

    let delete = DeleteAdminUseCase {
        admins: MockAdminRepo::new(vec![boss.clone()]),
        sessions: MockSessionRepo::default(),
    }
    .execute(boss.identity(), boss.id)
    .await;
    assert!(matches!(delete, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_revoke_sessions_on_deactivation() {
    let boss = test_admin(AdminRole::SuperAdmin);
    let target = test_admin(AdminRole::Admin);
    let admins = MockAdminRepo::new(vec![boss.clone(), target.clone()]);
    let sessions = MockSessionRepo::default();
    let manager = sessions.manager();
    manager.create(target.id, None, None).await.unwrap();
    manager.create(target.id, None, None).await.unwrap();
    manager.create(boss.id, None, None).await.unwrap();

    let updated = UpdateAdminUseCase {
        admins: admins.clone(),
        sessions: sessions.clone(),
    }
    .execute(
        boss.identity(),
        target.id,
        UpdateAdminInput {
            role: Some(AdminRole::Viewer),
            is_active: Some(false),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.role, AdminRole::Viewer);
    assert!(!admins.get(target.id).unwrap().is_active);
    assert_eq!(sessions.live_for(target.id), 0);
    assert_eq!(sessions.live_for(boss.id), 1);
}

#[tokio::test]
async fn should_revoke_sessions_and_remove_on_delete() {
    let boss = test_admin(AdminRole::SuperAdmin);
    let target = test_admin(AdminRole::Viewer);
    let admins = MockAdminRepo::new(vec![boss.clone(), target.clone()]);
    let sessions = MockSessionRepo::default();
    sessions
        .manager()
        .create(target.id, None, None)
        .await
        .unwrap();

    let uc = DeleteAdminUseCase {
        admins: admins.clone(),
        sessions: sessions.clone(),
    };
    uc.execute(boss.identity(), target.id).await.unwrap();

    assert!(admins.get(target.id).is_none());
    assert_eq!(sessions.live_for(target.id), 0);

    let again = uc.execute(boss.identity(), target.id).await;
    assert!(
        matches!(again, Err(ApiError::UserNotFound)),
        "expected UserNotFound, got {again:?}"
    );
}

// ── Own profile ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_patch_own_profile() {
    let me = test_admin(AdminRole::Viewer);
    let admins = MockAdminRepo::new(vec![me.clone()]);
    let uc = UpdateMeUseCase {
        admins: admins.clone(),
    };

    let updated = uc
        .execute(
            me.identity(),
            ProfilePatch {
                display_name: Some("  Ada  ".to_owned()),
                linkedin_url: Some("https://www.linkedin.com/in/ada".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.profile.display_name.as_deref(), Some("Ada"));

    // A blank value clears the field.
    let cleared = uc
        .execute(
            me.identity(),
            ProfilePatch {
                display_name: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.profile.display_name, None);
    assert!(cleared.profile.linkedin_url.is_some());

    let fetched = GetMeUseCase { admins }
        .execute(me.identity())
        .await
        .unwrap();
    assert_eq!(fetched.profile, cleared.profile);
}

#[tokio::test]
async fn should_reject_non_http_linkedin_url() {
    let me = test_admin(AdminRole::Admin);
    let uc = UpdateMeUseCase {
        admins: MockAdminRepo::new(vec![me.clone()]),
    };
    let result = uc
        .execute(
            me.identity(),
            ProfilePatch {
                linkedin_url: Some("javascript:alert(1)".to_owned()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}
