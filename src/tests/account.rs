use axum::http::StatusCode;
use cragclub_shared::{
    account::{
        handle::{manage::*, *},
        CommitteeRole, Role, UserView,
    },
    membership::MembershipStatus,
};
use serial_test::serial;

use super::*;

/// Test: registration outside and inside the committee domain.
#[serial]
#[tokio::test]
async fn registry() {
    let global = global().await;
    let app = crate::router(global.clone());

    let desc = RegisterDescriptor {
        email: "Alex@Climb.Test".to_owned(),
        password: PASSWORD.to_owned(),
        first_name: "Alex".to_owned(),
        last_name: "Honnold".to_owned(),
    };
    let result: RegisterResult = post_ok(&app, "/api/account/register", None, &desc).await;
    assert_eq!(result.role, Role::Member);
    assert_eq!(result.membership_status, MembershipStatus::Pending);

    // Same address, different case
    let (status, value) = post(&app, "/api/account/register", None, &desc).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(value["error"], "email already registered");

    let result: RegisterResult = post_ok(
        &app,
        "/api/account/register",
        None,
        &RegisterDescriptor {
            email: format!("lynn@{COMMITTEE_DOMAIN}"),
            ..desc.clone()
        },
    )
    .await;
    assert_eq!(result.role, Role::Committee);
    assert_eq!(result.membership_status, MembershipStatus::Active);

    let view = crate::account::view(&global.db, &result.account_id)
        .await
        .unwrap();
    assert_eq!(view.memberships.len(), 1);
    assert_eq!(view.memberships[0].membership_type, "basic");
    assert_eq!(view.memberships[0].status, MembershipStatus::Active);
    assert_eq!(
        view.memberships[0].membership_year,
        crate::membership::current_academic_year()
    );

    let (status, _) = post(
        &app,
        "/api/account/register",
        None,
        &RegisterDescriptor {
            email: "nobody".to_owned(),
            ..desc
        },
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test for logging in and out.
#[serial]
#[tokio::test]
async fn login_logout() {
    let global = global().await;
    let app = crate::router(global.clone());
    let alex = register(&app, "alex@climb.test").await;

    let (status, _) = post(
        &app,
        "/api/account/login",
        None,
        &LoginDescriptor {
            email: "alex@climb.test".to_owned(),
            password: "wrong".to_owned(),
        },
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let view: UserView = post_ok(&app, "/api/account/view", alex.auth(), &()).await;
    assert_eq!(view.id, alex.id);
    assert_eq!(view.email, "alex@climb.test");

    let (status, _) = post(&app, "/api/account/view", Some("garbage"), &()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(&app, "/api/account/view", None, &()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let _: () = post_ok(&app, "/api/account/logout", alex.auth(), &()).await;
    let (status, _) = post(&app, "/api/account/view", alex.auth(), &()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[serial]
#[tokio::test]
async fn edit_profile() {
    let global = global().await;
    let app = crate::router(global.clone());
    let alex = register(&app, "alex@climb.test").await;

    let (status, _) = post(
        &app,
        "/api/account/edit",
        alex.auth(),
        &AccountEditDescriptor {
            password: Some(PasswordChange {
                old: "wrong".to_owned(),
                new: "new-password".to_owned(),
            }),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let _: () = post_ok(
        &app,
        "/api/account/edit",
        alex.auth(),
        &AccountEditDescriptor {
            first_name: Some("Alexander".to_owned()),
            password: Some(PasswordChange {
                old: PASSWORD.to_owned(),
                new: "new-password".to_owned(),
            }),
            ..Default::default()
        },
    )
    .await;

    let view = crate::account::view(&global.db, &alex.id).await.unwrap();
    assert_eq!(view.first_name, "Alexander");
    assert_eq!(view.last_name, "Honnold");
    login(&app, "alex@climb.test", "new-password").await;
}

#[serial]
#[tokio::test]
async fn committee_management() {
    let global = global().await;
    let app = crate::router(global.clone());
    let root = root(&app).await;
    let alex = register(&app, "alex@climb.test").await;
    let target = AccountTargetDescriptor {
        account_id: alex.id.clone(),
    };

    // Members can't manage
    let (status, _) = post(&app, "/api/account/manage/list", alex.auth(), &()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let roles = SetCommitteeRolesDescriptor {
        account_id: alex.id.clone(),
        roles: vec![CommitteeRole::Webmaster, CommitteeRole::KitSecretary],
    };
    let (status, _) = post(&app, "/api/account/manage/set-roles", root.auth(), &roles).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _: () = post_ok(&app, "/api/account/manage/promote", root.auth(), &target).await;
    let _: () = post_ok(&app, "/api/account/manage/set-roles", root.auth(), &roles).await;

    let users: Vec<UserView> = post_ok(&app, "/api/account/manage/list", alex.auth(), &()).await;
    let view = users.iter().find(|u| u.id == alex.id).unwrap();
    assert_eq!(view.role, Role::Committee);
    assert_eq!(view.membership_status, MembershipStatus::Active);
    assert_eq!(
        view.committee_roles,
        [CommitteeRole::KitSecretary, CommitteeRole::Webmaster]
    );
    assert_eq!(
        view.primary_committee_role(),
        Some(CommitteeRole::KitSecretary)
    );

    let _: () = post_ok(&app, "/api/account/manage/demote", root.auth(), &target).await;
    let view = crate::account::view(&global.db, &alex.id).await.unwrap();
    assert_eq!(view.role, Role::Member);
    assert!(view.committee_roles.is_empty());

    // Root is exempt from demotion and deletion
    let root_target = AccountTargetDescriptor {
        account_id: root.id.clone(),
    };
    for uri in [
        "/api/account/manage/demote",
        "/api/account/manage/delete",
        "/api/account/manage/reject",
    ] {
        let (status, _) = post(&app, uri, root.auth(), &root_target).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
    let (status, _) = post(
        &app,
        "/api/account/delete",
        root.auth(),
        &AccountDeleteDescriptor {
            password: ROOT_PASSWORD.to_owned(),
        },
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Test: root account seeding is idempotent and restores privileges.
#[serial]
#[tokio::test]
async fn root_seeding() {
    let global = global().await;
    let id: String = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(ROOT_EMAIL)
        .fetch_one(&global.db)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET role = 'member', membership_status = 'rejected' WHERE id = ?")
        .bind(&id)
        .execute(&global.db)
        .await
        .unwrap();

    crate::account::ensure_root(&global.db, &global.config)
        .await
        .unwrap();

    let view = crate::account::view(&global.db, &id).await.unwrap();
    assert_eq!(view.role, Role::Committee);
    assert_eq!(view.membership_status, MembershipStatus::Active);
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&global.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

/// Test: deleting an account removes what it owns and gives slots back.
#[serial]
#[tokio::test]
async fn delete_cascade() {
    let global = global().await;
    let app = crate::router(global.clone());
    let root = root(&app).await;
    let alex = member(&global, &app, "alex@climb.test").await;

    let session = crate::session::create(
        &global.db,
        cragclub_shared::session::handle::SessionDescriptor {
            session_type: "indoor".to_owned(),
            title: "Wall night".to_owned(),
            date: "2026-10-05".to_owned(),
            time: "18:30".to_owned(),
            capacity: 4,
            required_membership: None,
        },
    )
    .await
    .unwrap();
    crate::session::book(&global.db, &alex.id, session)
        .await
        .unwrap();
    crate::election::set_open(&global.db, true).await.unwrap();
    crate::election::apply(
        &global.db,
        &alex.id,
        cragclub_shared::election::handle::ApplyDescriptor {
            role: "treasurer".to_owned(),
            manifesto: "Balanced books".to_owned(),
            presentation_link: None,
        },
    )
    .await
    .unwrap();

    // Wrong password
    let (status, _) = post(
        &app,
        "/api/account/delete",
        alex.auth(),
        &AccountDeleteDescriptor {
            password: "wrong".to_owned(),
        },
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let _: () = post_ok(
        &app,
        "/api/account/manage/delete",
        root.auth(),
        &AccountTargetDescriptor {
            account_id: alex.id.clone(),
        },
    )
    .await;

    let session = crate::session::get(&global.db, session)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.booked_slots, 0);
    assert!(crate::election::candidates(&global.db)
        .await
        .unwrap()
        .is_empty());
    assert!(crate::membership::rows_of(&global.db, &alex.id)
        .await
        .unwrap()
        .is_empty());

    // Tokens of the deleted account are gone
    let (status, _) = post(&app, "/api/account/view", alex.auth(), &()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
