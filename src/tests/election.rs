use axum::http::StatusCode;
use cragclub_shared::{
    election::{handle::*, Candidate, Choice, ElectionStatus, Referendum},
    gear::handle::CreatedResult,
};
use serial_test::serial;

use super::*;

fn application(role: &str) -> ApplyDescriptor {
    ApplyDescriptor {
        role: role.to_owned(),
        manifesto: "More chalk for everyone".to_owned(),
        presentation_link: Some("https://climb.test/slides".to_owned()),
    }
}

/// Test: candidacy follows the elections switch and reset.
#[serial]
#[tokio::test]
async fn cycle() {
    let global = global().await;
    let app = crate::router(global.clone());
    let root = root(&app).await;
    let a = member(&global, &app, "a@climb.test").await;

    let (status, value) = post(&app, "/api/election/apply", a.auth(), &application("president")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(value["error"], "elections are closed");

    let (status, _) = post(
        &app,
        "/api/election/manage/set-open",
        a.auth(),
        &SetElectionsOpenDescriptor { open: true },
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let _: () = post_ok(
        &app,
        "/api/election/manage/set-open",
        root.auth(),
        &SetElectionsOpenDescriptor { open: true },
    )
    .await;
    let status_now: ElectionStatus = post_ok(&app, "/api/election/status", a.auth(), &()).await;
    assert!(status_now.elections_open);

    let (status, _) = post(&app, "/api/election/apply", a.auth(), &application("chair")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let CreatedResult { id } =
        post_ok(&app, "/api/election/apply", a.auth(), &application("president")).await;
    let (status, value) = post(&app, "/api/election/apply", a.auth(), &application("treasurer")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(value["error"], "already standing as a candidate");

    let candidates: Vec<Candidate> = post_ok(&app, "/api/election/candidates", a.auth(), &()).await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, id);
    assert_eq!(candidates[0].role, "president");
    assert_eq!(candidates[0].first_name, "Alex");

    let _: () = post_ok(&app, "/api/election/manage/reset", root.auth(), &()).await;
    assert!(crate::election::candidates(&global.db)
        .await
        .unwrap()
        .is_empty());
    assert!(!crate::election::status(&global.db).await.unwrap().elections_open);
}

#[serial]
#[tokio::test]
async fn withdraw() {
    let global = global().await;
    let app = crate::router(global.clone());
    let a = member(&global, &app, "a@climb.test").await;
    crate::election::set_open(&global.db, true).await.unwrap();

    // Nothing to withdraw
    let _: () = post_ok(&app, "/api/election/withdraw", a.auth(), &()).await;

    let _: CreatedResult =
        post_ok(&app, "/api/election/apply", a.auth(), &application("secretary")).await;
    let _: () = post_ok(&app, "/api/election/withdraw", a.auth(), &()).await;
    assert!(crate::election::candidates(&global.db)
        .await
        .unwrap()
        .is_empty());

    let _: CreatedResult =
        post_ok(&app, "/api/election/apply", a.auth(), &application("secretary")).await;
    crate::election::set_open(&global.db, false).await.unwrap();
    let (status, _) = post(&app, "/api/election/withdraw", a.auth(), &()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Test: one vote per account until the cycle is reset.
#[serial]
#[tokio::test]
async fn single_vote() {
    let global = global().await;
    let app = crate::router(global.clone());
    let a = member(&global, &app, "a@climb.test").await;
    let b = member(&global, &app, "b@climb.test").await;
    crate::election::set_open(&global.db, true).await.unwrap();

    let CreatedResult { id: ca } =
        post_ok(&app, "/api/election/apply", a.auth(), &application("president")).await;
    let CreatedResult { id: cb } =
        post_ok(&app, "/api/election/apply", b.auth(), &application("president")).await;

    let (status, _) = post(
        &app,
        "/api/election/vote",
        b.auth(),
        &VoteDescriptor { candidate_id: 404 },
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let _: () = post_ok(&app, "/api/election/vote", b.auth(), &VoteDescriptor { candidate_id: ca }).await;
    let (status, value) = post(
        &app,
        "/api/election/vote",
        b.auth(),
        &VoteDescriptor { candidate_id: cb },
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(value["error"], "already voted");

    let candidates = crate::election::candidates(&global.db).await.unwrap();
    let votes = |id| candidates.iter().find(|c| c.id == id).unwrap().votes;
    assert_eq!(votes(ca), 1);
    assert_eq!(votes(cb), 0);

    crate::election::reset(&global.db).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes")
        .fetch_one(&global.db)
        .await
        .unwrap();
    assert_eq!(count, 0);

    let (status, _) = post(
        &app,
        "/api/election/vote",
        b.auth(),
        &VoteDescriptor { candidate_id: ca },
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Test: concurrent votes of one account leave a single vote.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes() {
    let global = global().await;
    let app = crate::router(global.clone());
    let a = member(&global, &app, "a@climb.test").await;
    crate::election::set_open(&global.db, true).await.unwrap();
    let candidate = crate::election::apply(&global.db, &a.id, application("president"))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let db = global.db.clone();
        let voter = a.id.clone();
        tasks.push(tokio::spawn(async move {
            crate::election::cast_vote(&db, &voter, candidate).await
        }));
    }
    let mut ok = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => ok += 1,
            Err(crate::Error::AlreadyVoted) => {}
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(ok, 1);
}

#[serial]
#[tokio::test]
async fn referendums() {
    let global = global().await;
    let app = crate::router(global.clone());
    let root = root(&app).await;
    let a = member(&global, &app, "a@climb.test").await;
    let b = member(&global, &app, "b@climb.test").await;

    // Creating a referendum is not gated
    let CreatedResult { id } = post_ok(
        &app,
        "/api/election/manage/referendum",
        root.auth(),
        &ReferendumDescriptor {
            title: "Buy a new campus board?".to_owned(),
            description: String::new(),
        },
    )
    .await;
    let vote = |choice: &str| ReferendumVoteDescriptor {
        referendum_id: id,
        choice: choice.to_owned(),
    };

    let (status, _) = post(&app, "/api/election/referendum/vote", a.auth(), &vote("yes")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    crate::election::set_open(&global.db, true).await.unwrap();

    let (status, value) =
        post(&app, "/api/election/referendum/vote", a.auth(), &vote("maybe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "invalid choice \"maybe\"");

    let _: () = post_ok(&app, "/api/election/referendum/vote", a.auth(), &vote("yes")).await;
    let _: () = post_ok(&app, "/api/election/referendum/vote", b.auth(), &vote("abstain")).await;
    let (status, _) = post(&app, "/api/election/referendum/vote", a.auth(), &vote("no")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &app,
        "/api/election/referendum/vote",
        a.auth(),
        &ReferendumVoteDescriptor {
            referendum_id: 404,
            choice: "yes".to_owned(),
        },
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let list: Vec<Referendum> = post_ok(&app, "/api/election/referendums", a.auth(), &()).await;
    assert_eq!(list.len(), 1);
    assert_eq!((list[0].yes, list[0].no, list[0].abstain), (1, 0, 1));
    assert_eq!(list[0].my_choice, Some(Choice::Yes));
    let list: Vec<Referendum> = post_ok(&app, "/api/election/referendums", root.auth(), &()).await;
    assert_eq!(list[0].my_choice, None);

    crate::election::reset(&global.db).await.unwrap();
    assert!(crate::election::referendums(&global.db, &a.id)
        .await
        .unwrap()
        .is_empty());
}
