use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{QuizStatus, UserRole};
use crate::test_support;

#[tokio::test]
async fn admin_surface_rejects_non_admins() {
    let ctx = test_support::setup_test_context().await;

    let owner = test_support::insert_user(
        ctx.state.db(),
        "prof@example.fr",
        "Prof Martin",
        UserRole::Ecole,
        "prof-pass-123",
    )
    .await;
    let token = test_support::bearer_token(&owner, ctx.state.settings());

    for uri in ["/api/v1/admin/quizzes", "/api/v1/admin/online-users"] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, uri, Some(&token), None))
            .await
            .expect("admin endpoint as ecole");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri: {uri}");
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/admin/quizzes",
            None,
            None,
        ))
        .await
        .expect("admin endpoint anonymously");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_lists_all_quizzes_paginated() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_user(
        ctx.state.db(),
        "admin@quizzeo.fr",
        "Admin Quizzeo",
        UserRole::Admin,
        "admin-pass-123",
    )
    .await;
    let school = test_support::insert_user(
        ctx.state.db(),
        "prof@example.fr",
        "Prof Martin",
        UserRole::Ecole,
        "prof-pass-123",
    )
    .await;
    let company = test_support::insert_user(
        ctx.state.db(),
        "acme@example.fr",
        "Acme SARL",
        UserRole::Entreprise,
        "acme-pass-123",
    )
    .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());

    for (name, owner) in [("Un", &school), ("Deux", &school), ("Trois", &company)] {
        test_support::insert_quiz(
            ctx.state.db(),
            name,
            &owner.id,
            QuizStatus::Pending,
            test_support::sample_questions(),
        )
        .await;
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/admin/quizzes?skip=0&limit=2",
            Some(&token),
            None,
        ))
        .await
        .expect("first page");

    let status = response.status();
    let page = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {page}");
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["limit"], 2);
    let items = page["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert!(items[0]["owner_name"].is_string());
    assert_eq!(items[0]["question_count"], 2);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/admin/quizzes?skip=2&limit=2",
            Some(&token),
            None,
        ))
        .await
        .expect("second page");

    let status = response.status();
    let page = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {page}");
    assert_eq!(page["items"].as_array().expect("items").len(), 1);
    assert_eq!(page["total_count"], 3);
}

#[tokio::test]
async fn admin_can_toggle_and_delete_any_quiz() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_user(
        ctx.state.db(),
        "admin@quizzeo.fr",
        "Admin Quizzeo",
        UserRole::Admin,
        "admin-pass-123",
    )
    .await;
    let owner = test_support::insert_user(
        ctx.state.db(),
        "prof@example.fr",
        "Prof Martin",
        UserRole::Ecole,
        "prof-pass-123",
    )
    .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());
    let quiz = test_support::insert_quiz(
        ctx.state.db(),
        "Modéré",
        &owner.id,
        QuizStatus::Pending,
        test_support::sample_questions(),
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/admin/quizzes/{}/toggle", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("admin toggle");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["status"], "started");

    let answers = json!({"answers": [{"answer": "Paris"}, {"answer": "La Seine"}]});
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/quizzes/{}/submit", quiz.id),
            None,
            Some(answers),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/admin/quizzes/{}", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("admin delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(ctx.state.db())
        .await
        .expect("count submissions");
    assert_eq!(remaining, 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/admin/quizzes/{}", quiz.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn online_users_reflects_recent_activity() {
    let ctx = test_support::setup_test_context().await;

    let admin = test_support::insert_user(
        ctx.state.db(),
        "admin@quizzeo.fr",
        "Admin Quizzeo",
        UserRole::Admin,
        "admin-pass-123",
    )
    .await;
    let user = test_support::insert_user(
        ctx.state.db(),
        "joueur@example.fr",
        "Joueur Simple",
        UserRole::User,
        "user-pass-123",
    )
    .await;
    let admin_token = test_support::bearer_token(&admin, ctx.state.settings());
    let user_token = test_support::bearer_token(&user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/auth/me",
            Some(&user_token),
            None,
        ))
        .await
        .expect("user activity");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/admin/online-users",
            Some(&admin_token),
            None,
        ))
        .await
        .expect("online users");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    // The admin's own request counts as activity too.
    assert_eq!(body["count"], 2);
    let users = body["users"].as_array().expect("users");
    assert!(users.iter().any(|u| u["user_id"] == user.id.as_str()), "response: {body}");
    assert!(users.iter().any(|u| u["user_id"] == admin.id.as_str()), "response: {body}");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/logout",
            Some(&user_token),
            None,
        ))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/admin/online-users",
            Some(&admin_token),
            None,
        ))
        .await
        .expect("online users after logout");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let users = body["users"].as_array().expect("users");
    assert!(
        users.iter().all(|u| u["user_id"] != user.id.as_str()),
        "logged-out user still listed: {body}"
    );
}
