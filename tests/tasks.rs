//! Database-backed task flows. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use todo_api::auth::{AuthResponse, AuthSettings};
use todo_api::models::Task;
use todo_api::{db, routes, startup};

struct TestUser {
    id: i32,
    token: String,
}

impl TestUser {
    fn auth_header(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    fn tasks_uri(&self, suffix: &str) -> String {
        format!("/api/{}/tasks{}", self.id, suffix)
    }
}

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::ensure_schema(&pool).await.expect("Failed to ensure schema");
    pool
}

fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "tasks-integration-secret".into(),
        token_ttl_hours: 1,
    }
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "Failed to register {}", email);
    let auth: AuthResponse = test::read_body_json(resp).await;

    TestUser {
        id: auth.user_id,
        token: auth.token,
    }
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(auth_settings()))
                .app_data(startup::json_config())
                .app_data(startup::query_config())
                .wrap(Logger::default())
                .wrap(startup::cors_policy())
                .configure(routes::config),
        )
        .await
    };
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_task_crud_flow() {
    let pool = test_pool().await;
    let email = "crud_user@example.com";
    cleanup_user(&pool, email).await;
    let app = test_app!(pool);
    let user = register_user(&app, email, "crud_user").await;

    // Create
    let req = test::TestRequest::post()
        .uri(&user.tasks_uri(""))
        .insert_header(user.auth_header())
        .set_json(json!({"title": "Buy milk", "description": "Semi-skimmed"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.user_id, user.id);
    assert!(!created.completed);

    // Read
    let req = test::TestRequest::get()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Task = test::read_body_json(resp).await;
    assert_eq!(fetched.id, created.id);

    // Partial update keeps the description
    let req = test::TestRequest::put()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .set_json(json!({"title": "Buy oat milk"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = test::read_body_json(resp).await;
    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.description.as_deref(), Some("Semi-skimmed"));
    assert!(updated.updated_at >= created.updated_at);

    // Toggle
    let req = test::TestRequest::patch()
        .uri(&user.tasks_uri(&format!("/{}/toggle", created.id)))
        .insert_header(user.auth_header())
        .set_json(json!({"completed": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled: Task = test::read_body_json(resp).await;
    assert!(toggled.completed);

    // List with filters
    let req = test::TestRequest::get()
        .uri(&user.tasks_uri("?completed=true&search=OAT"))
        .insert_header(user.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Vec<Task> = test::read_body_json(resp).await;
    assert_eq!(listed.len(), 1);

    let req = test::TestRequest::get()
        .uri(&user.tasks_uri("?completed=false"))
        .insert_header(user.auth_header())
        .to_request();
    let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());

    // Explicit null clears the description, other fields stay
    let req = test::TestRequest::put()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .set_json(json!({"description": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared: Task = test::read_body_json(resp).await;
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.title, "Buy oat milk");
    assert!(cleared.completed);

    // Empty string clears it too
    let req = test::TestRequest::put()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .set_json(json!({"description": "Barista edition"}))
        .to_request();
    let relabelled: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(relabelled.description.as_deref(), Some("Barista edition"));

    let req = test::TestRequest::put()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .set_json(json!({"description": ""}))
        .to_request();
    let emptied: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(emptied.description, None);

    // Delete
    let req = test::TestRequest::delete()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&user.tasks_uri(&format!("/{}", created.id)))
        .insert_header(user.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    cleanup_user(&pool, email).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_tasks_are_isolated_between_users() {
    let pool = test_pool().await;
    let (owner_email, other_email) = ("owner@example.com", "other@example.com");
    cleanup_user(&pool, owner_email).await;
    cleanup_user(&pool, other_email).await;
    let app = test_app!(pool);
    let owner = register_user(&app, owner_email, "task_owner").await;
    let other = register_user(&app, other_email, "task_other").await;

    let req = test::TestRequest::post()
        .uri(&owner.tasks_uri(""))
        .insert_header(owner.auth_header())
        .set_json(json!({"title": "Private"}))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;

    // Other user's token on the owner's path
    let req = test::TestRequest::get()
        .uri(&owner.tasks_uri(&format!("/{}", task.id)))
        .insert_header(other.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Other user's own path, owner's task id
    let req = test::TestRequest::delete()
        .uri(&other.tasks_uri(&format!("/{}", task.id)))
        .insert_header(other.auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&other.tasks_uri(""))
        .insert_header(other.auth_header())
        .to_request();
    let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());

    cleanup_user(&pool, owner_email).await;
    cleanup_user(&pool, other_email).await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_invalid_task_payloads() {
    let pool = test_pool().await;
    let email = "invalid_task_user@example.com";
    cleanup_user(&pool, email).await;
    let app = test_app!(pool);
    let user = register_user(&app, email, "invalid_task_user").await;

    let test_cases = vec![
        (json!({}), StatusCode::BAD_REQUEST, "missing title"),
        (json!({"title": ""}), StatusCode::UNPROCESSABLE_ENTITY, "empty title"),
        (
            json!({"title": "a".repeat(201)}),
            StatusCode::UNPROCESSABLE_ENTITY,
            "title too long",
        ),
        (
            json!({"title": "ok", "description": "b".repeat(1001)}),
            StatusCode::UNPROCESSABLE_ENTITY,
            "description too long",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri(&user.tasks_uri(""))
            .insert_header(user.auth_header())
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "Test case failed: {}", description);
    }

    cleanup_user(&pool, email).await;
}
