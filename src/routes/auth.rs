use crate::{
    auth::{
        generate_token, hash_password_blocking, verify_password_blocking, AuthResponse,
        AuthSettings, AuthenticatedUser, LoginRequest, RegisterRequest,
    },
    error::AppError,
    models::{User, UserCredentials},
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates the account and returns a token for it. Email and username must
/// both be unused.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    settings: web::Data<AuthSettings>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let taken = sqlx::query_as::<_, (String, String)>(
        "SELECT email, username FROM users WHERE email = $1 OR username = $2",
    )
    .bind(&register_data.email)
    .bind(&register_data.username)
    .fetch_optional(&**pool)
    .await?;

    if let Some((email, _)) = taken {
        return Err(if email == register_data.email {
            AppError::BadRequest("Email already registered".into())
        } else {
            AppError::BadRequest("Username already taken".into())
        });
    }

    let password_hash = hash_password_blocking(register_data.password.clone()).await?;

    let (user_id,) = sqlx::query_as::<_, (i32,)>(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&register_data.username)
    .bind(&register_data.email)
    .bind(password_hash)
    .fetch_one(&**pool)
    .await?;

    log::info!("registered user {}", user_id);
    let token = generate_token(user_id, &settings)?;

    Ok(HttpResponse::Created().json(AuthResponse { token, user_id }))
}

/// Login user
///
/// Unknown email and wrong password are indistinguishable to the caller.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    settings: web::Data<AuthSettings>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(&login_data.email)
    .fetch_optional(&**pool)
    .await?;

    let user = user.ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;
    let password = login_data.into_inner().password;
    if !verify_password_blocking(password, user.password_hash).await? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = generate_token(user.id, &settings)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Current user
///
/// Mounted behind `AuthMiddleware`; returns the profile of the token's owner.
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = $1",
    )
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(profile))
}
