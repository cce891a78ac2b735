use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The user id carried by a token that `AuthMiddleware` has already verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i32);

impl AuthenticatedUser {
    /// Checks that the caller is acting on their own resources.
    ///
    /// Returns the confirmed user id, or `AppError::Forbidden` when the
    /// `user_id` taken from the path belongs to someone else.
    pub fn authorize(&self, path_user_id: i32) -> Result<i32, AppError> {
        if self.0 == path_user_id {
            Ok(self.0)
        } else {
            log::warn!(
                "user {} attempted to access tasks of user {}",
                self.0,
                path_user_id
            );
            Err(AppError::Forbidden(
                "You can only access your own tasks".into(),
            ))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims.sub))),
            None => {
                // Route is not behind AuthMiddleware.
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
