pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;

/// Path prefix of the authentication routes.
pub const AUTH_PREFIX: &str = "/api/auth";
/// Path prefix of the per-user task routes. `user_id` is captured here.
pub const TASKS_PREFIX: &str = "/api/{user_id}/tasks";

/// Mounts the probes and both route groups.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::root)
        .service(health::health)
        .service(
            web::scope(AUTH_PREFIX)
                .service(auth::register)
                .service(auth::login)
                .service(
                    web::resource("/me")
                        .route(web::get().to(auth::me))
                        .wrap(AuthMiddleware),
                ),
        )
        .service(
            web::scope(TASKS_PREFIX)
                .wrap(AuthMiddleware)
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::toggle_task)
                .service(tasks::delete_task),
        );
}
