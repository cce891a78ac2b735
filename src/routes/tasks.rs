//! Task endpoints, mounted under `/api/{user_id}/tasks`.
//!
//! Every handler first checks that the bearer token's subject matches the
//! `user_id` path segment. Queries are additionally scoped by `user_id`, so a
//! task belonging to someone else is reported as not found.

use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskCreate, TaskQuery, TaskToggle, TaskUpdate},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, completed, user_id, created_at, updated_at";

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Lists the caller's tasks, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): only tasks with this completion state.
/// - `search` (optional): case-insensitive match on title or description.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user.authorize(path.into_inner())?;

    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM tasks WHERE user_id = ",
        TASK_COLUMNS
    ));
    query.push_bind(user_id);

    if let Some(completed) = query_params.completed {
        query.push(" AND completed = ").push_bind(completed);
    }
    if let Some(pattern) = query_params.search_pattern() {
        query
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    query.push(" ORDER BY created_at DESC, id DESC");

    let tasks = query.build_query_as::<Task>().fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `422 Unprocessable Entity`: title empty or too long, description too long.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    path: web::Path<i32>,
    task_data: web::Json<TaskCreate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user_id = user.authorize(path.into_inner())?;
    task_data.validate()?;
    let input = task_data.into_inner();

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, completed, user_id)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(input.title)
    .bind(input.description)
    .bind(input.completed)
    .bind(user_id)
    .fetch_one(&**pool)
    .await?;

    log::info!("user {} created task {}", user_id, task.id);
    Ok(HttpResponse::Created().json(task))
}

#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (path_user_id, task_id) = path.into_inner();
    let user_id = user.authorize(path_user_id)?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task. Fields left out of the body keep their current value;
/// a `null` or empty `description` clears it.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    path: web::Path<(i32, i32)>,
    task_data: web::Json<TaskUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (path_user_id, task_id) = path.into_inner();
    let user_id = user.authorize(path_user_id)?;
    task_data.validate()?;
    if task_data.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    let description = task_data.description_change();

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = CASE WHEN $2 THEN $3 ELSE description END,
             completed = COALESCE($4, completed),
             updated_at = NOW()
         WHERE id = $5 AND user_id = $6
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(task_data.title.as_deref())
    .bind(description.is_some())
    .bind(description.flatten())
    .bind(task_data.completed)
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Sets the completion state of a task.
#[patch("/{id}/toggle")]
pub async fn toggle_task(
    pool: web::Data<PgPool>,
    path: web::Path<(i32, i32)>,
    toggle: web::Json<TaskToggle>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (path_user_id, task_id) = path.into_inner();
    let user_id = user.authorize(path_user_id)?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET completed = $1, updated_at = NOW()
         WHERE id = $2 AND user_id = $3
         RETURNING {}",
        TASK_COLUMNS
    ))
    .bind(toggle.completed)
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    path: web::Path<(i32, i32)>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let (path_user_id, task_id) = path.into_inner();
    let user_id = user.authorize(path_user_id)?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(task_not_found());
    }

    log::info!("user {} deleted task {}", user_id, task_id);
    Ok(HttpResponse::NoContent().finish())
}
