use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskPatch},
    usecases::TaskUseCase,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists every task. Any authenticated role.
#[get("")]
pub async fn get_tasks(tasks: web::Data<TaskUseCase>) -> Result<impl Responder, AppError> {
    let all = tasks.list_tasks().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// Retrieves a specific task by its id. Any authenticated role.
///
/// ## Responses:
/// - `200 OK`: the task as JSON.
/// - `404 Not Found`: no task has that id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_task(&task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a task with a caller-chosen id. Admin only.
///
/// ## Request Body:
/// `{id, title, description?, due_date?, status?}`.
///
/// ## Responses:
/// - `201 Created`: the stored task.
/// - `400 Bad Request`: malformed JSON or a field out of bounds.
/// - `409 Conflict`: a task with that id already exists.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskUseCase>,
    task: web::Json<Task>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task.validate()?;
    let created = tasks.create_task(task.into_inner()).await?;
    log::debug!("task '{}' created by '{}'", created.id, caller.username());
    Ok(HttpResponse::Created().json(created))
}

/// Partially updates a task. Admin only.
///
/// Fields missing from the body keep their stored values; `"due_date": null`
/// clears the due date.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
    patch: web::Json<TaskPatch>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let updated = tasks.update_task(&task_id, &patch).await?;
    log::debug!("task '{}' updated by '{}'", updated.id, caller.username());
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task by its id. Admin only.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: no task has that id.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskUseCase>,
    task_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(&task_id).await?;
    log::debug!("task '{}' deleted by '{}'", task_id, caller.username());
    Ok(HttpResponse::NoContent().finish())
}
