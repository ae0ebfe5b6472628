use diesel::prelude::*;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{Event, EventPatch, NewEventRequest};
use crate::schema::events;
use crate::state::AppState;
use crate::validate;

/// List all schedules, earliest window first
#[get("/events")]
pub async fn list_events(state: &State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let mut conn = state.db_pool.get()?;
    let result = events::table
        .order(events::schedule_start_time.asc())
        .select(Event::as_select())
        .load::<Event>(&mut conn)?;
    Ok(Json(result))
}

/// Create a schedule; status fields start out Pending
#[post("/events", format = "json", data = "<body>")]
pub async fn create_event(
    state: &State<AppState>,
    body: Json<NewEventRequest>,
) -> Result<Custom<Json<Event>>, ApiError> {
    let new_event = validate::validate_new_event(body.into_inner())?;

    let mut conn = state.db_pool.get()?;
    diesel::insert_into(events::table)
        .values(&new_event)
        .execute(&mut conn)?;

    let created = events::table
        .find(&new_event.id)
        .select(Event::as_select())
        .first::<Event>(&mut conn)?;

    Ok(Custom(Status::Created, Json(created)))
}

/// Partial update; schedule bounds are re-validated with patch values winning
#[put("/events/<id>", format = "json", data = "<body>")]
pub async fn update_event(
    state: &State<AppState>,
    id: &str,
    body: Json<EventPatch>,
) -> Result<Json<Event>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let stored = events::table
        .find(id)
        .select(Event::as_select())
        .first::<Event>(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let changeset = validate::validate_event_patch(body.into_inner(), &stored)?;

    diesel::update(events::table.find(id))
        .set(&changeset)
        .execute(&mut conn)?;

    let updated = events::table
        .find(id)
        .select(Event::as_select())
        .first::<Event>(&mut conn)?;

    Ok(Json(updated))
}

/// Delete a schedule by id
#[delete("/events/<id>")]
pub async fn delete_event(state: &State<AppState>, id: &str) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let deleted = diesel::delete(events::table.find(id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Event deleted successfully",
    })))
}
