use diesel::prelude::*;
use rocket::form::FromForm;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::{NewServerRequest, Server, ServerPatch};
use crate::schema::servers;
use crate::state::AppState;
use crate::validate;

/// Query filters for the inventory listing. Text fields match as
/// case-insensitive substrings, keys and enums match exactly.
#[derive(FromForm, Debug, Default)]
pub struct ServerFilters {
    #[field(name = "CID")]
    pub cid: Option<i64>,
    #[field(name = "CUID")]
    pub cuid: Option<i64>,
    #[field(name = "customerName")]
    pub customer_name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    #[field(name = "serverGroup")]
    pub server_group: Option<String>,
    #[field(name = "osType")]
    pub os_type: Option<String>,
    #[field(name = "mDBA")]
    pub m_dba: Option<String>,
}

/// Register a server in the inventory
#[post("/servers", format = "json", data = "<body>")]
pub async fn create_server(
    state: &State<AppState>,
    body: Json<NewServerRequest>,
) -> Result<Custom<Json<Value>>, ApiError> {
    let new_server = validate::validate_new_server(body.into_inner())?;

    let mut conn = state.db_pool.get()?;

    let existing = servers::table
        .filter(servers::cid.eq(new_server.cid))
        .select(Server::as_select())
        .first::<Server>(&mut conn)
        .optional()?;
    if existing.is_some() {
        return Err(ApiError::Duplicate(
            "Server with this CID already exists".to_string(),
        ));
    }

    diesel::insert_into(servers::table)
        .values(&new_server)
        .execute(&mut conn)?;

    let created = servers::table
        .filter(servers::cid.eq(new_server.cid))
        .select(Server::as_select())
        .first::<Server>(&mut conn)?;

    Ok(Custom(
        Status::Created,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// List servers with optional filters, newest first
#[get("/servers?<filters..>")]
pub async fn list_servers(
    state: &State<AppState>,
    filters: ServerFilters,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let mut query = servers::table.select(Server::as_select()).into_boxed();
    if let Some(v) = filters.cid {
        query = query.filter(servers::cid.eq(v));
    }
    if let Some(v) = filters.cuid {
        query = query.filter(servers::cuid.eq(v));
    }
    if let Some(v) = &filters.customer_name {
        query = query.filter(servers::customer_name.like(format!("%{v}%")));
    }
    if let Some(v) = &filters.hostname {
        query = query.filter(servers::hostname.like(format!("%{v}%")));
    }
    if let Some(v) = filters.ip {
        query = query.filter(servers::ip.eq(v));
    }
    if let Some(v) = &filters.server_group {
        query = query.filter(servers::server_group.like(format!("%{v}%")));
    }
    if let Some(v) = &filters.os_type {
        query = query.filter(servers::os_type.like(format!("%{v}%")));
    }
    if let Some(v) = filters.m_dba {
        query = query.filter(servers::m_dba.eq(v));
    }

    let rows = query
        .order(servers::created_at.desc())
        .load::<Server>(&mut conn)?;

    Ok(Json(json!({
        "success": true,
        "count": rows.len(),
        "data": rows,
    })))
}

/// Fetch a single server by CID
#[get("/servers/<cid>")]
pub async fn get_server(state: &State<AppState>, cid: i64) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let server = servers::table
        .filter(servers::cid.eq(cid))
        .select(Server::as_select())
        .first::<Server>(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Server not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": server })))
}

/// Partial update by CID; the CID itself is immutable
#[put("/servers/<cid>", format = "json", data = "<body>")]
pub async fn update_server(
    state: &State<AppState>,
    cid: i64,
    body: Json<ServerPatch>,
) -> Result<Json<Value>, ApiError> {
    let changeset = validate::validate_server_patch(cid, body.into_inner())?;

    let mut conn = state.db_pool.get()?;

    let updated = diesel::update(servers::table.filter(servers::cid.eq(cid)))
        .set(&changeset)
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(ApiError::NotFound("Server not found".to_string()));
    }

    let server = servers::table
        .filter(servers::cid.eq(cid))
        .select(Server::as_select())
        .first::<Server>(&mut conn)?;

    Ok(Json(json!({ "success": true, "data": server })))
}

/// Delete a single server by CID
#[delete("/servers/<cid>")]
pub async fn delete_server(state: &State<AppState>, cid: i64) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let server = servers::table
        .filter(servers::cid.eq(cid))
        .select(Server::as_select())
        .first::<Server>(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Server not found".to_string()))?;

    diesel::delete(servers::table.filter(servers::cid.eq(cid))).execute(&mut conn)?;

    Ok(Json(json!({
        "success": true,
        "message": "Server deleted successfully",
        "data": server,
    })))
}

/// Delete every server in a customer's group. Each row is deleted
/// independently; rows already removed stay removed when a later delete
/// fails, and the failure count is reported back.
#[delete("/servers/group/<customer_name>/<server_group>")]
pub async fn delete_server_group(
    state: &State<AppState>,
    customer_name: &str,
    server_group: &str,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db_pool.get()?;

    let targets: Vec<i64> = servers::table
        .filter(servers::customer_name.eq(customer_name))
        .filter(servers::server_group.eq(server_group))
        .select(servers::cid)
        .load::<i64>(&mut conn)?;

    if targets.is_empty() {
        return Err(ApiError::NotFound(
            "No servers found for this group".to_string(),
        ));
    }

    let mut failed = 0usize;
    for &cid in &targets {
        if let Err(e) =
            diesel::delete(servers::table.filter(servers::cid.eq(cid))).execute(&mut conn)
        {
            log::error!("Failed to delete server CID {cid}: {e}");
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(ApiError::Aggregate {
            failed,
            attempted: targets.len(),
        });
    }

    Ok(Json(json!({
        "success": true,
        "message": "Server group deleted successfully",
        "deletedCount": targets.len(),
    })))
}
