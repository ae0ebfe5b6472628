use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::error::ApiError;
use crate::models::{ts, AffectedServer, Event, TicketStatus};
use crate::schema::events;
use crate::state::AppState;
use crate::ticket;

/// Body for `POST /tickets`. When `servers` is omitted the affected list is
/// derived from the inventory at submission time.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketSubmission {
    pub event_id: Option<String>,
    pub customer_name: Option<String>,
    pub server_group: Option<String>,
    pub os_type: Option<String>,
    pub servers: Option<Vec<AffectedServer>>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn required_field(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{field} is required"))),
    }
}

/// Write the submission outcome back onto the event. A failure here is logged
/// and swallowed; the remote outcome has already been decided.
fn record_ticket_outcome(
    conn: &mut SqliteConnection,
    event_id: &str,
    status: TicketStatus,
    ticket_number: Option<&str>,
) {
    let result = match ticket_number {
        Some(number) => diesel::update(events::table.find(event_id))
            .set((
                events::ticket_number.eq(number),
                events::ticket_creation_status.eq(status.as_str()),
                events::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn),
        None => diesel::update(events::table.find(event_id))
            .set((
                events::ticket_creation_status.eq(status.as_str()),
                events::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn),
    };

    if let Err(e) = result {
        log::error!(
            "Failed to record ticket status {} on event {event_id}: {e}",
            status.as_str()
        );
    }
}

/// Create a change-request in the ITSM system for a schedule, then persist
/// the outcome on the event
#[post("/tickets", format = "json", data = "<body>")]
pub async fn create_ticket(
    state: &State<AppState>,
    body: Json<TicketSubmission>,
) -> Result<Json<Value>, ApiError> {
    let body = body.into_inner();

    let event_id = required_field(body.event_id, "eventId")?;
    let customer_name = required_field(body.customer_name, "customerName")?;
    let server_group = required_field(body.server_group, "serverGroup")?;
    let os_type = required_field(body.os_type, "osType")?;
    let start_raw = required_field(body.start, "start")?;
    let end_raw = required_field(body.end, "end")?;

    let start = ts::parse(&start_raw)
        .ok_or_else(|| ApiError::Validation("start is not a valid timestamp".to_string()))?;
    let end = ts::parse(&end_raw)
        .ok_or_else(|| ApiError::Validation("end is not a valid timestamp".to_string()))?;

    let mut conn = state.db_pool.get()?;

    events::table
        .find(&event_id)
        .select(Event::as_select())
        .first::<Event>(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    // Point-in-time join: the set of affected servers is whatever the
    // inventory holds right now.
    let servers: Vec<AffectedServer> = match body.servers {
        Some(list) => list,
        None => db::servers_for_event(&mut conn, &customer_name, &server_group, &os_type)?
            .iter()
            .map(AffectedServer::from)
            .collect(),
    };

    let request =
        ticket::build_ticket_request(&customer_name, &server_group, &os_type, start, end, &servers);

    match ticket::submit_ticket(&state.http, &state.itsm, &request).await {
        Ok(ticket_number) => {
            record_ticket_outcome(
                &mut conn,
                &event_id,
                TicketStatus::Created,
                Some(&ticket_number),
            );
            log::info!("Ticket {ticket_number} created for event {event_id}");
            Ok(Json(json!({
                "ticketNumber": ticket_number,
                "status": "Created",
                "ticketUrl": state.itsm.ticket_url(&ticket_number),
            })))
        }
        Err(e) => {
            record_ticket_outcome(&mut conn, &event_id, TicketStatus::Failed, None);
            Err(e)
        }
    }
}
