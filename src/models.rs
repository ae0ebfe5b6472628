use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{events, servers};

/// OS taxonomy accepted by the schedule store. The inventory keeps free-text
/// OS strings; only events are restricted to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Windows,
    Unix,
}

impl OsType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Windows" => Some(Self::Windows),
            "Unix" => Some(Self::Unix),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Unix => "Unix",
        }
    }
}

/// Managed-DBA flag on an inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdbaFlag {
    Yes,
    No,
}

impl MdbaFlag {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Pending,
    Created,
    Failed,
}

impl TicketStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Created" => Some(Self::Created),
            "Failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Created => "Created",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailStatus {
    Pending,
    Sent,
    Failed,
}

impl MailStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Sent" => Some(Self::Sent),
            "Failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Sent => "Sent",
            Self::Failed => "Failed",
        }
    }
}

/// Timestamp (de)serialization helpers. Clients send either RFC 3339 with an
/// offset or the naive datetime-local form, with or without seconds; rows
/// store naive UTC.
pub mod ts {
    use chrono::{DateTime, NaiveDateTime};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    }
}

// ---------------------------------------------------------------------------
// Server inventory
// ---------------------------------------------------------------------------

#[derive(Queryable, Identifiable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = servers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Server {
    #[serde(skip_serializing)]
    pub id: i32,
    #[serde(rename = "CID")]
    pub cid: i64,
    #[serde(rename = "CUID")]
    pub cuid: i64,
    pub customer_name: String,
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub server_group: String,
    pub os_type: String,
    #[serde(rename = "mDBA")]
    pub m_dba: String,
    #[serde(rename = "customerMailID")]
    pub customer_mail_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = servers)]
pub struct NewServer {
    pub cid: i64,
    pub cuid: i64,
    pub customer_name: String,
    pub name: String,
    pub hostname: String,
    pub ip: String,
    pub server_group: String,
    pub os_type: String,
    pub m_dba: String,
    pub customer_mail_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Incoming body for `POST /servers`. Everything is optional at the serde
/// layer so missing fields surface as per-field validation messages instead of
/// a deserializer reject.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewServerRequest {
    #[serde(rename = "CID")]
    pub cid: Option<i64>,
    #[serde(rename = "CUID")]
    pub cuid: Option<i64>,
    pub customer_name: Option<String>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub server_group: Option<String>,
    pub os_type: Option<String>,
    #[serde(rename = "mDBA")]
    pub m_dba: Option<String>,
    #[serde(rename = "customerMailID")]
    pub customer_mail_id: Option<String>,
}

/// Incoming body for `PUT /servers/<cid>`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerPatch {
    #[serde(rename = "CID")]
    pub cid: Option<i64>,
    #[serde(rename = "CUID")]
    pub cuid: Option<i64>,
    pub customer_name: Option<String>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub server_group: Option<String>,
    pub os_type: Option<String>,
    #[serde(rename = "mDBA")]
    pub m_dba: Option<String>,
    #[serde(rename = "customerMailID")]
    pub customer_mail_id: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = servers)]
pub struct ServerChangeset {
    pub cuid: Option<i64>,
    pub customer_name: Option<String>,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub server_group: Option<String>,
    pub os_type: Option<String>,
    pub m_dba: Option<String>,
    pub customer_mail_id: Option<String>,
    pub updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Patch schedule
// ---------------------------------------------------------------------------

#[derive(Queryable, Identifiable, Selectable, Serialize, Debug, Clone)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub customer_name: String,
    pub os_type: String,
    pub server_group: String,
    pub schedule_start_time: NaiveDateTime,
    pub schedule_end_time: NaiveDateTime,
    pub ticket_number: String,
    pub ticket_creation_status: String,
    pub mail_notification_status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: String,
    pub customer_name: String,
    pub os_type: String,
    pub server_group: String,
    pub schedule_start_time: NaiveDateTime,
    pub schedule_end_time: NaiveDateTime,
    pub ticket_number: String,
    pub ticket_creation_status: String,
    pub mail_notification_status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Incoming body for `POST /events`. Timestamps arrive as strings and are
/// parsed during validation so format problems produce a 400, not a 422.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEventRequest {
    pub customer_name: Option<String>,
    pub os_type: Option<String>,
    pub server_group: Option<String>,
    pub schedule_start_time: Option<String>,
    pub schedule_end_time: Option<String>,
}

/// Incoming body for `PUT /events/<id>`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    pub customer_name: Option<String>,
    pub os_type: Option<String>,
    pub server_group: Option<String>,
    pub schedule_start_time: Option<String>,
    pub schedule_end_time: Option<String>,
    pub ticket_number: Option<String>,
    pub ticket_creation_status: Option<String>,
    pub mail_notification_status: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = events)]
pub struct EventChangeset {
    pub customer_name: Option<String>,
    pub os_type: Option<String>,
    pub server_group: Option<String>,
    pub schedule_start_time: Option<NaiveDateTime>,
    pub schedule_end_time: Option<NaiveDateTime>,
    pub ticket_number: Option<String>,
    pub ticket_creation_status: Option<String>,
    pub mail_notification_status: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Server fields carried into a ticket's description table. Callers may post
/// this shape directly; it is also derived from inventory rows.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AffectedServer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub ip: String,
    #[serde(rename = "osType", default)]
    pub os_type: String,
    #[serde(rename = "mDBA", default)]
    pub m_dba: String,
}

impl From<&Server> for AffectedServer {
    fn from(s: &Server) -> Self {
        Self {
            name: s.name.clone(),
            hostname: s.hostname.clone(),
            ip: s.ip.clone(),
            os_type: s.os_type.clone(),
            m_dba: s.m_dba.clone(),
        }
    }
}
