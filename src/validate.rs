use chrono::{NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    ts, Event, EventChangeset, EventPatch, MailStatus, MdbaFlag, NewEvent, NewEventRequest,
    NewServer, NewServerRequest, OsType, ServerChangeset, ServerPatch, TicketStatus,
};

lazy_static! {
    // Simple IPv4 shape check, octet ranges are not enforced
    static ref IPV4_RE: Regex = Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_ipv4(v: &str) -> bool {
    IPV4_RE.is_match(v)
}

pub fn is_valid_email(v: &str) -> bool {
    EMAIL_RE.is_match(v)
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::Validation(message.to_string())),
    }
}

fn parse_ts(value: &str, message: &str) -> Result<NaiveDateTime, ApiError> {
    ts::parse(value).ok_or_else(|| ApiError::Validation(message.to_string()))
}

fn check_ip(ip: &str) -> Result<(), ApiError> {
    if is_valid_ipv4(ip) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "{ip} is not a valid IP address!"
        )))
    }
}

fn check_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "{email} is not a valid email address!"
        )))
    }
}

fn check_mdba(value: &str) -> Result<(), ApiError> {
    MdbaFlag::parse(value)
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation("mDBA must be either Yes or No".to_string()))
}

/// Validate a new inventory record and stamp it for insertion.
pub fn validate_new_server(req: NewServerRequest) -> Result<NewServer, ApiError> {
    let cid = req
        .cid
        .ok_or_else(|| ApiError::Validation("CID is required".to_string()))?;
    let cuid = req
        .cuid
        .ok_or_else(|| ApiError::Validation("CUID is required".to_string()))?;
    let customer_name = required(req.customer_name, "customerName is required")?;
    let name = required(req.name, "name is required")?;
    let hostname = required(req.hostname, "hostname is required")?;
    let ip = required(req.ip, "ip is required")?;
    let server_group = required(req.server_group, "serverGroup is required")?;
    let os_type = required(req.os_type, "osType is required")?;
    let m_dba = required(req.m_dba, "mDBA is required")?;
    let customer_mail_id = required(req.customer_mail_id, "customerMailID is required")?
        .to_lowercase();

    check_ip(&ip)?;
    check_mdba(&m_dba)?;
    check_email(&customer_mail_id)?;

    let now = Utc::now().naive_utc();
    Ok(NewServer {
        cid,
        cuid,
        customer_name,
        name,
        hostname,
        ip,
        server_group,
        os_type,
        m_dba,
        customer_mail_id,
        created_at: now,
        updated_at: now,
    })
}

/// Validate an inventory update. The CID is immutable; a body CID is only
/// accepted when it repeats the path CID.
pub fn validate_server_patch(path_cid: i64, patch: ServerPatch) -> Result<ServerChangeset, ApiError> {
    if let Some(body_cid) = patch.cid {
        if body_cid != path_cid {
            return Err(ApiError::Immutable("CID cannot be modified".to_string()));
        }
    }

    let check_text = |value: Option<String>, message: &str| -> Result<Option<String>, ApiError> {
        match value {
            None => Ok(None),
            Some(v) if v.trim().is_empty() => Err(ApiError::Validation(message.to_string())),
            Some(v) => Ok(Some(v.trim().to_string())),
        }
    };

    let ip = check_text(patch.ip, "ip is required")?;
    if let Some(v) = &ip {
        check_ip(v)?;
    }
    let m_dba = check_text(patch.m_dba, "mDBA is required")?;
    if let Some(v) = &m_dba {
        check_mdba(v)?;
    }
    let customer_mail_id = check_text(patch.customer_mail_id, "customerMailID is required")?
        .map(|v| v.to_lowercase());
    if let Some(v) = &customer_mail_id {
        check_email(v)?;
    }

    Ok(ServerChangeset {
        cuid: patch.cuid,
        customer_name: check_text(patch.customer_name, "customerName is required")?,
        name: check_text(patch.name, "name is required")?,
        hostname: check_text(patch.hostname, "hostname is required")?,
        ip,
        server_group: check_text(patch.server_group, "serverGroup is required")?,
        os_type: check_text(patch.os_type, "osType is required")?,
        m_dba,
        customer_mail_id,
        updated_at: Utc::now().naive_utc(),
    })
}

fn check_name_len(value: &str, message: &str) -> Result<(), ApiError> {
    if value.len() > 100 {
        Err(ApiError::Validation(message.to_string()))
    } else {
        Ok(())
    }
}

/// Validate a new schedule and stamp it for insertion. The window must lie in
/// the future and end after it starts.
pub fn validate_new_event(req: NewEventRequest) -> Result<NewEvent, ApiError> {
    let customer_name = required(req.customer_name, "Customer name is required")?;
    check_name_len(&customer_name, "Customer name cannot exceed 100 characters")?;

    let os_raw = required(req.os_type, "OS type is required")?;
    let os_type = OsType::parse(&os_raw).ok_or_else(|| {
        ApiError::Validation("OS type must be either Windows or Unix".to_string())
    })?;

    let server_group = required(req.server_group, "Server group is required")?;
    check_name_len(&server_group, "Server group cannot exceed 100 characters")?;

    let start_raw = required(req.schedule_start_time, "Schedule start time is required")?;
    let schedule_start_time = parse_ts(&start_raw, "Schedule start time is not a valid timestamp")?;
    let end_raw = required(req.schedule_end_time, "Schedule end time is required")?;
    let schedule_end_time = parse_ts(&end_raw, "Schedule end time is not a valid timestamp")?;

    let now = Utc::now().naive_utc();
    if schedule_start_time <= now {
        return Err(ApiError::Validation(
            "Schedule start time must be in the future".to_string(),
        ));
    }
    if schedule_end_time <= schedule_start_time {
        return Err(ApiError::Validation(
            "Schedule end time must be after start time".to_string(),
        ));
    }

    Ok(NewEvent {
        id: Uuid::new_v4().to_string(),
        customer_name,
        os_type: os_type.as_str().to_string(),
        server_group,
        schedule_start_time,
        schedule_end_time,
        ticket_number: String::new(),
        ticket_creation_status: TicketStatus::Pending.as_str().to_string(),
        mail_notification_status: MailStatus::Pending.as_str().to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Validate a partial schedule update against the stored row. Schedule bounds
/// present in the patch win over stored values when the pair is re-checked.
pub fn validate_event_patch(patch: EventPatch, stored: &Event) -> Result<EventChangeset, ApiError> {
    let customer_name = match patch.customer_name {
        None => None,
        Some(v) => {
            let v = required(Some(v), "Customer name is required")?;
            check_name_len(&v, "Customer name cannot exceed 100 characters")?;
            Some(v)
        }
    };

    let os_type = match patch.os_type {
        None => None,
        Some(v) => Some(
            OsType::parse(v.trim())
                .ok_or_else(|| {
                    ApiError::Validation("OS type must be either Windows or Unix".to_string())
                })?
                .as_str()
                .to_string(),
        ),
    };

    let server_group = match patch.server_group {
        None => None,
        Some(v) => {
            let v = required(Some(v), "Server group is required")?;
            check_name_len(&v, "Server group cannot exceed 100 characters")?;
            Some(v)
        }
    };

    let schedule_start_time = match patch.schedule_start_time {
        None => None,
        Some(v) => Some(parse_ts(&v, "Schedule start time is not a valid timestamp")?),
    };
    let schedule_end_time = match patch.schedule_end_time {
        None => None,
        Some(v) => Some(parse_ts(&v, "Schedule end time is not a valid timestamp")?),
    };

    if schedule_start_time.is_some() || schedule_end_time.is_some() {
        let start = schedule_start_time.unwrap_or(stored.schedule_start_time);
        let end = schedule_end_time.unwrap_or(stored.schedule_end_time);
        if end <= start {
            return Err(ApiError::Validation(
                "Schedule end time must be after start time".to_string(),
            ));
        }
    }

    let ticket_number = match patch.ticket_number {
        None => None,
        Some(v) => {
            if v.len() > 50 {
                return Err(ApiError::Validation(
                    "Ticket number cannot exceed 50 characters".to_string(),
                ));
            }
            Some(v)
        }
    };

    let ticket_creation_status = match patch.ticket_creation_status {
        None => None,
        Some(v) => {
            let status = TicketStatus::parse(&v).ok_or_else(|| {
                ApiError::Validation(
                    "Ticket creation status must be Pending, Created or Failed".to_string(),
                )
            })?;
            // Created is terminal
            if stored.ticket_creation_status == TicketStatus::Created.as_str()
                && status != TicketStatus::Created
            {
                return Err(ApiError::Validation(
                    "Ticket creation status cannot change once Created".to_string(),
                ));
            }
            Some(status.as_str().to_string())
        }
    };

    let mail_notification_status = match patch.mail_notification_status {
        None => None,
        Some(v) => Some(
            MailStatus::parse(&v)
                .ok_or_else(|| {
                    ApiError::Validation(
                        "Mail notification status must be Pending, Sent or Failed".to_string(),
                    )
                })?
                .as_str()
                .to_string(),
        ),
    };

    Ok(EventChangeset {
        customer_name,
        os_type,
        server_group,
        schedule_start_time,
        schedule_end_time,
        ticket_number,
        ticket_creation_status,
        mail_notification_status,
        updated_at: Utc::now().naive_utc(),
    })
}
