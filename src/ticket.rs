use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::AffectedServer;
use crate::settings::ItsmSettings;

/// Change-request payload posted to the ITSM endpoint. Field names follow the
/// receiving catalog API, not this crate's conventions.
#[derive(Serialize, Debug)]
pub struct TicketRequest {
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    #[serde(rename = "catalogName")]
    pub catalog_name: String,
    pub category: String,
    pub requested_for: String,
    #[serde(rename = "commonVariables")]
    pub common_variables: CommonVariables,
    pub notes: Vec<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommonVariables {
    pub service_identifier: String,
    pub contact_mail_id: String,
    pub contact_name: String,
    pub contact_number: String,
    pub short_description: String,
    pub product: String,
    pub detail_description: String,
    pub multiple_service_id_affected: String,
}

#[derive(Deserialize, Debug)]
struct TicketResponse {
    #[serde(rename = "ticketId")]
    ticket_id: Option<String>,
}

/// Catalog selection by keyword, first match wins.
pub fn catalog_name(os_type: &str) -> &'static str {
    let os = os_type.to_lowercase();
    if os.contains("windows") {
        "Windows - Windows OS Patching"
    } else if os.contains("linux") || os.contains("unix") {
        "Unix - OS patching"
    } else if os.contains("database") {
        "MS SQL User creation/modification/deletion"
    } else {
        "OS Patching"
    }
}

/// Render a stored UTC timestamp in IST for the ticket body.
fn format_ist(ts: NaiveDateTime) -> String {
    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST offset is valid");
    Utc.from_utc_datetime(&ts)
        .with_timezone(&ist)
        .format("%-d %B %Y at %-I:%M:%S %P IST")
        .to_string()
}

fn servers_table_html(servers: &[AffectedServer]) -> String {
    let rows: String = servers
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                s.hostname, s.ip, s.os_type, s.m_dba
            )
        })
        .collect();

    format!(
        concat!(
            "<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\" ",
            "style=\"border-collapse: collapse; width: 100%; margin-top: 15px;\">",
            "<thead><tr style=\"background-color: #f2f2f2;\">",
            "<th>Hostname</th><th>IP</th><th>OS</th><th>Managed DBA</th>",
            "</tr></thead><tbody>{}</tbody></table>"
        ),
        rows
    )
}

fn detail_description(
    customer_name: &str,
    server_group: &str,
    os_type: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    servers: &[AffectedServer],
) -> String {
    format!(
        concat!(
            "<p>Hi OS Team,<br><br>",
            "Please perform the OS Patching activity as per the schedule ",
            "and also share the prepatch report.</p>",
            "<p><strong>Customer:</strong> {}</p>",
            "<p><strong>Server Group:</strong> {}</p>",
            "<p><strong>OS Type:</strong> {}</p>",
            "<p><strong>Start Time:</strong> {}</p>",
            "<p><strong>End Time:</strong> {}</p>",
            "{}"
        ),
        customer_name,
        server_group,
        os_type,
        format_ist(start),
        format_ist(end),
        servers_table_html(servers)
    )
}

/// Derive the change-request payload from a schedule and its affected servers.
/// Pure: the same inputs always produce the same payload.
pub fn build_ticket_request(
    customer_name: &str,
    server_group: &str,
    os_type: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    servers: &[AffectedServer],
) -> TicketRequest {
    let service_identifier = servers.first().map(|s| s.name.clone()).unwrap_or_default();
    let short_description = format!("{customer_name} - {server_group} - {os_type} patching");

    TicketRequest {
        correlation_id: String::new(),
        catalog_name: catalog_name(os_type).to_string(),
        category: "MHS".to_string(),
        requested_for: String::new(),
        common_variables: CommonVariables {
            service_identifier,
            contact_mail_id: String::new(),
            contact_name: String::new(),
            contact_number: String::new(),
            short_description,
            product: String::new(),
            detail_description: detail_description(
                customer_name,
                server_group,
                os_type,
                start,
                end,
                servers,
            ),
            multiple_service_id_affected: "false".to_string(),
        },
        notes: Vec::new(),
    }
}

/// Post the payload to the ITSM endpoint and return the created ticket id.
/// Network errors, non-2xx replies and bodies without a ticket id all surface
/// as `Upstream`.
pub async fn submit_ticket(
    http: &reqwest::Client,
    itsm: &ItsmSettings,
    request: &TicketRequest,
) -> Result<String, ApiError> {
    let response = http
        .post(&itsm.api_url)
        .basic_auth(&itsm.user, Some(&itsm.password))
        .header("XAuthorization", &itsm.caller_id)
        .header("table-name", "change_request")
        .json(request)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("ITSM request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Upstream(format!(
            "ITSM returned {status}: {body}"
        )));
    }

    let parsed: TicketResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(format!("ITSM response was not valid JSON: {e}")))?;

    match parsed.ticket_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::Upstream(
            "ITSM response did not contain a ticketId".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDate::from_ymd_opt(2026, 9, 12)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        (start, start + chrono::Duration::hours(4))
    }

    fn fleet() -> Vec<AffectedServer> {
        vec![
            AffectedServer {
                name: "acme-app-01".into(),
                hostname: "acme-app-01.acme.local".into(),
                ip: "10.20.30.40".into(),
                os_type: "Windows Server 2019".into(),
                m_dba: "No".into(),
            },
            AffectedServer {
                name: "acme-app-02".into(),
                hostname: "acme-app-02.acme.local".into(),
                ip: "10.20.30.41".into(),
                os_type: "Windows Server 2019".into(),
                m_dba: "Yes".into(),
            },
        ]
    }

    #[test]
    fn catalog_mapping_by_keyword() {
        assert_eq!(
            catalog_name("Windows Server 2019"),
            "Windows - Windows OS Patching"
        );
        assert_eq!(catalog_name("RedHat Linux"), "Unix - OS patching");
        assert_eq!(catalog_name("AIX Unix"), "Unix - OS patching");
        assert_eq!(
            catalog_name("Oracle Database"),
            "MS SQL User creation/modification/deletion"
        );
        assert_eq!(catalog_name("AIX"), "OS Patching");
    }

    #[test]
    fn catalog_mapping_is_case_insensitive_and_first_match_wins() {
        assert_eq!(catalog_name("WINDOWS"), "Windows - Windows OS Patching");
        // "windows" outranks "database" when both appear
        assert_eq!(
            catalog_name("Windows Database Server"),
            "Windows - Windows OS Patching"
        );
    }

    #[test]
    fn builder_is_deterministic() {
        let (start, end) = window();
        let servers = fleet();
        let a = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &servers);
        let b = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &servers);
        assert_eq!(a.catalog_name, b.catalog_name);
        assert_eq!(
            a.common_variables.short_description,
            b.common_variables.short_description
        );
        assert_eq!(
            a.common_variables.service_identifier,
            b.common_variables.service_identifier
        );
        assert_eq!(
            a.common_variables.detail_description,
            b.common_variables.detail_description
        );
    }

    #[test]
    fn builder_fills_fixed_fields() {
        let (start, end) = window();
        let req = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &fleet());
        assert_eq!(req.category, "MHS");
        assert_eq!(req.correlation_id, "");
        assert_eq!(req.requested_for, "");
        assert_eq!(req.common_variables.multiple_service_id_affected, "false");
        assert!(req.notes.is_empty());
        assert_eq!(
            req.common_variables.short_description,
            "Acme Corp - App Servers - Windows patching"
        );
        assert_eq!(req.common_variables.service_identifier, "acme-app-01");
    }

    #[test]
    fn service_identifier_is_empty_without_servers() {
        let (start, end) = window();
        let req = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &[]);
        assert_eq!(req.common_variables.service_identifier, "");
    }

    #[test]
    fn description_embeds_ist_times_and_server_rows() {
        let (start, end) = window();
        let req = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &fleet());
        let body = &req.common_variables.detail_description;
        // 18:30 UTC is 00:00 IST next day
        assert!(body.contains("13 September 2026 at 12:00:00 am IST"));
        assert!(body.contains("<strong>Customer:</strong> Acme Corp"));
        assert!(body.contains("<td>acme-app-01.acme.local</td>"));
        assert!(body.contains("<td>10.20.30.41</td>"));
        assert!(body.contains("<th>Managed DBA</th>"));
    }

    #[test]
    fn payload_serializes_with_catalog_field_names() {
        let (start, end) = window();
        let req = build_ticket_request("Acme Corp", "App Servers", "Windows", start, end, &fleet());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("catalogName").is_some());
        assert!(json.get("requested_for").is_some());
        let vars = json.get("commonVariables").unwrap();
        assert!(vars.get("serviceIdentifier").is_some());
        assert!(vars.get("multipleServiceIdAffected").is_some());
    }
}
