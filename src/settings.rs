use std::env;

/// ITSM endpoint configuration, read from the environment at startup.
#[derive(Clone, Debug)]
pub struct ItsmSettings {
    /// Ticket creation endpoint.
    pub api_url: String,
    /// Basic auth credentials.
    pub user: String,
    pub password: String,
    /// Base URL for deep-linking to a created ticket in the UI.
    pub base_url: String,
    /// Value for the XAuthorization caller header.
    pub caller_id: String,
}

impl ItsmSettings {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("SN_API_URL").unwrap_or_default(),
            user: env::var("SN_USER").unwrap_or_default(),
            password: env::var("SN_PASSWORD").unwrap_or_default(),
            base_url: env::var("SN_BASE_URL").unwrap_or_default(),
            caller_id: env::var("SN_CALLER_ID").unwrap_or_else(|_| "patchcal".to_string()),
        }
    }

    /// Deep link to a ticket, or empty when no base URL is configured.
    pub fn ticket_url(&self, ticket_number: &str) -> String {
        if self.base_url.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), ticket_number)
        }
    }
}
