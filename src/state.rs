use crate::db::DbPool;
use crate::settings::ItsmSettings;

/// Shared application state managed by Rocket.
pub struct AppState {
    pub db_pool: DbPool,
    pub itsm: ItsmSettings,
    pub http: reqwest::Client,
}
