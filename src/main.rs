#[macro_use]
extern crate rocket;

mod db;
mod error;
mod models;
mod routes;
mod schema;
mod settings;
mod state;
mod ticket;
mod validate;


use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use serde_json::{json, Value};

use settings::ItsmSettings;
use state::AppState;

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "success": false, "message": "Resource not found" }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "success": false, "message": "Malformed request body" }))
}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "success": false, "message": "Internal server error" }))
}

fn build_rocket(app_state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(app_state)
        .mount("/api", routes::api_routes())
        .register("/", catchers![not_found, unprocessable, internal_error])
}

#[launch]
fn rocket() -> _ {
    let pool = db::initialize().expect("Failed to initialize database");

    let app_state = AppState {
        db_pool: pool,
        itsm: ItsmSettings::from_env(),
        http: reqwest::Client::new(),
    };

    build_rocket(app_state)
}
