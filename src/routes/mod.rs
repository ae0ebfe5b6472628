use rocket::Route;

pub mod events;
pub mod servers;
pub mod tickets;

/// API routes
pub fn api_routes() -> Vec<Route> {
    routes![
        // Schedules
        events::list_events,
        events::create_event,
        events::update_event,
        events::delete_event,
        // Inventory
        servers::create_server,
        servers::list_servers,
        servers::get_server,
        servers::update_server,
        servers::delete_server,
        servers::delete_server_group,
        // Ticketing
        tickets::create_ticket,
    ]
}
