//! CareBot server: WhatsApp webhook, intent routing and admin routes over
//! the triage engine, store and general-question delegate.

pub mod bot;
pub mod routes;
pub mod state;
pub mod twilio;

pub use routes::build_router;
pub use state::AppState;
