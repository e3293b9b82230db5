// Route exports
pub mod users;

pub use users::AppState;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(users::configure);
}
