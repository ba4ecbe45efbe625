pub mod auth_handler;
pub mod menu_handler;
pub mod proxy_handler;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    auth_handler::configure(cfg);
    menu_handler::configure(cfg);
    proxy_handler::configure(cfg);
}
