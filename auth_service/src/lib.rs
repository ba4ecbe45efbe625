pub mod api_client;
pub mod entitys;
pub mod guard;
pub mod menu;
pub mod rbac;
pub mod session;
