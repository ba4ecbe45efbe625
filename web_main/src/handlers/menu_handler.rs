use crate::result::ResultResponse;
use actix_web::{get, web, Responder};
use auth_service::menu::{menu_for_role, MenuItem};
use auth_service::rbac::accessible_modules;
use auth_service::session::SessionStore;
use common::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(menus);
    cfg.service(modules);
}

/// 当前角色可见的侧栏菜单。仅展示用，导航时门禁仍按模块重新判定。
#[utoipa::path(
    get,
    path = "/auth/menus",
    responses(
        (status = 200, description = "Menu items for the signed-in role")
    )
)]
#[get("/auth/menus")]
async fn menus(session: web::Data<SessionStore>) -> Result<impl Responder, AppError> {
    match session.role() {
        Some(role) => Ok(web::Json(ResultResponse::ok(menu_for_role(role)))),
        None => Ok(web::Json(ResultResponse::<Vec<&MenuItem>>::err("未登录"))),
    }
}

/// 当前角色可查看的模块列表
#[get("/auth/modules")]
async fn modules(session: web::Data<SessionStore>) -> Result<impl Responder, AppError> {
    match session.role() {
        Some(role) => Ok(web::Json(ResultResponse::ok(accessible_modules(role)))),
        None => Ok(web::Json(ResultResponse::<Vec<auth_service::rbac::Module>>::err("未登录"))),
    }
}
