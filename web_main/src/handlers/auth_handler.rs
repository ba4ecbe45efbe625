use crate::result::{AppState, ResultResponse};
use actix_web::{get, post, web, Responder};
use auth_service::api_client::ApiClient;
use auth_service::entitys::user_entity::UserSession;
use auth_service::guard::{LoginRedirect, RedirectState, LOGIN_PATH};
use auth_service::rbac::Role;
use auth_service::session::SessionStore;
use common::errors::AppError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth_login);
    cfg.service(auth_logout);
    cfg.service(auth_session);
    cfg.service(auth_login_state);
}

#[derive(Serialize, Deserialize, Debug, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    #[validate(length(min = 3, message = "用户名太短"))]
    pub username: String,
    #[validate(length(min = 6, message = "密码太短"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub user: UserSession,
    /// 登录前被门禁拦下的原始路径，登录成功后回放
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<LoginRedirect>,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login result", body = LoginResult)
    )
)]
#[post("/auth/login")]
pub async fn auth_login(
    dto: web::Json<LoginDto>,
    state: web::Data<AppState>,
    session: web::Data<SessionStore>,
    redirects: web::Data<RedirectState>,
    client: web::Data<ApiClient>,
) -> Result<impl Responder, AppError> {
    if let Err(e) = dto.validate() {
        return Ok(web::Json(ResultResponse::<LoginResult>::err(e.to_string())));
    }
    let url = format!("{}/auth/login", state.config.get_backend().auth_url);
    let payload = json!({ "username": dto.username, "password": dto.password });
    // 登录端点的 401 由拦截器原样透传，在这里变成表单错误
    let resp = client.send_json(Method::POST, &url, Some(payload), LOGIN_PATH).await?;
    if !resp.is_success() {
        let msg = resp
            .body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("用户名或密码错误");
        return Ok(web::Json(ResultResponse::<LoginResult>::err(msg)));
    }

    let user = resp.body.get("user").cloned().unwrap_or(Value::Null);
    // 角色码无法识别一律拒绝登录，门禁不吃未知角色
    let Some(role) = user
        .get("role")
        .and_then(Value::as_str)
        .and_then(|code| Role::from_str(code).ok())
    else {
        return Ok(web::Json(ResultResponse::<LoginResult>::err("无法识别的账号角色")));
    };
    let Some(username) = user.get("username").and_then(Value::as_str) else {
        return Ok(web::Json(ResultResponse::<LoginResult>::err("认证服务返回的资料不完整")));
    };

    let mut record = UserSession::new(role, username);
    let first = user.get("first_name").and_then(Value::as_str).unwrap_or("");
    let last = user.get("last_name").and_then(Value::as_str).unwrap_or("");
    let display = format!("{} {}", first, last);
    if !display.trim().is_empty() {
        record = record.with_display_name(display.trim());
    }
    if let Some(email) = user.get("email").and_then(Value::as_str) {
        record = record.with_email(email);
    }
    if let Some(token) = resp.body.get("access_token").and_then(Value::as_str) {
        record = record.with_access_token(token);
    }
    session.set_session(record.clone())?;

    // 取走待回放的跳转状态（过期提示已经展示过，消息不再带回）
    let redirect = redirects.take();
    Ok(web::Json(ResultResponse::ok(LoginResult { user: record, redirect })))
}

#[post("/auth/logout")]
async fn auth_logout(session: web::Data<SessionStore>) -> Result<impl Responder, AppError> {
    session.logout();
    Ok(web::Json(ResultResponse::<String>::ok_msg("已退出登录", None)))
}

/// 持久化会话访问器：外壳启动时查询当前登录身份
#[get("/auth/session")]
async fn auth_session(session: web::Data<SessionStore>) -> Result<impl Responder, AppError> {
    match session.current() {
        Some(current) => Ok(web::Json(ResultResponse::ok((*current).clone()))),
        None => Ok(web::Json(ResultResponse::<UserSession>::err("未登录"))),
    }
}

/// 登录页初始化时读取导航状态（过期提示消息、原始路径），只读不清空
#[get("/auth/login_state")]
async fn auth_login_state(redirects: web::Data<RedirectState>) -> Result<impl Responder, AppError> {
    match redirects.peek() {
        Some(redirect) => Ok(web::Json(ResultResponse::ok(redirect))),
        None => Ok(web::Json(ResultResponse::<LoginRedirect>::ok_msg("无待处理跳转", None))),
    }
}
