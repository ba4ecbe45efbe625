use actix_service::{Service, Transform};

use actix_web::{
    body::EitherBody, dev::{ServiceRequest, ServiceResponse},
    http::header,
    Error,
    HttpResponse,
};
use auth_service::guard::{self, GuardDecision, LoginRedirect, RedirectState, LOGIN_PATH};
use auth_service::session::SessionStore;
use crate::result::result_error_msg;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

/// 路由门禁中间件：每次页面导航前查会话与权限表。
/// 登录页、认证接口与 /api 数据接口不在此拦截（/api 由代理处理器自检）。
pub struct GuardMiddleware {
    pub session: Arc<SessionStore>,
    pub redirects: Arc<RedirectState>,
}

impl<S, B> Transform<S, ServiceRequest> for GuardMiddleware
where
    S: Service<ServiceRequest, Response=ServiceResponse<B>, Error=Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GuardMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(GuardMiddlewareService {
            service: Rc::new(service),
            session: self.session.clone(),
            redirects: self.redirects.clone(),
        })
    }
}

pub struct GuardMiddlewareService<S> {
    service: Rc<S>,
    session: Arc<SessionStore>,
    redirects: Arc<RedirectState>,
}

impl<S, B> Service<ServiceRequest> for GuardMiddlewareService<S>
where
    S: Service<ServiceRequest, Response=ServiceResponse<B>, Error=Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }
    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let path = req.path().to_string();
        if path.starts_with(LOGIN_PATH) || path.starts_with("/auth") || path.starts_with("/api") {
            return Box::pin(async move {
                let res = srv.call(req).await?;
                let res = res.map_body(|_, body| EitherBody::new(body));
                return Ok(res);
            });
        }
        match guard::evaluate(&self.session, &path) {
            GuardDecision::Authorized => Box::pin(async move {
                let res = srv.call(req).await?;
                let res = res.map_body(|_, body| EitherBody::new(body));
                return Ok(res);
            }),
            GuardDecision::RedirectToLogin { from } => {
                // 原始路径存入导航状态随后回放，不挂在跳转 URL 上
                self.redirects.schedule(LoginRedirect { from, message: None });
                Box::pin(async move {
                    Ok(req.into_response(
                        HttpResponse::Found()
                            .insert_header((header::LOCATION, LOGIN_PATH))
                            .finish()
                            .map_into_right_body(),
                    ))
                })
            }
            // 终态拒绝：只提示"返回上一页"，不做自动跳转，避免跳转循环
            GuardDecision::AccessDenied => Box::pin(async move {
                Ok(req.into_response(
                    HttpResponse::Forbidden()
                        .json(result_error_msg("Access denied: use your browser's back button to return"))
                        .map_into_right_body(),
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};
    use auth_service::entitys::user_entity::UserSession;
    use auth_service::rbac::Role;
    use tempfile::TempDir;

    async fn page() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn stores(dir: &TempDir, session: Option<UserSession>) -> (Arc<SessionStore>, Arc<RedirectState>) {
        let store = Arc::new(SessionStore::load(dir.path().join("admin_user.json")));
        if let Some(session) = session {
            store.set_session(session).unwrap();
        }
        (store, Arc::new(RedirectState::default()))
    }

    #[actix_web::test]
    async fn test_anonymous_redirected_to_login() {
        let dir = TempDir::new().unwrap();
        let (session, redirects) = stores(&dir, None);
        let app = test::init_service(
            App::new()
                .wrap(GuardMiddleware { session: session.clone(), redirects: redirects.clone() })
                .route("/admin/patients", web::get().to(page)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/patients").to_request()).await;
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), LOGIN_PATH);
        // 原始路径已存入导航状态
        assert_eq!(redirects.take().unwrap().from, "/admin/patients");
    }

    #[actix_web::test]
    async fn test_doctor_gets_terminal_denial_on_roster() {
        let dir = TempDir::new().unwrap();
        let (session, redirects) = stores(&dir, Some(UserSession::new(Role::Doctor, "bob")));
        let app = test::init_service(
            App::new()
                .wrap(GuardMiddleware { session, redirects: redirects.clone() })
                .route("/admin/doctors", web::get().to(page)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/doctors").to_request()).await;
        assert_eq!(resp.status(), 403);
        // 拒绝是终态，不排任何跳转
        assert!(redirects.take().is_none());
    }

    #[actix_web::test]
    async fn test_admin_passes_through() {
        let dir = TempDir::new().unwrap();
        let (session, redirects) = stores(&dir, Some(UserSession::new(Role::Admin, "alice")));
        let app = test::init_service(
            App::new()
                .wrap(GuardMiddleware { session, redirects })
                .route("/admin/billing", web::get().to(page)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/billing").to_request()).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_login_page_not_guarded() {
        let dir = TempDir::new().unwrap();
        let (session, redirects) = stores(&dir, None);
        let app = test::init_service(
            App::new()
                .wrap(GuardMiddleware { session, redirects })
                .route("/admin/login", web::get().to(page)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/admin/login").to_request()).await;
        assert_eq!(resp.status(), 200);
    }
}
