use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use auth_service::api_client::ApiClient;
use auth_service::guard::RedirectState;
use auth_service::session::SessionStore;
use common::config::AppConfig;
use log::{warn, LevelFilter};
use std::str::FromStr;
use std::sync::Arc;
use web_main::handlers;
use web_main::middleware::guard_middleware::GuardMiddleware;
use web_main::result::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 读取配置文件
    let app_state = AppState::new();
    //初始化日志
    init_log(&app_state.config);
    let server = app_state.config.get_server();
    let address_and_port = format!("{}:{}", server.host, server.port);
    warn!("Starting server on {}", address_and_port);

    // 会话仓库、跳转状态、带过期拦截的后端客户端：
    // 全部按实例构造后注入，不做任何全局可变状态
    let session = Arc::new(SessionStore::load(app_state.config.get_session().storage_path));
    let redirects = Arc::new(RedirectState::default());
    let api_client = Arc::new(ApiClient::new(Arc::clone(&session), Arc::clone(&redirects)));

    let web_state = web::Data::new(app_state.clone());
    let session_data = web::Data::from(Arc::clone(&session));
    let redirect_data = web::Data::from(Arc::clone(&redirects));
    let client_data = web::Data::from(Arc::clone(&api_client));
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(GuardMiddleware {
                session: Arc::clone(&session),
                redirects: Arc::clone(&redirects),
            })
            .app_data(web_state.clone())
            .app_data(session_data.clone())
            .app_data(redirect_data.clone())
            .app_data(client_data.clone())
            .configure(handlers::configure)
    })
    .bind(address_and_port)?
    .run()
    .await
}

pub fn init_log(config: &AppConfig) {
    let level = LevelFilter::from_str(&config.get_sys().log_level).unwrap_or(LevelFilter::Info);
    let mut builder = env_logger::Builder::new();
    builder.filter(None, level);
    builder.init();
}
