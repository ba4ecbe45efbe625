use crate::guard::{LoginRedirect, RedirectState};
use crate::session::SessionStore;
use common::errors::AppError;
use log::warn;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 会话过期时给登录页的提示消息
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// 登录端点的固定路径片段：登录请求返回 401 属于登录失败，不触发全局登出
const LOGIN_PATH_FRAGMENT: &str = "login";

/// 跳转前的固定短延迟，让当前响应处理栈先退出再改导航状态
const REDIRECT_DEFER_MS: u64 = 50;

/// 后端微服务的 JSON 响应（状态码 + 解析后的消息体）
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 会话过期时回给调用方的合成响应，上游响应体不外泄
    fn session_expired() -> Self {
        Self { status: 401, body: json!({ "success": false, "error": "Session expired" }) }
    }
}

/// 带会话过期拦截的 REST 微服务客户端。
///
/// 所有出站请求都经由本客户端，对每个响应做过期检查：
/// 登录端点的 401 原样透传（登录失败要在表单上显示），
/// 其余端点的 401 触发一次性的登出加跳转，并向调用方返回合成的拒绝响应。
///
/// 拦截行为绑定在客户端实例上：认证外壳启动时构造即安装，
/// 实例销毁即卸载，不存在任何全局替换。
pub struct ApiClient {
    http: reqwest::Client,
    session: Arc<SessionStore>,
    redirects: Arc<RedirectState>,
    /// 单飞闸门：并发多个 401 也只触发一轮登出/跳转
    expiry_in_flight: Arc<AtomicBool>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionStore>, redirects: Arc<RedirectState>) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
            redirects,
            expiry_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 发送一个 JSON 请求。`current_path` 是操作者当前所在的控制台路径，
    /// 会话过期跳转时随导航状态带回登录页。
    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        current_path: &str,
    ) -> Result<ApiResponse, AppError> {
        let mut req = self.http.request(method, url);
        if let Some(session) = self.session.current() {
            if let Some(token) = &session.access_token {
                req = req.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        // 传输层错误原样上抛，拦截器只关心授权失败
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = parse_body(&resp.text().await?);
        Ok(self.intercept(status, url, current_path, body))
    }

    /// 过期检查。401 且目标不是登录端点时走过期流程，其余响应原样透传。
    fn intercept(&self, status: u16, url: &str, current_path: &str, body: Value) -> ApiResponse {
        if status == 401 && !url.contains(LOGIN_PATH_FRAGMENT) {
            return self.on_session_expired(current_path);
        }
        ApiResponse { status, body }
    }

    /// 会话过期处理。首个触发者清会话并排定跳转，
    /// 同一窗口内的后续触发者只拿到合成响应，不再重复登出。
    fn on_session_expired(&self, current_path: &str) -> ApiResponse {
        if self
            .expiry_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            warn!("后端返回 401，会话已过期，跳转登录页");
            self.session.logout();

            let redirects = Arc::clone(&self.redirects);
            let in_flight = Arc::clone(&self.expiry_in_flight);
            let from = current_path.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(REDIRECT_DEFER_MS)).await;
                redirects.schedule(LoginRedirect {
                    from,
                    message: Some(SESSION_EXPIRED_MESSAGE.to_string()),
                });
                // 跳转已排定，放开闸门，之后的过期事件可再次触发
                in_flight.store(false, Ordering::SeqCst);
            });
        }
        ApiResponse::session_expired()
    }
}

/// 上游消息体按 JSON 解析；不是 JSON 的原文以字符串值带回，不丢内容
fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
