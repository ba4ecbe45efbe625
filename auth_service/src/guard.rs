use crate::rbac::{can_view, Module};
use crate::session::SessionStore;
use serde::Serialize;
use std::sync::Mutex;
use utoipa::ToSchema;

/// 登录入口路径
pub const LOGIN_PATH: &str = "/admin/login";

/// 路径关键字到模块的有序规则表，自上而下先命中者生效。
/// 顺序是行为契约的一部分：同时含多个关键字的路径归属先测到的模块。
const MODULE_ROUTE_RULES: [(&str, Module); 7] = [
    ("patients", Module::Patients),
    ("doctors", Module::Doctors),
    ("appointments", Module::Appointments),
    ("prescriptions", Module::Prescriptions),
    ("medicines", Module::Medicines),
    ("billing", Module::Billing),
    ("activity", Module::Activity),
];

/// 按关键字子串解析路径所属模块，无命中归入 dashboard
pub fn resolve_module(path: &str) -> Module {
    for (keyword, module) in MODULE_ROUTE_RULES {
        if path.contains(keyword) {
            return module;
        }
    }
    Module::Dashboard
}

/// 路由门禁的三种判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 未登录：跳转登录页，原始路径随导航状态携带以便登录后回放
    RedirectToLogin { from: String },
    /// 已登录但无该模块查看权限：终态拒绝，只提供"返回上一页"
    AccessDenied,
    /// 放行，后续业务检查由页面自己负责
    Authorized,
}

/// 对一次导航做门禁判定。只检查 view 权限，细粒度操作检查在页面层。
pub fn evaluate(store: &SessionStore, path: &str) -> GuardDecision {
    let Some(session) = store.current() else {
        return GuardDecision::RedirectToLogin { from: path.to_string() };
    };
    let module = resolve_module(path);
    if !can_view(Some(session.role), module) {
        return GuardDecision::AccessDenied;
    }
    GuardDecision::Authorized
}

/// 登录页要接收的导航状态：来源路径 + 可选提示消息。
/// 以状态而非 URL 参数传递，避免目标路径泄漏到浏览器历史。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRedirect {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// 待处理登录跳转的注入式插槽。
/// 门禁与会话过期拦截器写入，登录页处理器取走。
#[derive(Debug, Default)]
pub struct RedirectState {
    pending: Mutex<Option<LoginRedirect>>,
}

impl RedirectState {
    pub fn schedule(&self, redirect: LoginRedirect) {
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(redirect);
        }
    }

    /// 取走并清空待处理跳转
    pub fn take(&self) -> Option<LoginRedirect> {
        self.pending.lock().ok()?.take()
    }

    /// 只读查看，不清空。登录页展示提示消息用，回放路径留给登录成功时取走。
    pub fn peek(&self) -> Option<LoginRedirect> {
        self.pending.lock().ok()?.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::user_entity::UserSession;
    use crate::rbac::Role;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, session: Option<UserSession>) -> SessionStore {
        let store = SessionStore::load(dir.path().join("admin_user.json"));
        if let Some(session) = session {
            store.set_session(session).unwrap();
        }
        store
    }

    #[test]
    fn test_resolve_module_keywords() {
        assert_eq!(resolve_module("/admin/patients"), Module::Patients);
        assert_eq!(resolve_module("/admin/billing"), Module::Billing);
        assert_eq!(resolve_module("/admin/dashboard"), Module::Dashboard);
        // 无命中默认 dashboard
        assert_eq!(resolve_module("/admin/profile"), Module::Dashboard);
    }

    #[test]
    fn test_resolve_module_first_match_wins() {
        // 同时含 patients 与 billing，patients 规则在前
        assert_eq!(resolve_module("/admin/patients/billing-summary"), Module::Patients);
        // doctors 在 appointments 之前
        assert_eq!(resolve_module("/admin/doctors/appointments"), Module::Doctors);
    }

    #[test]
    fn test_no_session_redirects_with_origin() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, None);
        assert_eq!(
            evaluate(&store, "/admin/patients"),
            GuardDecision::RedirectToLogin { from: "/admin/patients".to_string() }
        );
    }

    #[test]
    fn test_doctor_denied_on_doctor_roster() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, Some(UserSession::new(Role::Doctor, "bob")));
        assert_eq!(evaluate(&store, "/admin/doctors"), GuardDecision::AccessDenied);
        // 其它模块照常放行
        assert_eq!(evaluate(&store, "/admin/patients"), GuardDecision::Authorized);
    }

    #[test]
    fn test_admin_authorized_on_billing() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, Some(UserSession::new(Role::Admin, "alice")));
        assert_eq!(evaluate(&store, "/admin/billing"), GuardDecision::Authorized);
    }

    #[test]
    fn test_redirect_state_take_clears() {
        let state = RedirectState::default();
        assert!(state.take().is_none());
        state.schedule(LoginRedirect { from: "/admin/patients".into(), message: None });
        // peek 不清空，take 之后才清空
        assert_eq!(state.peek().unwrap().from, "/admin/patients");
        assert_eq!(state.take().unwrap().from, "/admin/patients");
        assert!(state.peek().is_none());
        assert!(state.take().is_none());
    }
}
