use crate::rbac::Role;
use common::util::date_util::now;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 会话记录结构版本号，升级存储格式时递增
pub const SESSION_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SESSION_SCHEMA_VERSION
}

/// 已登录账号的会话记录，登录成功后落盘保存，启动时读回。
/// role 是强类型：存储记录中出现未知角色码会导致反序列化失败，
/// 由会话仓库按损坏记录清除，绝不会放行一个无法识别的角色。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    /// 记录格式版本（上游未定义，防御性添加）
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// 访问等级，登录后不可变
    pub role: Role,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// 认证服务签发的访问令牌，转发后端请求时附带
    #[serde(default)]
    pub access_token: Option<String>,
    /// 登录时间（Unix 时间戳，秒）
    #[serde(default)]
    pub login_time: i64,
}

impl UserSession {
    pub fn new(role: Role, username: impl Into<String>) -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            role,
            username: username.into(),
            display_name: None,
            email: None,
            access_token: None,
            login_time: now(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_builder() {
        let session = UserSession::new(Role::Admin, "alice")
            .with_display_name("Alice Martin")
            .with_access_token("tok-1");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.username, "alice");
        assert_eq!(session.display_name.as_deref(), Some("Alice Martin"));
        assert_eq!(session.schema_version, SESSION_SCHEMA_VERSION);
    }

    #[test]
    fn test_unknown_role_fails_deserialize() {
        let raw = r#"{"role":"superuser","username":"mallory"}"#;
        assert!(serde_json::from_str::<UserSession>(raw).is_err());
    }

    #[test]
    fn test_legacy_record_without_version() {
        // 老格式没有版本字段，读回时默认为当前版本
        let raw = r#"{"role":"secretary","username":"carol"}"#;
        let session: UserSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.schema_version, SESSION_SCHEMA_VERSION);
        assert_eq!(session.role, Role::Secretary);
    }
}
