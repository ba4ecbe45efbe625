use common::config::AppConfig;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self { config: AppConfig::new("main-config.toml") }
    }
}

pub fn result_error_msg(msg: impl Into<String>) -> Value {
    serde_json::json!({"success":false,"msg":msg.into()})
}

#[derive(Serialize, ToSchema)]
pub struct ResultResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}
impl<T: Serialize> ResultResponse<T> {
    /// 成功响应，带数据
    pub fn ok(data: T) -> Self {
        ResultResponse {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// 成功响应，自定义消息 + 可选数据
    pub fn ok_msg(message: impl Into<String>, data: Option<T>) -> Self {
        ResultResponse {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    /// 失败响应，附带错误消息
    pub fn err(message: impl Into<String>) -> Self {
        ResultResponse {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
