use config::Config;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub backend: Option<BackendConfig>,
    pub session: Option<SessionConfig>,
    pub sys: Option<SysConfig>,
}

impl AppConfig {
    pub fn new(file: &str) -> Self {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").separator("_"))
            .build()
            .expect("Failed to build configuration");
        let cfg = config.try_deserialize::<AppConfig>().expect("Failed to deserialize configuration");
        return cfg;
    }

    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_backend(&self) -> BackendConfig {
        self.backend.clone().unwrap_or_default()
    }
    pub fn get_session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 后端微服务地址（患者、医生、预约等 REST 服务统一网关）
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    /// REST 微服务基础地址，例如 http://localhost:5001/api
    pub base_url: String,
    /// 认证服务登录地址
    pub auth_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// 会话持久化文件路径（相当于浏览器 localStorage 的 adminUser 键）
    pub storage_path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
}
