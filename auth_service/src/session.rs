use crate::entitys::user_entity::UserSession;
use crate::rbac::Role;
use anyhow::Result;
use arc_swap::ArcSwapOption;
use common::util::date_util::time_to_str;
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// 当前登录身份的唯一权威来源。
///
/// 会话以单条 JSON 记录落盘（相当于浏览器 localStorage 的固定键），
/// 进程启动时读回一次。内部用 ArcSwapOption 保存当前会话，
/// 拦截器在异步上下文里调用 logout 也不会与 set_session 产生数据竞争。
#[derive(Debug)]
pub struct SessionStore {
    storage_path: PathBuf,
    current: ArcSwapOption<UserSession>,
}

impl SessionStore {
    /// 从持久化记录恢复会话。文件不存在视为未登录；
    /// 记录损坏（JSON 解析失败或未知角色码）则记日志、删除损坏文件，
    /// 同样按未登录处理，绝不让坏数据拖垮启动。
    pub fn load(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let current = match fs::read_to_string(&storage_path) {
            Ok(raw) => match serde_json::from_str::<UserSession>(&raw) {
                Ok(session) => {
                    info!(
                        "恢复会话: {} ({}), 登录于 {}",
                        session.username,
                        session.role,
                        time_to_str(session.login_time)
                    );
                    Some(Arc::new(session))
                }
                Err(e) => {
                    error!("会话记录损坏，清除后按未登录处理: {}", e);
                    let _ = fs::remove_file(&storage_path);
                    None
                }
            },
            Err(_) => None,
        };
        Self { storage_path, current: ArcSwapOption::from(current) }
    }

    /// 当前会话快照
    pub fn current(&self) -> Option<Arc<UserSession>> {
        self.current.load_full()
    }

    pub fn role(&self) -> Option<Role> {
        self.current().map(|session| session.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// 登录成功后写入会话：先落盘再切换内存态
    pub fn set_session(&self, session: UserSession) -> Result<()> {
        let raw = serde_json::to_string(&session)?;
        if let Some(dir) = self.storage_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.storage_path, raw)?;
        self.current.store(Some(Arc::new(session)));
        Ok(())
    }

    /// 退出登录：清内存态并删除持久化记录。
    /// 幂等，已是未登录时再调用只是空操作。
    pub fn logout(&self) {
        self.current.store(None);
        if self.storage_path.exists() {
            if let Err(e) = fs::remove_file(&self.storage_path) {
                error!("删除会话记录失败: {}", e);
            }
        }
    }
}
