use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// 登录账号的访问等级，由认证服务在登录时下发，之后不可变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    Secretary,
}

/// 控制台功能模块，权限判定的粒度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Module {
    Dashboard,
    Profile,
    Patients,
    Doctors,
    Appointments,
    Prescriptions,
    Medicines,
    Billing,
    Activity,
    Settings,
}

/// 模块内的具体操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

/// 模块权限项：要么整个模块一个开关，要么按操作细分
#[derive(Debug, Clone, Copy)]
pub enum PermissionEntry {
    /// 粗粒度：任何操作都取该布尔值
    All(bool),
    /// 细粒度：按操作查表
    Actions(ActionSet),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSet {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
}

impl ActionSet {
    pub const fn new(view: bool, create: bool, edit: bool, delete: bool) -> Self {
        Self { view, create, edit, delete }
    }

    /// 仅查看
    pub const fn view_only() -> Self {
        Self::new(true, false, false, false)
    }

    /// 全部操作
    pub const fn full() -> Self {
        Self::new(true, true, true, true)
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
        }
    }
}

/// 角色权限总表，启动时构建一次，之后只读。
/// 表是稀疏的：角色表中缺失的模块一律视为无权限，绝不报错。
static PERMISSIONS: Lazy<HashMap<Role, HashMap<Module, PermissionEntry>>> = Lazy::new(|| {
    use Module::*;
    use PermissionEntry::{Actions, All};

    let mut table = HashMap::new();

    // 管理员：全模块全操作
    table.insert(
        Role::Admin,
        HashMap::from([
            (Dashboard, All(true)),
            (Patients, Actions(ActionSet::full())),
            (Doctors, Actions(ActionSet::full())),
            (Appointments, Actions(ActionSet::full())),
            (Prescriptions, Actions(ActionSet::full())),
            (Medicines, Actions(ActionSet::full())),
            (Billing, Actions(ActionSet::full())),
            (Activity, Actions(ActionSet::view_only())),
            (Settings, Actions(ActionSet::new(true, false, true, false))),
        ]),
    );

    // 医生：管理自己的患者/预约/处方，医生名册与计费不可见
    table.insert(
        Role::Doctor,
        HashMap::from([
            (Dashboard, All(true)),
            (Patients, Actions(ActionSet::new(true, true, true, false))),
            (Appointments, Actions(ActionSet::new(true, true, true, false))),
            (Prescriptions, Actions(ActionSet::new(true, true, true, false))),
            (Medicines, Actions(ActionSet::view_only())),
            (Activity, Actions(ActionSet::view_only())),
            (Settings, Actions(ActionSet::view_only())),
        ]),
    );

    // 秘书：行政管理，处方只读，无系统设置
    table.insert(
        Role::Secretary,
        HashMap::from([
            (Dashboard, All(true)),
            (Patients, Actions(ActionSet::new(true, true, true, false))),
            (Doctors, Actions(ActionSet::view_only())),
            (Appointments, Actions(ActionSet::full())),
            (Prescriptions, Actions(ActionSet::view_only())),
            (Medicines, Actions(ActionSet::view_only())),
            (Billing, Actions(ActionSet::new(true, true, true, false))),
            (Activity, Actions(ActionSet::view_only())),
        ]),
    );

    table
});

/// 判断角色能否在某模块执行某操作。
/// 任何缺失（无角色、模块不在表中）都视为拒绝，安全门禁必须失败即关闭。
pub fn has_permission(role: Option<Role>, module: Module, action: Action) -> bool {
    let Some(role) = role else {
        return false;
    };
    let Some(entry) = PERMISSIONS.get(&role).and_then(|perms| perms.get(&module)) else {
        return false;
    };
    match entry {
        PermissionEntry::All(allowed) => *allowed,
        PermissionEntry::Actions(actions) => actions.allows(action),
    }
}

/// 查看权限（缺省操作）
pub fn can_view(role: Option<Role>, module: Module) -> bool {
    has_permission(role, module, Action::View)
}

/// 字符串形式的权限判断，解析失败一律拒绝。
/// 处理会话记录、前端参数等未定型输入时使用。
pub fn has_permission_codes(role: Option<&str>, module: &str, action: &str) -> bool {
    let Some(role) = role.and_then(|code| Role::from_str(code).ok()) else {
        return false;
    };
    let Ok(module) = Module::from_str(module) else {
        return false;
    };
    let Ok(action) = Action::from_str(action) else {
        return false;
    };
    has_permission(Some(role), module, action)
}

/// 角色可见的模块列表（view 权限）
pub fn accessible_modules(role: Role) -> Vec<Module> {
    Module::iter().filter(|module| can_view(Some(role), *module)).collect()
}
