use crate::rbac::{Module, Role};
use serde::Serialize;

/// 侧栏菜单项。仅供展示：菜单可见性不构成授权依据，
/// 每次导航仍由门禁按模块重新判定。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: &'static str,
    pub path: &'static str,
    pub module: Module,
    pub icon: &'static str,
    #[serde(skip)]
    pub roles: &'static [Role],
}

/// 固定顺序的菜单总表
pub const MENU_ITEMS: [MenuItem; 8] = [
    MenuItem {
        name: "Dashboard",
        path: "/admin/dashboard",
        module: Module::Dashboard,
        icon: "Activity",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
    MenuItem {
        name: "Patients",
        path: "/admin/patients",
        module: Module::Patients,
        icon: "Users",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
    MenuItem {
        name: "Doctors",
        path: "/admin/doctors",
        module: Module::Doctors,
        icon: "UserCheck",
        roles: &[Role::Admin, Role::Secretary],
    },
    MenuItem {
        name: "Appointments",
        path: "/admin/appointments",
        module: Module::Appointments,
        icon: "Calendar",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
    MenuItem {
        name: "Prescriptions",
        path: "/admin/prescriptions",
        module: Module::Prescriptions,
        icon: "FileText",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
    MenuItem {
        name: "Medicines",
        path: "/admin/medicines",
        module: Module::Medicines,
        icon: "Pill",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
    MenuItem {
        name: "Billing & BMI",
        path: "/admin/billing",
        module: Module::Billing,
        icon: "DollarSign",
        roles: &[Role::Admin, Role::Secretary],
    },
    MenuItem {
        name: "Activity",
        path: "/admin/activity",
        module: Module::Activity,
        icon: "History",
        roles: &[Role::Admin, Role::Doctor, Role::Secretary],
    },
];

/// 角色可见的菜单项，保持总表顺序
pub fn menu_for_role(role: Role) -> Vec<&'static MenuItem> {
    MENU_ITEMS.iter().filter(|item| item.roles.contains(&role)).collect()
}
