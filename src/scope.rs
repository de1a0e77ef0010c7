use crate::schema::{TenantId, TenantOwned};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The set of tenants an aggregation runs over. Ordered, so iteration is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    tenants: BTreeSet<TenantId>,
}

impl TenantScope {
    pub fn single(tenant: impl Into<TenantId>) -> Self {
        Self {
            tenants: BTreeSet::from([tenant.into()]),
        }
    }

    pub fn many<I, T>(tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        Self {
            tenants: tenants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, tenant: &str) -> bool {
        self.tenants.contains(tenant)
    }

    pub fn owns<R: TenantOwned + ?Sized>(&self, record: &R) -> bool {
        self.contains(record.owner_id())
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TenantId> {
        self.tenants.iter()
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.tenants.iter().map(String::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl From<TenantId> for TenantScope {
    fn from(tenant: TenantId) -> Self {
        Self::single(tenant)
    }
}

impl From<&str> for TenantScope {
    fn from(tenant: &str) -> Self {
        Self::single(tenant)
    }
}

impl From<Vec<TenantId>> for TenantScope {
    fn from(tenants: Vec<TenantId>) -> Self {
        Self::many(tenants)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Owner,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub role: Role,
    /// Owners: their own tenant id. Staff: the tenant that employs them.
    pub tenant_id: Option<TenantId>,
}

/// Decides which tenants a user may see in reports.
pub trait ScopeResolver {
    fn resolve_scope(&self, user: &UserContext) -> TenantScope;
}

/// Admins see every known tenant; owners and staff see the tenant they belong to.
#[derive(Debug, Clone, Default)]
pub struct RoleScopeResolver {
    known_tenants: BTreeSet<TenantId>,
}

impl RoleScopeResolver {
    pub fn new<I, T>(known_tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        Self {
            known_tenants: known_tenants.into_iter().map(Into::into).collect(),
        }
    }
}

impl ScopeResolver for RoleScopeResolver {
    fn resolve_scope(&self, user: &UserContext) -> TenantScope {
        match user.role {
            Role::Admin => TenantScope::many(self.known_tenants.iter().cloned()),
            Role::Owner | Role::Staff => user
                .tenant_id
                .clone()
                .map(TenantScope::single)
                .unwrap_or_default(),
        }
    }
}
