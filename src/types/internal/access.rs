use std::collections::HashSet;

/// Effective authorization sets computed for one user.
///
/// Sets, not sequences: no ordering is guaranteed among the unioned names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessProfile {
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
    pub capabilities: HashSet<String>,
}

impl AccessProfile {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty() && self.capabilities.is_empty()
    }
}

/// Declarative requirement attached to a protected operation at registration
/// time. An empty set means "no restriction on this axis".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessRequirement {
    pub required_roles: HashSet<String>,
    pub required_capabilities: HashSet<String>,
}

impl AccessRequirement {
    /// Authenticated access with no role or capability restriction
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn roles<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_roles: names.into_iter().map(Into::into).collect(),
            required_capabilities: HashSet::new(),
        }
    }

    pub fn capabilities<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_roles: HashSet::new(),
            required_capabilities: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and_capabilities<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities
            .extend(names.into_iter().map(Into::into));
        self
    }
}

/// Why a gate check rejected the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotAuthenticated,
    MissingRole,
    MissingCapability,
    DependencyUnavailable,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::MissingRole => "missing_role",
            Self::MissingCapability => "missing_capability",
            Self::DependencyUnavailable => "dependency_unavailable",
        }
    }
}

/// Outcome of a gate check for one request
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allowed { username: String, member_id: i64 },
    Denied { reason: DenialReason, redirect_to: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}
