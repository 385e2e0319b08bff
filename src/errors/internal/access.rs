use thiserror::Error;

/// Domain errors for role/permission/capability administration
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

impl AccessError {
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: i64) -> Self {
        Self::NotFound { kind, id }
    }
}
