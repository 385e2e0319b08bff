/// Process-local session fields, written by the login flow and by token
/// hydration. Not wire-visible; the client only holds the session id cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub logged_in: bool,
    pub username: String,
    pub role: String,
    pub member_id: i64,
    pub company_id: Option<i64>,
}

impl SessionState {
    pub fn authenticated(
        username: impl Into<String>,
        role: impl Into<String>,
        member_id: i64,
        company_id: Option<i64>,
    ) -> Self {
        Self {
            logged_in: true,
            username: username.into(),
            role: role.into(),
            member_id,
            company_id,
        }
    }

    /// A session only counts as authenticated when the logged-in flag is set
    /// and a username is present
    pub fn is_authenticated(&self) -> bool {
        self.logged_in && !self.username.is_empty()
    }
}
