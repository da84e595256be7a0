//! Requester context resolved by the org-context middleware.

/// Identity attached to an in-flight request after bearer-token validation.
///
/// `role` is `None` when the token's user holds no membership in the
/// token's organization; endpoints that require a role enforce it
/// themselves. Downstream handlers read this from request extensions,
/// never from headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequesterContext {
    pub user_id: String,
    pub org_id: String,
    pub role: Option<String>,
}

impl RequesterContext {
    pub fn new(user_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: org_id.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}
