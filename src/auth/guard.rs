use crate::auth::{AuthContext, Role};

/// A pure authorization predicate attached to a route.
///
/// Guards are data: a closed set of variants resolved at registration time.
/// Evaluation has no side effects and reads nothing but the already-decoded
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Any valid credential passes.
    Authenticated,
    /// Requires a credential whose role is at least the given threshold.
    RoleAtLeast(Role),
}

impl Guard {
    pub fn authorize(&self, ctx: &AuthContext) -> bool {
        match self {
            Guard::Authenticated => ctx.credentials().is_some(),
            Guard::RoleAtLeast(min) => ctx
                .credentials()
                .map_or(false, |credentials| credentials.role >= *min),
        }
    }

    /// The name carried by access-denied errors.
    pub fn name(&self) -> String {
        match self {
            Guard::Authenticated => "Authenticated".to_string(),
            Guard::RoleAtLeast(role) => format!("RoleAtLeast({role:?})"),
        }
    }
}
