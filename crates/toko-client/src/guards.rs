//! # Route Guards
//!
//! Navigation gating on authentication and role membership.
//!
//! Each admin route carries a static role allowlist; the check is plain
//! set membership against the signed-in user's role. Guards lazily run
//! `check_auth` so a cold start hydrates the session before the first
//! routing decision.
//!
//! ## Redirect Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  unauthenticated ─────────────► /login?redirect=<intended>      │
//! │  customer on /admin/* ────────► /            (home)             │
//! │  staff on a route they lack ──► /admin/dashboard                │
//! │  authenticated on guest page ─► home or dashboard by role       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::debug;

use toko_core::Role;

use crate::notify::Notifier;
use crate::stores::auth::AuthStore;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied { redirect: String },
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// Static allowlists for admin routes. Longest-prefix lookup; the bare
/// `/admin` entry is the staff-wide catch-all for routes not listed.
const ADMIN_ROUTES: &[(&str, &[Role])] = &[
    ("/admin/dashboard", &[Role::Admin, Role::Editor, Role::Moderator]),
    ("/admin/users", &[Role::Admin]),
    ("/admin/products", &[Role::Admin, Role::Editor]),
    ("/admin/categories", &[Role::Admin, Role::Editor]),
    ("/admin/transactions", &[Role::Admin, Role::Moderator]),
    ("/admin/audit", &[Role::Admin, Role::Moderator]),
    ("/admin/storage", &[Role::Admin, Role::Editor]),
    ("/admin/analytics", &[Role::Admin]),
    ("/admin/settings", &[Role::Admin]),
    ("/admin", &[Role::Admin, Role::Editor, Role::Moderator]),
];

/// True when `path` is `prefix` or a sub-path of it.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'?'))
}

/// Roles allowed on `path`, if it is governed by the admin table.
fn allowed_roles(path: &str) -> Option<&'static [Role]> {
    let mut best: Option<(&str, &'static [Role])> = None;
    for &(prefix, roles) in ADMIN_ROUTES {
        if matches_prefix(path, prefix) {
            match best {
                Some((current, _)) if current.len() >= prefix.len() => {}
                _ => best = Some((prefix, roles)),
            }
        }
    }
    best.map(|(_, roles)| roles)
}

pub struct Guard {
    auth: Arc<AuthStore>,
    notifier: Notifier,
}

impl Guard {
    pub fn new(auth: Arc<AuthStore>, notifier: Notifier) -> Self {
        Guard { auth, notifier }
    }

    async fn ensure_initialized(&self) {
        if !self.auth.is_initialized().await {
            self.auth.check_auth().await;
        }
    }

    fn login_redirect(to: &str) -> Access {
        Access::Denied {
            redirect: format!("/login?redirect={}", to),
        }
    }

    /// Where a denied user lands: customers go home, staff go to the
    /// dashboard they are allowed into.
    fn role_redirect(role: Role) -> Access {
        let redirect = if role == Role::Customer {
            "/".to_string()
        } else {
            "/admin/dashboard".to_string()
        };
        Access::Denied { redirect }
    }

    /// Requires any authenticated user.
    pub async fn require_auth(&self, to: &str) -> Access {
        self.ensure_initialized().await;

        if !self.auth.is_authenticated().await {
            self.notifier.error("Please log in to access this page");
            return Self::login_redirect(to);
        }

        Access::Granted
    }

    /// Requires authentication plus membership in the route's allowlist.
    /// Routes outside the admin table only need authentication.
    pub async fn require_role(&self, to: &str) -> Access {
        self.ensure_initialized().await;

        let authenticated = self.auth.is_authenticated().await;
        let user = match self.auth.user().await {
            Some(user) if authenticated => user,
            _ => {
                self.notifier.error("Please log in to access this page");
                return Self::login_redirect(to);
            }
        };

        if let Some(roles) = allowed_roles(to) {
            if !roles.contains(&user.role) {
                debug!(role = %user.role, to, "role denied");
                self.notifier
                    .error("You do not have permission to access this page");
                return Self::role_redirect(user.role);
            }
        }

        Access::Granted
    }

    /// Requires at least one of the listed permissions.
    pub async fn require_permission(&self, to: &str, permissions: &[&str]) -> Access {
        self.ensure_initialized().await;

        let authenticated = self.auth.is_authenticated().await;
        let user = match self.auth.user().await {
            Some(user) if authenticated => user,
            _ => {
                self.notifier.error("Please log in to access this page");
                return Self::login_redirect(to);
            }
        };

        let granted = permissions
            .iter()
            .any(|p| user.permissions.iter().any(|held| held == p));

        if !granted {
            self.notifier
                .error("You do not have permission to access this page");
            return Self::role_redirect(user.role);
        }

        Access::Granted
    }

    /// Guest-only pages (login, register) bounce authenticated users to
    /// their landing page by role.
    pub async fn guest_only(&self) -> Access {
        self.ensure_initialized().await;

        if self.auth.is_authenticated().await {
            if let Some(user) = self.auth.user().await {
                let redirect = if user.role.is_staff() {
                    "/admin/dashboard".to_string()
                } else {
                    "/".to_string()
                };
                return Access::Denied { redirect };
            }
        }

        Access::Granted
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionCache};
    use crate::testing::{fixtures, MockTransport};
    use serde_json::json;

    async fn guard_for(role: Option<&str>) -> Guard {
        let mock = MockTransport::new();
        let session = SessionCache::in_memory();

        if let Some(role) = role {
            mock.on(
                "GET",
                "/user",
                Ok(json!({"data": {"user": fixtures::user_json(1, role)}})),
            );
            session
                .store(&Session {
                    token: "tok".to_string(),
                    user: None,
                })
                .unwrap();
        }

        let auth = AuthStore::new(mock, session);
        Guard::new(auth, Notifier::new())
    }

    async fn guard_with_permissions(permissions: &[&str]) -> Guard {
        let mock = MockTransport::new();
        let mut user = fixtures::user_json(1, "editor");
        user["permissions"] = json!(permissions);
        mock.on("GET", "/user", Ok(json!({"data": {"user": user}})));

        let session = SessionCache::in_memory();
        session
            .store(&Session {
                token: "tok".to_string(),
                user: None,
            })
            .unwrap();

        let auth = AuthStore::new(mock, session);
        Guard::new(auth, Notifier::new())
    }

    #[tokio::test]
    async fn test_unauthenticated_redirects_to_login() {
        let guard = guard_for(None).await;

        let access = guard.require_auth("/orders").await;
        assert_eq!(
            access,
            Access::Denied {
                redirect: "/login?redirect=/orders".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_customer_denied_all_admin_routes() {
        let guard = guard_for(Some("customer")).await;

        for route in [
            "/admin",
            "/admin/dashboard",
            "/admin/users",
            "/admin/products",
            "/admin/transactions/5",
            "/admin/analytics",
        ] {
            let access = guard.require_role(route).await;
            assert_eq!(
                access,
                Access::Denied {
                    redirect: "/".to_string()
                },
                "customer must be bounced home from {}",
                route
            );
        }
    }

    #[tokio::test]
    async fn test_admin_allowed_everywhere() {
        let guard = guard_for(Some("admin")).await;

        for route in [
            "/admin",
            "/admin/dashboard",
            "/admin/users",
            "/admin/products",
            "/admin/categories",
            "/admin/transactions",
            "/admin/transactions/5",
            "/admin/audit",
            "/admin/storage",
            "/admin/analytics",
            "/admin/settings",
        ] {
            assert!(
                guard.require_role(route).await.is_granted(),
                "admin must be allowed on {}",
                route
            );
        }
    }

    #[tokio::test]
    async fn test_editor_allowed_only_on_editor_routes() {
        let guard = guard_for(Some("editor")).await;

        for route in ["/admin/dashboard", "/admin/products", "/admin/categories", "/admin/storage"]
        {
            assert!(
                guard.require_role(route).await.is_granted(),
                "editor must be allowed on {}",
                route
            );
        }

        for route in ["/admin/users", "/admin/transactions", "/admin/audit", "/admin/analytics"] {
            let access = guard.require_role(route).await;
            assert_eq!(
                access,
                Access::Denied {
                    redirect: "/admin/dashboard".to_string()
                },
                "editor must be bounced to the dashboard from {}",
                route
            );
        }
    }

    #[tokio::test]
    async fn test_moderator_transaction_routes() {
        let guard = guard_for(Some("moderator")).await;

        assert!(guard.require_role("/admin/transactions").await.is_granted());
        assert!(guard.require_role("/admin/audit").await.is_granted());
        assert!(!guard.require_role("/admin/products").await.is_granted());
    }

    #[tokio::test]
    async fn test_non_admin_routes_only_need_auth() {
        let guard = guard_for(Some("customer")).await;
        assert!(guard.require_role("/orders").await.is_granted());
    }

    #[tokio::test]
    async fn test_prefix_matching_does_not_bleed() {
        // "/admin/auditors" is not "/admin/audit"; it falls back to the
        // staff-wide "/admin" entry, which an editor does hold.
        let guard = guard_for(Some("editor")).await;
        assert!(guard.require_role("/admin/auditors").await.is_granted());
    }

    #[tokio::test]
    async fn test_guest_only_bounces_by_role() {
        let staff = guard_for(Some("admin")).await;
        assert_eq!(
            staff.guest_only().await,
            Access::Denied {
                redirect: "/admin/dashboard".to_string()
            }
        );

        let customer = guard_for(Some("customer")).await;
        assert_eq!(
            customer.guest_only().await,
            Access::Denied {
                redirect: "/".to_string()
            }
        );

        let guest = guard_for(None).await;
        assert!(guest.guest_only().await.is_granted());
    }

    #[tokio::test]
    async fn test_permission_guard_any_of() {
        let guard = guard_with_permissions(&["products.write"]).await;
        assert!(guard
            .require_permission("/admin/products", &["products.write", "products.admin"])
            .await
            .is_granted());

        let guard = guard_with_permissions(&[]).await;
        assert!(!guard
            .require_permission("/admin/products", &["products.write"])
            .await
            .is_granted());
    }
}
