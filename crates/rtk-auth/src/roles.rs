//! Tolerant admin detection over arbitrary identity-provider payloads.
//!
//! Providers disagree wildly about where roles live and what shape they
//! take. Direct boolean flags (`is_admin`/`isAdmin`) take priority over role
//! matching; when present (on the user object first, then the top level) the
//! flag's value is final. Otherwise roles come from the first present of
//! `roles`/`role`/`groups`/`authorities` on the user, then the top level;
//! that field alone decides, even when a later field would match. A role
//! value may be a plain string, a list, or a nested object carrying one of
//! `name`/`role`/`slug`/`code`/`value`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

const FLAG_KEYS: [&str; 2] = ["is_admin", "isAdmin"];
const ROLE_KEYS: [&str; 4] = ["roles", "role", "groups", "authorities"];
const NAME_KEYS: [&str; 5] = ["name", "role", "slug", "code", "value"];

/// The shapes a role-bearing field can take.
#[derive(Debug)]
pub enum RoleInput<'a> {
    Scalar(&'a str),
    Sequence(&'a [Value]),
    KeyedObject(&'a Map<String, Value>),
    /// Numbers, booleans, nulls: carry no role information.
    Opaque,
}

impl<'a> From<&'a Value> for RoleInput<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items),
            Value::Object(map) => Self::KeyedObject(map),
            _ => Self::Opaque,
        }
    }
}

impl RoleInput<'_> {
    /// Flatten to the set of canonical role names.
    #[must_use]
    pub fn canonical_roles(&self) -> BTreeSet<String> {
        let mut roles = BTreeSet::new();
        self.collect_into(&mut roles);
        roles
    }

    fn collect_into(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Scalar(s) => {
                out.insert(normalize_role(s));
            }
            Self::Sequence(items) => {
                for item in *items {
                    Self::from(item).collect_into(out);
                }
            }
            Self::KeyedObject(map) => {
                for key in NAME_KEYS {
                    if let Some(value) = map.get(key) {
                        Self::from(value).collect_into(out);
                        break;
                    }
                }
            }
            Self::Opaque => {}
        }
    }
}

/// Lowercase, trim, and convert underscores to hyphens.
fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase().replace('_', "-")
}

fn is_admin_role(role: &str) -> bool {
    matches!(role, "admin" | "administrator" | "super-admin" | "superadmin")
        || role.ends_with("-admin")
        || role.ends_with(":admin")
}

/// Decide admin-ness from a full `/auth/status/` payload.
#[must_use]
pub fn is_admin(payload: &Value) -> bool {
    let user = payload.get("user");
    let scopes = [user, Some(payload)];

    for scope in scopes.into_iter().flatten() {
        for key in FLAG_KEYS {
            if let Some(flag) = scope.get(key).and_then(Value::as_bool) {
                return flag;
            }
        }
    }

    // First role-bearing field present (user scope first) is the sole role
    // source; later fields are never consulted.
    for scope in scopes.into_iter().flatten() {
        for key in ROLE_KEYS {
            if let Some(value) = scope.get(key) {
                return RoleInput::from(value)
                    .canonical_roles()
                    .iter()
                    .any(|role| is_admin_role(role));
            }
        }
    }

    false
}
