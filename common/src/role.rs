//! Account roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The three account roles the backend issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }

    /// Where the route guard sends a role that may not see the requested page.
    ///
    /// Super Admins have no dedicated fallback and are sent back to login.
    pub fn redirect_home(self) -> &'static str {
        match self {
            Role::User => "/userDB",
            Role::Admin => "/adminDB",
            Role::SuperAdmin => "/login",
        }
    }

    /// First page shown after a successful login.
    pub fn landing(self) -> &'static str {
        match self {
            Role::User => "/userDB",
            Role::Admin => "/adminDB",
            Role::SuperAdmin => "/superadminDB",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            "Super Admin" => Ok(Role::SuperAdmin),
            other => Err(Error::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert_eq!("Super Admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("superadmin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"Super Admin\"");
        let back: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }

    #[test]
    fn test_redirect_home() {
        assert_eq!(Role::User.redirect_home(), "/userDB");
        assert_eq!(Role::Admin.redirect_home(), "/adminDB");
        assert_eq!(Role::SuperAdmin.redirect_home(), "/login");
    }
}
