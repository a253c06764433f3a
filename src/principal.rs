use crate::error::{Error, Result};
use crate::types::UserId;
use std::fmt;

/// Acting identity for a single request.
///
/// A principal is a snapshot taken at the request boundary and never changes
/// while the request is evaluated. Anonymous principals carry no id and no
/// role flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PrincipalRepr"))]
pub struct Principal {
    id: Option<UserId>,
    is_staff: bool,
    is_superuser: bool,
    is_active: bool,
}

impl Principal {
    /// Builds a principal from raw flags, enforcing the role invariants.
    ///
    /// `is_superuser` requires `is_staff`, and an anonymous principal
    /// (`id == None`) must not carry any flag.
    pub fn new(
        id: Option<UserId>,
        is_staff: bool,
        is_superuser: bool,
        is_active: bool,
    ) -> Result<Self> {
        if is_superuser && !is_staff {
            return Err(Error::InvalidPrincipal(
                "superuser must also be staff".to_string(),
            ));
        }
        if id.is_none() && (is_staff || is_active) {
            return Err(Error::InvalidPrincipal(
                "anonymous principal cannot carry role flags".to_string(),
            ));
        }
        Ok(Self {
            id,
            is_staff,
            is_superuser,
            is_active,
        })
    }

    /// Unauthenticated caller.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            is_staff: false,
            is_superuser: false,
            is_active: false,
        }
    }

    /// Active customer account.
    pub fn user(id: UserId) -> Self {
        Self {
            id: Some(id),
            is_staff: false,
            is_superuser: false,
            is_active: true,
        }
    }

    /// Active staff account.
    pub fn staff(id: UserId) -> Self {
        Self {
            is_staff: true,
            ..Self::user(id)
        }
    }

    /// Active superuser account.
    pub fn superuser(id: UserId) -> Self {
        Self {
            is_superuser: true,
            ..Self::staff(id)
        }
    }

    /// Authenticated customer whose account has been deactivated.
    pub fn banned(id: UserId) -> Self {
        Self {
            is_active: false,
            ..Self::user(id)
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.id
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns true when this principal is the given user.
    pub fn is(&self, user: UserId) -> bool {
        self.id == Some(user)
    }
}

/// Wire shape of a [`Principal`]; decoding goes through [`Principal::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PrincipalRepr {
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    is_staff: bool,
    #[serde(default)]
    is_superuser: bool,
    #[serde(default)]
    is_active: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<PrincipalRepr> for Principal {
    type Error = Error;

    fn try_from(repr: PrincipalRepr) -> Result<Self> {
        Self::new(repr.id, repr.is_staff, repr.is_superuser, repr.is_active)
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            None => f.write_str("anonymous"),
            Some(id) if self.is_superuser => write!(f, "superuser:{id}"),
            Some(id) if self.is_staff => write!(f, "staff:{id}"),
            Some(id) => write!(f, "user:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(value: u64) -> UserId {
        UserId::new(value).unwrap()
    }

    #[test]
    fn new_should_reject_superuser_without_staff() {
        let result = Principal::new(Some(uid(1)), false, true, true);
        assert!(matches!(result, Err(Error::InvalidPrincipal(_))));
    }

    #[test]
    fn new_should_reject_flagged_anonymous() {
        let result = Principal::new(None, true, false, false);
        assert!(matches!(result, Err(Error::InvalidPrincipal(_))));
    }

    #[test]
    fn constructors_should_uphold_invariants() {
        let superuser = Principal::superuser(uid(1));
        assert!(superuser.is_staff() && superuser.is_superuser() && superuser.is_active());

        let anonymous = Principal::anonymous();
        assert!(!anonymous.is_authenticated());
        assert!(!anonymous.is_active());

        let banned = Principal::banned(uid(2));
        assert!(banned.is_authenticated());
        assert!(!banned.is_active());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_should_enforce_role_invariants() {
        let superuser = serde_json::from_str::<Principal>(
            r#"{"id":1,"is_staff":false,"is_superuser":true,"is_active":true}"#,
        );
        assert!(superuser.is_err());

        let anonymous = serde_json::from_str::<Principal>(r#"{"is_staff":true}"#);
        assert!(anonymous.is_err());

        let staff: Principal = serde_json::from_str(
            r#"{"id":3,"is_staff":true,"is_superuser":false,"is_active":true}"#,
        )
        .unwrap();
        assert_eq!(staff, Principal::staff(uid(3)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_should_round_trip_through_new() {
        let superuser = Principal::superuser(uid(4));
        let json = serde_json::to_string(&superuser).unwrap();
        assert_eq!(serde_json::from_str::<Principal>(&json).unwrap(), superuser);
    }

    #[test]
    fn display_should_name_role() {
        assert_eq!(Principal::anonymous().to_string(), "anonymous");
        assert_eq!(Principal::staff(uid(3)).to_string(), "staff:3");
    }
}
