use crate::invalidation::Invalidate;
use crate::types::{CategoryId, CommentId, LikeId, ProductId, UserId};
use std::fmt;

/// Kind of domain entity subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResourceKind {
    UserAccount,
    Product,
    Category,
    Comment,
    Like,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserAccount => "user_account",
            Self::Product => "product",
            Self::Category => "category",
            Self::Comment => "comment",
            Self::Like => "like",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference to a stored resource, before its snapshot is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum ResourceRef {
    UserAccount(UserId),
    Product(ProductId),
    Category(CategoryId),
    Comment(CommentId),
    Like(LikeId),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::UserAccount(_) => ResourceKind::UserAccount,
            Self::Product(_) => ResourceKind::Product,
            Self::Category(_) => ResourceKind::Category,
            Self::Comment(_) => ResourceKind::Comment,
            Self::Like(_) => ResourceKind::Like,
        }
    }

    /// Returns the raw numeric id.
    pub fn raw_id(&self) -> u64 {
        match *self {
            Self::UserAccount(id) => id.get(),
            Self::Product(id) => id.get(),
            Self::Category(id) => id.get(),
            Self::Comment(id) => id.get(),
            Self::Like(id) => id.get(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

/// Account snapshot; the staff flag protects staff-on-staff edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountRecord {
    pub id: UserId,
    pub is_staff: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductRecord {
    pub id: ProductId,
    pub category: Option<CategoryId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryRecord {
    pub id: CategoryId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentRecord {
    pub id: CommentId,
    pub owner: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LikeRecord {
    pub id: LikeId,
    pub owner: UserId,
}

/// Snapshot of a resource with the attributes authorization depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Resource {
    UserAccount(AccountRecord),
    Product(ProductRecord),
    Category(CategoryRecord),
    Comment(CommentRecord),
    Like(LikeRecord),
}

impl Resource {
    pub fn account(id: UserId, is_staff: bool) -> Self {
        Self::UserAccount(AccountRecord {
            id,
            is_staff,
            is_active: true,
        })
    }

    pub fn product(id: ProductId, category: Option<CategoryId>) -> Self {
        Self::Product(ProductRecord { id, category })
    }

    pub fn category(id: CategoryId) -> Self {
        Self::Category(CategoryRecord { id })
    }

    pub fn comment(id: CommentId, owner: UserId) -> Self {
        Self::Comment(CommentRecord { id, owner })
    }

    pub fn like(id: LikeId, owner: UserId) -> Self {
        Self::Like(LikeRecord { id, owner })
    }

    pub fn kind(&self) -> ResourceKind {
        self.reference().kind()
    }

    pub fn reference(&self) -> ResourceRef {
        match self {
            Self::UserAccount(record) => ResourceRef::UserAccount(record.id),
            Self::Product(record) => ResourceRef::Product(record.id),
            Self::Category(record) => ResourceRef::Category(record.id),
            Self::Comment(record) => ResourceRef::Comment(record.id),
            Self::Like(record) => ResourceRef::Like(record.id),
        }
    }

    /// Creating principal, for owned kinds (comments and likes).
    pub fn owner(&self) -> Option<UserId> {
        match self {
            Self::Comment(record) => Some(record.owner),
            Self::Like(record) => Some(record.owner),
            _ => None,
        }
    }

    /// Returns a copy owned by `owner`. Kinds without an owner are unchanged.
    pub fn with_owner(mut self, owner: UserId) -> Self {
        match &mut self {
            Self::Comment(record) => record.owner = owner,
            Self::Like(record) => record.owner = owner,
            _ => {}
        }
        self
    }

    /// Cache invalidation capability; only cacheable kinds have one.
    pub fn invalidation(&self) -> Option<&dyn Invalidate> {
        match self {
            Self::Product(record) => Some(record as &dyn Invalidate),
            Self::Category(record) => Some(record as &dyn Invalidate),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_owner_should_only_touch_owned_kinds() {
        let owner = UserId::from_raw(9);
        let comment = Resource::comment(CommentId::from_raw(1), UserId::from_raw(2)).with_owner(owner);
        assert_eq!(comment.owner(), Some(owner));

        let product = Resource::product(ProductId::from_raw(1), None);
        assert_eq!(product.with_owner(owner), product);
        assert_eq!(product.owner(), None);
    }

    #[test]
    fn reference_should_render_kind_and_id() {
        let reference = Resource::category(CategoryId::from_raw(7)).reference();
        assert_eq!(reference.kind(), ResourceKind::Category);
        assert_eq!(reference.to_string(), "category 7");
    }

    #[test]
    fn only_catalog_kinds_are_invalidatable() {
        assert!(Resource::product(ProductId::from_raw(1), None).invalidation().is_some());
        assert!(Resource::category(CategoryId::from_raw(1)).invalidation().is_some());
        assert!(Resource::account(UserId::from_raw(1), false).invalidation().is_none());
        assert!(Resource::like(LikeId::from_raw(1), UserId::from_raw(1)).invalidation().is_none());
    }
}
