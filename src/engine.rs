use crate::action::Action;
use crate::cache::{Cache, NoCache};
use crate::error::{Denial, Error, Result};
use crate::invalidation::{InvalidationSet, before_write};
use crate::keys::CacheKey;
use crate::policy::{self, Decision};
use crate::principal::Principal;
use crate::resource::{Resource, ResourceRef};
use crate::store::{Store, Write};
use crate::types::UserId;
use std::future::Future;
use tracing::{debug, warn};

/// State change requested by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", content = "target", rename_all = "snake_case"))]
pub enum Mutation {
    /// Create a resource. Comments and likes are stamped with the caller as owner.
    ///
    /// Fails with [`Error::Conflict`] when the target already exists.
    Create(Resource),
    /// Replace a resource. The stored owner and account flags are kept.
    Update(Resource),
    Delete(ResourceRef),
    /// Ban or unban an account.
    ToggleActive(UserId),
    /// Grant or revoke staff status.
    TogglePermission(UserId),
}

impl Mutation {
    pub fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Update(_) => Action::Update,
            Self::Delete(_) => Action::Delete,
            Self::ToggleActive(_) => Action::ToggleActive,
            Self::TogglePermission(_) => Action::TogglePermission,
        }
    }

    pub fn target(&self) -> ResourceRef {
        match self {
            Self::Create(resource) | Self::Update(resource) => resource.reference(),
            Self::Delete(reference) => *reference,
            Self::ToggleActive(id) | Self::TogglePermission(id) => ResourceRef::UserAccount(*id),
        }
    }
}

/// Authorization and cache-consistency engine over a store and a cache.
#[derive(Debug)]
pub struct Engine<S, C = NoCache> {
    store: S,
    cache: C,
    forbid_self_toggle: bool,
}

/// Builder for [`Engine`].
pub struct EngineBuilder<S, C = NoCache> {
    store: S,
    cache: C,
    forbid_self_toggle: bool,
}

impl<S> EngineBuilder<S, NoCache> {
    /// Creates a new builder with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: NoCache::new(),
            forbid_self_toggle: false,
        }
    }
}

impl<S, C> EngineBuilder<S, C> {
    /// Denies ban and staff toggles aimed at the caller's own account.
    ///
    /// Off by default: the table alone lets a principal toggle themselves
    /// whenever they could toggle the same account held by someone else.
    pub fn forbid_self_toggle(mut self, on: bool) -> Self {
        self.forbid_self_toggle = on;
        self
    }

    /// Sets the cache implementation.
    pub fn cache<C2: Cache>(self, cache: C2) -> EngineBuilder<S, C2> {
        EngineBuilder {
            store: self.store,
            cache,
            forbid_self_toggle: self.forbid_self_toggle,
        }
    }

    /// Builds the engine.
    pub fn build(self) -> Engine<S, C> {
        Engine {
            store: self.store,
            cache: self.cache,
            forbid_self_toggle: self.forbid_self_toggle,
        }
    }
}

fn denial_for(principal: &Principal) -> Denial {
    if principal.is_authenticated() {
        Denial::Forbidden
    } else {
        Denial::Unauthenticated
    }
}

fn toggled(resource: Resource, action: Action) -> Resource {
    match (resource, action) {
        (Resource::UserAccount(mut account), Action::ToggleActive) => {
            account.is_active = !account.is_active;
            Resource::UserAccount(account)
        }
        (Resource::UserAccount(mut account), Action::TogglePermission) => {
            account.is_staff = !account.is_staff;
            Resource::UserAccount(account)
        }
        (other, _) => other,
    }
}

// Ownership and account role flags only change through creation and the
// dedicated toggles, never through a plain update.
fn preserve_protected(stored: Resource, proposed: Resource) -> Resource {
    match (stored, proposed) {
        (Resource::UserAccount(stored), Resource::UserAccount(mut account)) => {
            account.is_staff = stored.is_staff;
            account.is_active = stored.is_active;
            Resource::UserAccount(account)
        }
        (stored, proposed) => match stored.owner() {
            Some(owner) => proposed.with_owner(owner),
            None => proposed,
        },
    }
}

impl<S, C> Engine<S, C> {
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Decides whether `principal` may perform `action` on a resource snapshot.
    pub fn decide(&self, principal: &Principal, action: Action, resource: &Resource) -> Decision {
        let evaluation = policy::evaluate(principal, action, resource);
        let decision = if evaluation.decision.is_allowed()
            && self.is_blocked_self_toggle(principal, action, resource)
        {
            Decision::Deny
        } else {
            evaluation.decision
        };

        debug!(
            principal = %principal,
            action = %action,
            kind = %resource.kind(),
            rule = evaluation.rule.unwrap_or("none"),
            write = action.is_write(),
            allowed = decision.is_allowed(),
            "authorization decision"
        );
        decision
    }

    /// Like [`Engine::decide`], but a denial becomes [`Error::Denied`].
    pub fn enforce(&self, principal: &Principal, action: Action, resource: &Resource) -> Result<()> {
        match self.decide(principal, action, resource) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(Error::Denied(denial_for(principal))),
        }
    }

    fn is_blocked_self_toggle(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> bool {
        self.forbid_self_toggle
            && matches!(action, Action::ToggleActive | Action::TogglePermission)
            && matches!(resource, Resource::UserAccount(account) if principal.is(account.id))
    }
}

impl<S, C> Engine<S, C>
where
    S: Store,
    C: Cache,
{
    /// Resolves a resource and checks that `principal` may act on it.
    ///
    /// Returns the resolved snapshot on success.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        reference: ResourceRef,
    ) -> Result<Resource> {
        let resource = self.resolve(reference).await?;
        self.enforce(principal, action, &resource)?;
        Ok(resource)
    }

    /// Authorizes and applies a mutation.
    ///
    /// Existing resources are judged on their stored snapshot, never on the
    /// caller's payload, and a create never overwrites one. Every cache key derived from the old and the new
    /// snapshot is deleted before the write is committed; cache failures are
    /// logged and do not stop the write. Returns the invalidated keys.
    pub async fn apply(&self, principal: &Principal, mutation: Mutation) -> Result<InvalidationSet> {
        let action = mutation.action();
        // `subject` is what the policy judges: the stored snapshot when one
        // exists, the payload only for creations.
        let (subject, existing, write) = match mutation {
            Mutation::Create(resource) => {
                let resource = match principal.id() {
                    Some(id) => resource.with_owner(id),
                    None => resource,
                };
                (resource, None, Write::Upsert(resource))
            }
            Mutation::Update(resource) => {
                let existing = self.resolve(resource.reference()).await?;
                let resource = preserve_protected(existing, resource);
                (existing, Some(existing), Write::Upsert(resource))
            }
            Mutation::Delete(reference) => {
                let existing = self.resolve(reference).await?;
                (existing, Some(existing), Write::Remove(reference))
            }
            Mutation::ToggleActive(id) | Mutation::TogglePermission(id) => {
                let existing = self.resolve(ResourceRef::UserAccount(id)).await?;
                (existing, Some(existing), Write::Upsert(toggled(existing, action)))
            }
        };
        self.enforce(principal, action, &subject)?;
        if existing.is_none() && self.lookup(subject.reference()).await?.is_some() {
            return Err(Error::Conflict(subject.reference()));
        }

        let proposed = match write {
            Write::Upsert(resource) => Some(resource),
            Write::Remove(_) => None,
        };
        let mut keys = InvalidationSet::new();
        for snapshot in existing.iter().chain(proposed.iter()) {
            if let Some(target) = snapshot.invalidation() {
                keys.extend(before_write(target));
            }
        }
        self.invalidate(&keys).await;

        self.store.commit(write).await.map_err(Error::from)?;
        debug!(
            principal = %principal,
            action = %action,
            resource = %write.target(),
            invalidated = keys.len(),
            "write committed"
        );
        Ok(keys)
    }

    /// Cache-aside read: serves `key` from the cache, or loads and memoizes it.
    ///
    /// A cache error is treated as a miss. Loader errors are returned and
    /// nothing is cached.
    pub async fn read_through<F, Fut>(&self, key: &CacheKey, load: F) -> Result<C::Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C::Value>>,
    {
        match self.cache.get(key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %key, "cache hit");
                return Ok(value);
            }
            Ok(None) => {
                debug!(cache.key = %key, "cache miss");
            }
            Err(e) => {
                warn!(error = %e, cache.key = %key, "cache read failed, loading from store");
            }
        }

        let value = load().await?;
        if let Err(e) = self.cache.set(key, value.clone()).await {
            warn!(error = %e, cache.key = %key, "failed to populate cache");
        }
        Ok(value)
    }

    async fn lookup(&self, reference: ResourceRef) -> Result<Option<Resource>> {
        self.store.resolve(reference).await.map_err(Error::from)
    }

    async fn resolve(&self, reference: ResourceRef) -> Result<Resource> {
        self.lookup(reference)
            .await?
            .ok_or(Error::NotFound(reference))
    }

    async fn invalidate(&self, keys: &InvalidationSet) {
        for key in keys.iter() {
            if let Err(e) = self.cache.delete(key).await {
                warn!(error = %e, cache.key = %key, "failed to invalidate cache key");
            }
        }
    }
}
