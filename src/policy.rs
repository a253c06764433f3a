//! Declarative authorization table.
//!
//! Every entry point evaluates the same [`RULES`]: the first rule whose kind
//! and action match decides, and no match means deny.

use crate::action::Action;
use crate::principal::Principal;
use crate::resource::{Resource, ResourceKind};

/// Authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Permission is granted.
    Allow,
    /// Permission is denied.
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// One row of the policy table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Stable name, used in logs.
    pub name: &'static str,
    pub kinds: &'static [ResourceKind],
    pub actions: &'static [Action],
    check: fn(&Principal, &Resource) -> bool,
}

impl Rule {
    fn matches(&self, action: Action, kind: ResourceKind) -> bool {
        self.kinds.contains(&kind) && self.actions.contains(&action)
    }
}

/// Outcome of evaluating the table, with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    /// `None` when no rule matched.
    pub rule: Option<&'static str>,
}

const CATALOG: &[ResourceKind] = &[ResourceKind::Product, ResourceKind::Category];
const SOCIAL: &[ResourceKind] = &[ResourceKind::Comment, ResourceKind::Like];
const ACCOUNT: &[ResourceKind] = &[ResourceKind::UserAccount];
const CRUD_WRITES: &[Action] = &[Action::Create, Action::Update, Action::Delete];
const TOGGLES: &[Action] = &[Action::ToggleActive, Action::TogglePermission];

/// The policy table, in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "account.read",
        kinds: ACCOUNT,
        actions: &[Action::Read],
        check: always,
    },
    Rule {
        name: "account.update_self",
        kinds: ACCOUNT,
        actions: &[Action::Update],
        check: is_self,
    },
    Rule {
        name: "account.toggle",
        kinds: ACCOUNT,
        actions: TOGGLES,
        check: can_toggle_account,
    },
    Rule {
        name: "catalog.read",
        kinds: CATALOG,
        actions: &[Action::Read],
        check: always,
    },
    Rule {
        name: "catalog.write",
        kinds: CATALOG,
        actions: CRUD_WRITES,
        check: is_staff,
    },
    Rule {
        name: "social.read",
        kinds: SOCIAL,
        actions: &[Action::Read],
        check: always,
    },
    Rule {
        name: "social.create",
        kinds: SOCIAL,
        actions: &[Action::Create],
        check: is_active,
    },
    Rule {
        name: "social.modify",
        kinds: SOCIAL,
        actions: &[Action::Update, Action::Delete],
        check: is_owner_or_staff,
    },
];

fn always(_: &Principal, _: &Resource) -> bool {
    true
}

fn is_staff(principal: &Principal, _: &Resource) -> bool {
    principal.is_staff()
}

fn is_active(principal: &Principal, _: &Resource) -> bool {
    principal.is_active()
}

fn is_self(principal: &Principal, resource: &Resource) -> bool {
    match resource {
        Resource::UserAccount(account) => principal.is(account.id),
        _ => false,
    }
}

// Staff may toggle customers; only a superuser may toggle another staff
// account. Self-targeting is not special-cased here.
fn can_toggle_account(principal: &Principal, resource: &Resource) -> bool {
    let Resource::UserAccount(account) = resource else {
        return false;
    };
    principal.is_staff() && (!account.is_staff || principal.is_superuser())
}

fn is_owner_or_staff(principal: &Principal, resource: &Resource) -> bool {
    resource.owner().is_some_and(|owner| principal.is(owner)) || principal.is_staff()
}

/// Evaluates the table and reports which rule decided.
pub fn evaluate(principal: &Principal, action: Action, resource: &Resource) -> Evaluation {
    let kind = resource.kind();
    match RULES.iter().find(|rule| rule.matches(action, kind)) {
        Some(rule) => Evaluation {
            decision: Decision::from((rule.check)(principal, resource)),
            rule: Some(rule.name),
        },
        None => Evaluation {
            decision: Decision::Deny,
            rule: None,
        },
    }
}

/// Decides whether `principal` may perform `action` on `resource`.
pub fn decide(principal: &Principal, action: Action, resource: &Resource) -> Decision {
    evaluate(principal, action, resource).decision
}
