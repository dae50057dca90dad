//! Security policy editing with an unsaved-changes diff
//!
//! The editor keeps the policies as loaded (the snapshot) next to a working
//! copy. Both are compared in normalized form: identities sorted, duplicate
//! identities merged, and each role set sorted and deduplicated. Reordering
//! roles therefore never counts as a change.

use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::error::ConsoleError;
use crate::api::{Acknowledgement, PolicyInfo, ReportServerApi, RoleInfo};

/// What the policies apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyScope {
    /// A catalog item; assignable roles are the catalog roles
    Item(String),
    /// Site-wide; assignable roles are the system roles
    System,
}

impl fmt::Display for PolicyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyScope::Item(path) => write!(f, "{}", path),
            PolicyScope::System => f.write_str("System"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    pub identity: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDiff {
    pub added: Vec<PolicyInfo>,
    pub removed: Vec<PolicyInfo>,
    pub changed: Vec<RoleChange>,
}

impl PolicyDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

type Normalized = BTreeMap<String, BTreeSet<String>>;

fn normalize(policies: &[PolicyInfo]) -> Normalized {
    let mut normalized = Normalized::new();
    for policy in policies {
        normalized
            .entry(policy.group_user_name.clone())
            .or_default()
            .extend(policy.roles.iter().cloned());
    }
    normalized
}

/// Fold repeated entries for one identity into a single policy, keeping
/// first-seen order of identities and roles
fn merge_duplicates(policies: Vec<PolicyInfo>) -> Vec<PolicyInfo> {
    let mut merged: Vec<PolicyInfo> = Vec::with_capacity(policies.len());
    for policy in policies {
        match merged.iter_mut().find(|p| p.group_user_name == policy.group_user_name) {
            Some(existing) => {
                for role in policy.roles {
                    if !existing.roles.contains(&role) {
                        existing.roles.push(role);
                    }
                }
            }
            None => merged.push(policy),
        }
    }
    merged
}

/// Compare two policy lists in normalized form
pub fn diff_policies(before: &[PolicyInfo], after: &[PolicyInfo]) -> PolicyDiff {
    let before = normalize(before);
    let after = normalize(after);
    let mut diff = PolicyDiff::default();

    for (identity, roles) in &after {
        match before.get(identity) {
            None => diff.added.push(PolicyInfo::new(identity.clone(), roles.iter().cloned())),
            Some(old) if old != roles => diff.changed.push(RoleChange {
                identity: identity.clone(),
                before: old.iter().cloned().collect(),
                after: roles.iter().cloned().collect(),
            }),
            Some(_) => {}
        }
    }
    for (identity, roles) in &before {
        if !after.contains_key(identity) {
            diff.removed
                .push(PolicyInfo::new(identity.clone(), roles.iter().cloned()));
        }
    }
    diff
}

/// Editor for the policies of one item or of the whole site
///
/// Mutations take `&mut self`, so a save can never overlap an edit or a
/// second save.
pub struct PolicyEditor {
    api: Arc<dyn ReportServerApi>,
    scope: PolicyScope,
    snapshot: Vec<PolicyInfo>,
    working: Vec<PolicyInfo>,
    assignable: Vec<RoleInfo>,
    loaded: bool,
}

impl PolicyEditor {
    pub fn new(api: Arc<dyn ReportServerApi>, scope: PolicyScope) -> Self {
        Self {
            api,
            scope,
            snapshot: Vec::new(),
            working: Vec::new(),
            assignable: Vec::new(),
            loaded: false,
        }
    }

    pub fn scope(&self) -> &PolicyScope {
        &self.scope
    }

    /// Fetch policies and assignable roles together
    pub async fn load(&mut self) -> Result<(), ConsoleError> {
        info!("Loading policies for {}", self.scope);
        let context = format!("Failed to load policies for {}", self.scope);

        let (policies, roles) = match &self.scope {
            PolicyScope::Item(path) => {
                futures::try_join!(self.api.get_policies(path), self.api.list_catalog_roles())
            }
            PolicyScope::System => {
                futures::try_join!(self.api.get_system_policies(), self.api.list_system_roles())
            }
        }
        .map_err(|e| ConsoleError::load(context, e))?;

        debug!("Loaded {} policies and {} roles", policies.len(), roles.len());
        let policies = merge_duplicates(policies);
        self.snapshot = policies.clone();
        self.working = policies;
        self.assignable = roles;
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn policies(&self) -> &[PolicyInfo] {
        &self.working
    }

    pub fn saved_policies(&self) -> &[PolicyInfo] {
        &self.snapshot
    }

    pub fn assignable_roles(&self) -> &[RoleInfo] {
        &self.assignable
    }

    pub fn diff(&self) -> PolicyDiff {
        diff_policies(&self.snapshot, &self.working)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.diff().is_empty()
    }

    pub fn can_save(&self) -> bool {
        self.loaded && self.has_unsaved_changes()
    }

    /// Add a policy, merging its roles into an existing entry for the identity
    pub fn add_policy<I, S>(&mut self, identity: &str, roles: I) -> Result<(), ConsoleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        for role in &roles {
            self.check_role(role)?;
        }
        for role in roles {
            self.grant_role(identity, &role)?;
        }
        Ok(())
    }

    /// Drop every policy entry for the identity; returns whether one existed
    pub fn remove_policy(&mut self, identity: &str) -> bool {
        let before = self.working.len();
        self.working.retain(|p| p.group_user_name != identity);
        before != self.working.len()
    }

    /// Give the identity a role; a no-op if it already holds it
    pub fn grant_role(&mut self, identity: &str, role: &str) -> Result<(), ConsoleError> {
        self.check_role(role)?;
        match self.working.iter_mut().find(|p| p.group_user_name == identity) {
            Some(policy) => {
                if !policy.roles.iter().any(|r| r == role) {
                    policy.roles.push(role.to_string());
                }
            }
            None => self.working.push(PolicyInfo::new(identity, [role])),
        }
        Ok(())
    }

    /// Remove one occurrence of a role.
    ///
    /// An identity left without roles is removed, since an empty policy cannot
    /// be saved. Returns whether anything changed.
    pub fn revoke_role(&mut self, identity: &str, role: &str) -> bool {
        let Some(idx) = self.working.iter().position(|p| p.group_user_name == identity) else {
            return false;
        };
        let policy = &mut self.working[idx];
        let Some(role_idx) = policy.roles.iter().position(|r| r == role) else {
            return false;
        };
        policy.roles.remove(role_idx);
        if policy.roles.is_empty() {
            self.working.remove(idx);
        }
        true
    }

    /// Replace the identity's roles; an empty list removes the identity
    pub fn set_roles<I, S>(&mut self, identity: &str, roles: I) -> Result<(), ConsoleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        for role in &roles {
            self.check_role(role)?;
        }
        self.remove_policy(identity);
        if !roles.is_empty() {
            self.working.push(PolicyInfo::new(identity, roles));
        }
        Ok(())
    }

    /// Throw away unsaved edits
    pub fn discard_changes(&mut self) {
        self.working = self.snapshot.clone();
    }

    /// Write the working copy as a full replacement of the server's list
    pub async fn save(&mut self) -> Result<Acknowledgement, ConsoleError> {
        if !self.loaded {
            return Err(ConsoleError::NotReady("Policies".to_string()));
        }
        if !self.has_unsaved_changes() {
            return Ok(Acknowledgement::new("No changes to save"));
        }

        info!("Saving {} policies for {}", self.working.len(), self.scope);
        let action = format!("Save policies for {}", self.scope);
        let ack = match &self.scope {
            PolicyScope::Item(path) => self.api.set_policies(path, &self.working).await,
            PolicyScope::System => self.api.set_system_policies(&self.working).await,
        }
        .map_err(|e| ConsoleError::persistence(action, e))?;

        self.snapshot = self.working.clone();
        Ok(ack)
    }

    /// Assignable roles whose name or description contains `term`
    pub fn filter_roles(&self, term: &str) -> Vec<&RoleInfo> {
        filter_roles(&self.assignable, term)
    }

    /// Working policies whose identity contains `term`
    pub fn filter_policies(&self, term: &str) -> Vec<&PolicyInfo> {
        let term = term.trim().to_lowercase();
        self.working
            .iter()
            .filter(|p| term.is_empty() || p.group_user_name.to_lowercase().contains(&term))
            .collect()
    }

    fn check_role(&self, role: &str) -> Result<(), ConsoleError> {
        if !self.loaded || self.assignable.iter().any(|r| r.name == role) {
            return Ok(());
        }
        Err(ConsoleError::UnknownRole {
            role: role.to_string(),
            assignable: self.assignable.iter().map(|r| r.name.clone()).collect(),
        })
    }
}

/// Case-insensitive substring match on role name or description
pub fn filter_roles<'a>(roles: &'a [RoleInfo], term: &str) -> Vec<&'a RoleInfo> {
    let term = term.trim().to_lowercase();
    roles
        .iter()
        .filter(|r| {
            term.is_empty() || r.name.to_lowercase().contains(&term) || r.description.to_lowercase().contains(&term)
        })
        .collect()
}
