//! Inventory sink and its in-memory implementation

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::InventoryError;

/// Group every host implicitly belongs to when it has no other group
const UNGROUPED: &str = "ungrouped";

/// Destination for discovered hosts, groups and variables
///
/// All operations are idempotent: adding an existing group or host, or
/// setting a variable to the value it already has, changes nothing.
pub trait InventorySink {
    /// Ensure a group exists, returning its name
    fn add_group(&mut self, group: &str) -> String;

    /// Ensure a host exists and, if given, is a member of `group`
    fn add_host(&mut self, host: &str, group: Option<&str>) -> String;

    /// Set a variable on a group or host
    ///
    /// # Errors
    /// Returns [`InventoryError::UnknownEntity`] if `entity` was never added.
    fn set_variable(&mut self, entity: &str, key: &str, value: Value)
    -> Result<(), InventoryError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Group {
    /// Member hosts in insertion order
    hosts: Vec<String>,
    vars: BTreeMap<String, Value>,
}

/// In-memory inventory
///
/// Renders to the JSON shape expected from dynamic inventory scripts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    groups: BTreeMap<String, Group>,
    hosts: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Inventory {
    /// Create an empty inventory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All host names
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// All group names
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Members of `group`, empty if the group does not exist
    #[must_use]
    pub fn group_hosts(&self, group: &str) -> &[String] {
        self.groups
            .get(group)
            .map(|g| g.hosts.as_slice())
            .unwrap_or_default()
    }

    /// Groups `host` is a member of
    #[must_use]
    pub fn groups_of(&self, host: &str) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, g)| g.hosts.iter().any(|h| h == host))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Variable set directly on a host
    #[must_use]
    pub fn host_var(&self, host: &str, key: &str) -> Option<&Value> {
        self.hosts.get(host).and_then(|vars| vars.get(key))
    }

    /// Variable set on a group
    #[must_use]
    pub fn group_var(&self, group: &str, key: &str) -> Option<&Value> {
        self.groups.get(group).and_then(|g| g.vars.get(key))
    }

    /// Variables of `host` as a JSON object, `{}` for unknown hosts
    #[must_use]
    pub fn host_vars(&self, host: &str) -> Value {
        self.hosts
            .get(host)
            .map(|vars| Value::Object(vars.clone().into_iter().collect()))
            .unwrap_or_else(|| json!({}))
    }

    /// Render the full inventory for `--list`
    #[must_use]
    pub fn to_ansible_list(&self) -> Value {
        let mut out = Map::new();

        let hostvars: Map<String, Value> = self
            .hosts
            .keys()
            .map(|host| (host.clone(), self.host_vars(host)))
            .collect();
        out.insert("_meta".to_string(), json!({ "hostvars": hostvars }));

        let mut children: Vec<&str> = self.groups().collect();
        if !self.groups.contains_key(UNGROUPED) {
            children.push(UNGROUPED);
        }
        out.insert("all".to_string(), json!({ "children": children }));

        for (name, group) in &self.groups {
            let mut entry = Map::new();
            entry.insert("hosts".to_string(), json!(group.hosts));
            if !group.vars.is_empty() {
                entry.insert(
                    "vars".to_string(),
                    Value::Object(group.vars.clone().into_iter().collect()),
                );
            }
            out.insert(name.clone(), Value::Object(entry));
        }

        let ungrouped: Vec<&str> = self
            .hosts()
            .filter(|host| self.groups_of(host).is_empty())
            .collect();
        out.entry(UNGROUPED.to_string())
            .or_insert_with(|| json!({ "hosts": ungrouped }));

        Value::Object(out)
    }
}

impl InventorySink for Inventory {
    fn add_group(&mut self, group: &str) -> String {
        self.groups.entry(group.to_string()).or_default();
        group.to_string()
    }

    fn add_host(&mut self, host: &str, group: Option<&str>) -> String {
        if !self.hosts.contains_key(host) && self.groups.contains_key(host) {
            // set_variable resolves groups first
            warn!(host, "host name matches a group, its variables will be set on the group");
        }
        self.hosts.entry(host.to_string()).or_default();
        if let Some(group) = group {
            let members = &mut self.groups.entry(group.to_string()).or_default().hosts;
            if !members.iter().any(|h| h == host) {
                members.push(host.to_string());
            }
        }
        host.to_string()
    }

    fn set_variable(
        &mut self,
        entity: &str,
        key: &str,
        value: Value,
    ) -> Result<(), InventoryError> {
        if let Some(group) = self.groups.get_mut(entity) {
            group.vars.insert(key.to_string(), value);
        } else if let Some(vars) = self.hosts.get_mut(entity) {
            vars.insert(key.to_string(), value);
        } else {
            return Err(InventoryError::UnknownEntity(entity.to_string()));
        }
        Ok(())
    }
}
