use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::error::TrailError;
use crate::types::{OptionalResource, ResourceKind, ResourceNode};

/// Desired-state description handed to the provisioning engine.
///
/// Nodes are keyed by address. Optional resources that were switched off are
/// remembered as pruned so that a reference into one can be reported as a
/// configuration problem rather than a plain dangling reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceGraph {
    nodes: BTreeMap<String, ResourceNode>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pruned: BTreeSet<String>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ResourceNode) -> Result<(), TrailError> {
        let address = node.address().to_string();
        if self.nodes.contains_key(&address) || self.pruned.contains(&address) {
            return Err(TrailError::DuplicateResource { address });
        }
        self.nodes.insert(address, node);
        Ok(())
    }

    /// Insert a present resource, or record an absent one as pruned.
    pub fn insert_optional(&mut self, resource: OptionalResource) -> Result<(), TrailError> {
        match resource {
            OptionalResource::Present(node) => self.insert(node),
            OptionalResource::Absent { address, reason } => {
                if self.nodes.contains_key(&address) || !self.pruned.insert(address.clone()) {
                    return Err(TrailError::DuplicateResource { address });
                }
                debug!(event = "Graph", phase = "Prune", address = address, reason = reason);
                Ok(())
            }
        }
    }

    pub fn get(&self, address: &str) -> Option<&ResourceNode> {
        self.nodes.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains_key(address)
    }

    pub fn is_pruned(&self, address: &str) -> bool {
        self.pruned.contains(address)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    pub fn pruned(&self) -> &BTreeSet<String> {
        &self.pruned
    }

    /// Nodes of the given kind, in address order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values().filter(move |n| n.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every `(from, to)` pair where `to` is not a node of this graph.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        self.nodes
            .values()
            .flat_map(|node| {
                node.depends_on()
                    .iter()
                    .filter(|dep| !self.nodes.contains_key(dep.as_str()))
                    .map(move |dep| (node.address(), dep.as_str()))
            })
            .collect()
    }

    /// Check referential integrity and acyclicity.
    pub fn validate(&self) -> Result<(), TrailError> {
        if let Some((from, to)) = self.dangling_references().into_iter().next() {
            if self.pruned.contains(to) {
                return Err(TrailError::conflict(
                    from,
                    format!("references `{to}`, which is disabled by configuration"),
                ));
            }
            return Err(TrailError::DanglingReference {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.creation_order().map(|_| ())
    }

    /// Addresses in an order where every dependency precedes its dependents.
    ///
    /// Ties are broken by address, so the order is stable across runs.
    /// Dependencies on unknown addresses are ignored here; see [`Self::validate`].
    pub fn creation_order(&self) -> Result<Vec<&str>, TrailError> {
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for node in self.nodes.values() {
            let known: Vec<&str> = node
                .depends_on()
                .iter()
                .map(String::as_str)
                .filter(|dep| self.nodes.contains_key(*dep))
                .collect();
            pending.insert(node.address(), known.len());
            for dep in known {
                dependents.entry(dep).or_default().push(node.address());
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(address, _)| *address)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(address) = ready.pop_first() {
            order.push(address);
            for dependent in dependents.get(address).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let stuck = pending
                .iter()
                .find(|(_, count)| **count > 0)
                .map(|(address, _)| address.to_string())
                .unwrap_or_default();
            return Err(TrailError::DependencyCycle { address: stuck });
        }
        Ok(order)
    }
}
