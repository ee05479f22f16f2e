//! Picked sub-component → application route.
//!
//! The table is declarative and validated once: every node name belongs to
//! at most one rule. Several names may share a route.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use constants::navigation::DEFAULT_ROUTES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationRule {
    pub route: String,
    pub nodes: Vec<String>,
}

impl NavigationRule {
    pub fn new(route: impl Into<String>, nodes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            route: route.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Validated lookup from node name to route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationTable {
    rules: Vec<NavigationRule>,
    by_node: HashMap<String, usize>,
}

impl NavigationTable {
    pub fn new(rules: Vec<NavigationRule>) -> SceneResult<Self> {
        let mut by_node: HashMap<String, usize> = HashMap::new();

        for (index, rule) in rules.iter().enumerate() {
            if rule.route.trim().is_empty() {
                return Err(SceneError::InvalidNavigationRule(format!(
                    "rule #{index} has an empty route"
                )));
            }
            for node in &rule.nodes {
                match by_node.get(node) {
                    // Repeating a name inside one rule is harmless.
                    Some(&existing) if existing == index => {}
                    Some(&existing) => {
                        return Err(SceneError::AmbiguousNavigationRule {
                            node: node.clone(),
                            first_route: rules[existing].route.clone(),
                            second_route: rule.route.clone(),
                        });
                    }
                    None => {
                        by_node.insert(node.clone(), index);
                    }
                }
            }
        }

        Ok(Self { rules, by_node })
    }

    /// Table with no rules: every click is ignored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in dashboard routes.
    pub fn defaults() -> SceneResult<Self> {
        Self::new(default_rules())
    }

    pub fn resolve(&self, node_name: &str) -> Option<&str> {
        self.by_node
            .get(node_name)
            .map(|&index| self.rules[index].route.as_str())
    }

    pub fn rules(&self) -> &[NavigationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

pub fn default_rules() -> Vec<NavigationRule> {
    DEFAULT_ROUTES
        .iter()
        .map(|info| NavigationRule::new(info.route, info.nodes.iter().copied()))
        .collect()
}

/// Receiver of route changes. Fire-and-forget.
pub trait Router {
    fn navigate_to(&mut self, route: &str);
}

/// Router that only remembers what it was asked to do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingRouter {
    pub routes: Vec<String>,
}

impl Router for RecordingRouter {
    fn navigate_to(&mut self, route: &str) {
        self.routes.push(route.to_string());
    }
}

/// Emitted inside the app whenever a click resolves to a route.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RouteChanged {
    pub route: String,
}
