// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::classifier::ChartFamily;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum ChartContent {
    Option(Value),
    Dump(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartInstance {
    pub family: ChartFamily,
    pub content: ChartContent,
    pub revision: u64,
}
impl ChartInstance {
    pub fn option(&self) -> Option<&Value> {
        match &self.content {
            ChartContent::Option(option) => Some(option),
            ChartContent::Dump(_) => None,
        }
    }
}

/// Chart instances bound to render targets, plus the map geographies they draw on.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ChartBoard {
    instances: IndexMap<String, ChartInstance>,
    maps: IndexMap<String, Value>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the target's instance wholesale; nothing from the previous option survives.
    pub fn set_content(&mut self, target: &str, family: ChartFamily, content: ChartContent) -> u64 {
        let revision = self
            .instances
            .get(target)
            .map_or(1, |previous| previous.revision + 1);
        self.instances.insert(
            target.to_string(),
            ChartInstance {
                family,
                content,
                revision,
            },
        );
        revision
    }

    pub fn set_option(&mut self, target: &str, family: ChartFamily, option: Value) -> u64 {
        self.set_content(target, family, ChartContent::Option(option))
    }

    pub fn register_map(&mut self, name: &str, geography: Value) {
        self.maps.insert(name.to_string(), geography);
    }

    pub fn instance(&self, target: &str) -> Option<&ChartInstance> {
        self.instances.get(target)
    }

    pub fn instances(&self) -> impl Iterator<Item = (&str, &ChartInstance)> {
        self.instances.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn registered_map(&self, name: &str) -> Option<&Value> {
        self.maps.get(name)
    }

    pub fn maps(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.maps.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.maps.clear();
    }
}
