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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payload::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapGranularity {
    Municipality,
    MacroRegion,
    #[default]
    HealthRegion,
}
impl MapGranularity {
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "municipio" | "município" | "municipality" => Some(MapGranularity::Municipality),
            "macroregiao" | "macrorregiao" | "macro_regiao" | "macro_region" => {
                Some(MapGranularity::MacroRegion)
            }
            "regiao_saude" | "regiao_de_saude" | "health_region" => {
                Some(MapGranularity::HealthRegion)
            }
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            MapGranularity::Municipality => "municipality",
            MapGranularity::MacroRegion => "macro_region",
            MapGranularity::HealthRegion => "health_region",
        }
    }
}
impl fmt::Display for MapGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geography resource codes served under `/maps/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapCodes {
    pub municipality: String,
    pub macro_region: String,
    pub health_region: String,
}
impl Default for MapCodes {
    fn default() -> Self {
        Self {
            municipality: "GO_mun".to_string(),
            macro_region: "GO_mac".to_string(),
            health_region: "GO_reg".to_string(),
        }
    }
}
impl MapCodes {
    pub fn code_for(&self, granularity: MapGranularity) -> &str {
        match granularity {
            MapGranularity::Municipality => &self.municipality,
            MapGranularity::MacroRegion => &self.macro_region,
            MapGranularity::HealthRegion => &self.health_region,
        }
    }
}

pub trait GranularityResolver: Send + Sync {
    fn resolve(&self, metadata: &Metadata) -> MapGranularity;
}

const MUNICIPALITY_TOKENS: &[&str] = &["município", "municipio"];
const MACRO_REGION_TOKENS: &[&str] = &["macroregiao", "macro-região", "macro região"];
const HEALTH_REGION_TOKENS: &[&str] = &["região de saúde", "regiao de saude", "regiao de saúde"];

/// Scans the serialised metadata text for granularity tokens.
/// A typed `granularidade` field wins over the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataTextScan;

impl GranularityResolver for MetadataTextScan {
    fn resolve(&self, metadata: &Metadata) -> MapGranularity {
        if let Some(granularity) = metadata.granularity_hint() {
            return granularity;
        }
        let text = match serde_json::to_string(metadata) {
            Ok(text) => text.to_lowercase(),
            Err(_) => return MapGranularity::default(),
        };
        let contains_any = |tokens: &[&str]| tokens.iter().any(|t| text.contains(t));
        if contains_any(MUNICIPALITY_TOKENS) {
            MapGranularity::Municipality
        } else if contains_any(MACRO_REGION_TOKENS) {
            MapGranularity::MacroRegion
        } else if contains_any(HEALTH_REGION_TOKENS) {
            MapGranularity::HealthRegion
        } else {
            MapGranularity::default()
        }
    }
}

pub fn resolve_granularity(metadata: &Metadata) -> MapGranularity {
    MetadataTextScan.resolve(metadata)
}
