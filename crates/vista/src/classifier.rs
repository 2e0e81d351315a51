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

use crate::payload::{is_present, IndicatorPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFamily {
    Line,
    Map,
    Bar,
    Scatter,
}
impl ChartFamily {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "line" => Some(ChartFamily::Line),
            "map" => Some(ChartFamily::Map),
            "bar" => Some(ChartFamily::Bar),
            "scatter" => Some(ChartFamily::Scatter),
            _ => None,
        }
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartFamily::Line => "line",
            ChartFamily::Map => "map",
            ChartFamily::Bar => "bar",
            ChartFamily::Scatter => "scatter",
        }
    }
}
impl fmt::Display for ChartFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which step of the cascade decided the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    ExplicitChartType,
    MetadataMapHint,
    VisualMapPresent,
    SeriesType,
    UntypedSeriesData,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub family: ChartFamily,
    pub rule: ClassificationRule,
}
impl Classification {
    fn new(family: ChartFamily, rule: ClassificationRule) -> Self {
        Self { family, rule }
    }
    /// Nothing in the payload identified the family; `line` was assumed.
    pub fn is_fallback(&self) -> bool {
        self.rule == ClassificationRule::Fallback
    }
}

pub fn classify(payload: &IndicatorPayload) -> Classification {
    let metadata = &payload.metadata;
    let option = payload.option();

    match metadata.chart_type_hint() {
        Some("line") => {
            return Classification::new(ChartFamily::Line, ClassificationRule::ExplicitChartType)
        }
        Some("map") => {
            return Classification::new(ChartFamily::Map, ClassificationRule::ExplicitChartType)
        }
        _ => {}
    }

    if is_present(metadata.geojson.as_ref())
        || is_present(metadata.map_type.as_ref())
        || metadata.tipo_grafico_hint() == Some("map")
    {
        return Classification::new(ChartFamily::Map, ClassificationRule::MetadataMapHint);
    }

    if option.visual_map.as_ref().is_some_and(|vm| !vm.is_null()) {
        return Classification::new(ChartFamily::Map, ClassificationRule::VisualMapPresent);
    }

    if let Some(first) = option.first_series() {
        if let Some(family) = first.kind().and_then(ChartFamily::from_tag) {
            return Classification::new(family, ClassificationRule::SeriesType);
        }
        if is_present(first.data.as_ref()) {
            return Classification::new(ChartFamily::Line, ClassificationRule::UntypedSeriesData);
        }
    }

    Classification::new(ChartFamily::Line, ClassificationRule::Fallback)
}
