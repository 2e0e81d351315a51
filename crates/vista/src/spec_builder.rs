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

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::classifier::ChartFamily;
use crate::client::GeographySource;
use crate::error::{BuildError, BuildResult};
use crate::payload::{IndicatorPayload, Series};
use crate::region::{GranularityResolver, MapCodes, MapGranularity, MetadataTextScan};

pub const DEFAULT_MAP_NAME: &str = "goias";
pub const LEGEND_TEXT: [&str; 2] = ["Alto", "Baixo"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderSpec {
    Line(LineSpec),
    Map(MapSpec),
    Raw(RawSpec),
}
impl RenderSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderSpec::Line(_) => "line",
            RenderSpec::Map(_) => "map",
            RenderSpec::Raw(_) => "raw",
        }
    }
    /// ECharts option for the spec; applying it replaces whatever the target held.
    pub fn to_option(&self) -> Value {
        match self {
            RenderSpec::Line(spec) => spec.to_option(),
            RenderSpec::Map(spec) => spec.to_option(),
            RenderSpec::Raw(spec) => spec.option.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSpec {
    pub categories: Vec<Value>,
    pub series: Vec<Map<String, Value>>,
}
impl LineSpec {
    pub fn to_option(&self) -> Value {
        json!({
            "tooltip": {"trigger": "axis"},
            "xAxis": {"type": "category", "data": self.categories},
            "yAxis": {"type": "value"},
            "series": self.series,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSpec {
    pub map_name: String,
    pub granularity: MapGranularity,
    pub geography: Value,
    pub range: ValueRange,
    pub data: Vec<Value>,
}
impl MapSpec {
    pub fn to_option(&self) -> Value {
        json!({
            "tooltip": {"trigger": "item"},
            "visualMap": {
                "left": "left",
                "min": self.range.min,
                "max": self.range.max,
                "text": LEGEND_TEXT,
                "calculable": true,
            },
            "series": [{
                "type": "map",
                "map": self.map_name,
                "roam": true,
                "emphasis": {"label": {"show": true}},
                "data": self.data,
            }],
        })
    }
}

/// Option for a family without a dedicated builder, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawSpec {
    pub family: ChartFamily,
    pub option: Value,
}

pub fn build_line(payload: &IndicatorPayload) -> BuildResult<LineSpec> {
    let option = payload.option();
    let categories = option.x_axis_data().ok_or(BuildError::MissingAxisData)?;
    if option.series.is_empty() {
        return Err(BuildError::EmptySeries);
    }
    Ok(LineSpec {
        categories: categories.clone(),
        series: option.series.iter().map(as_smooth_line).collect(),
    })
}

fn as_smooth_line(series: &Series) -> Map<String, Value> {
    let mut out = series.extra.clone();
    if let Some(data) = &series.data {
        out.insert("data".to_string(), data.clone());
    }
    out.insert("type".to_string(), json!("line"));
    out.insert("smooth".to_string(), json!(true));
    out.insert("symbol".to_string(), json!("circle"));
    out
}

/// Min and max over the `value` of every datum. Non-numeric values are rejected.
pub fn value_range(points: &[Value]) -> BuildResult<ValueRange> {
    let mut range: Option<ValueRange> = None;
    for (index, point) in points.iter().enumerate() {
        let value = point
            .get("value")
            .and_then(Value::as_f64)
            .ok_or_else(|| BuildError::NonNumericValue {
                index,
                found: match point.get("value") {
                    Some(v) => v.to_string(),
                    None => "no value field".to_string(),
                },
            })?;
        range = Some(match range {
            Some(r) => ValueRange {
                min: r.min.min(value),
                max: r.max.max(value),
            },
            None => ValueRange {
                min: value,
                max: value,
            },
        });
    }
    range.ok_or(BuildError::NoMapData)
}

pub struct SpecBuilder {
    resolver: Arc<dyn GranularityResolver>,
    codes: MapCodes,
    map_name: String,
}
impl Default for SpecBuilder {
    fn default() -> Self {
        Self {
            resolver: Arc::new(MetadataTextScan),
            codes: MapCodes::default(),
            map_name: DEFAULT_MAP_NAME.to_string(),
        }
    }
}
impl SpecBuilder {
    pub fn new(codes: MapCodes, map_name: impl Into<String>) -> Self {
        Self {
            codes,
            map_name: map_name.into(),
            ..Default::default()
        }
    }
    pub fn with_resolver(mut self, resolver: Arc<dyn GranularityResolver>) -> Self {
        self.resolver = resolver;
        self
    }
    pub fn codes(&self) -> &MapCodes {
        &self.codes
    }

    pub async fn build(
        &self,
        family: ChartFamily,
        payload: &IndicatorPayload,
        geography: &dyn GeographySource,
    ) -> BuildResult<RenderSpec> {
        match family {
            ChartFamily::Line => build_line(payload).map(RenderSpec::Line),
            ChartFamily::Map => self.build_map(payload, geography).await.map(RenderSpec::Map),
            ChartFamily::Bar | ChartFamily::Scatter => Ok(RenderSpec::Raw(RawSpec {
                family,
                option: serde_json::to_value(payload.option()).unwrap_or(Value::Null),
            })),
        }
    }

    pub async fn build_map(
        &self,
        payload: &IndicatorPayload,
        geography: &dyn GeographySource,
    ) -> BuildResult<MapSpec> {
        let option = payload.option();
        let data = option
            .first_series()
            .map(Series::data_points)
            .unwrap_or_default();
        if data.is_empty() {
            return Err(BuildError::NoMapData);
        }

        let range = match option.visual_map_bounds() {
            (Some(min), Some(max)) => ValueRange { min, max },
            (min, max) => {
                let computed = value_range(data)?;
                ValueRange {
                    min: min.unwrap_or(computed.min),
                    max: max.unwrap_or(computed.max),
                }
            }
        };

        let granularity = self.resolver.resolve(&payload.metadata);
        let code = self.codes.code_for(granularity);
        debug!(%granularity, code, "Fetching geography overlay");
        let overlay = geography.fetch_geography(code).await?;

        Ok(MapSpec {
            map_name: registered_map_name(&self.map_name, code),
            granularity,
            geography: overlay,
            range,
            data: data.to_vec(),
        })
    }
}

/// Each overlay gets its own registered name so maps of different granularity can share a page.
pub fn registered_map_name(map_name: &str, code: &str) -> String {
    format!("{map_name}_{code}")
}

pub async fn build(
    family: ChartFamily,
    payload: &IndicatorPayload,
    geography: &dyn GeographySource,
) -> BuildResult<RenderSpec> {
    SpecBuilder::default().build(family, payload, geography).await
}
