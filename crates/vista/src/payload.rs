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

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::region::MapGranularity;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Backend identifiers arrive either as JSON numbers or as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorId {
    Number(i64),
    Text(String),
}
impl IndicatorId {
    pub fn chart_target(&self) -> String {
        format!("chart_{self}")
    }
}
impl Default for IndicatorId {
    fn default() -> Self {
        IndicatorId::Text(String::new())
    }
}
impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorId::Number(n) => write!(f, "{n}"),
            IndicatorId::Text(s) => f.write_str(s),
        }
    }
}
impl From<i64> for IndicatorId {
    fn from(value: i64) -> Self {
        IndicatorId::Number(value)
    }
}
impl From<&str> for IndicatorId {
    fn from(value: &str) -> Self {
        IndicatorId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPayload {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub data_example: ExampleData,
}
impl IndicatorPayload {
    pub fn option(&self) -> &ChartOption {
        &self.data_example.option_echarts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub id: IndicatorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_grafico: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularidade: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ficha: Ficha,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filtros: Vec<FilterSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
impl Metadata {
    pub fn chart_type_hint(&self) -> Option<&str> {
        self.chart_type.as_ref().and_then(Value::as_str)
    }
    pub fn tipo_grafico_hint(&self) -> Option<&str> {
        self.tipo_grafico.as_ref().and_then(Value::as_str)
    }
    /// Typed granularity, when the upstream payload carries one.
    pub fn granularity_hint(&self) -> Option<MapGranularity> {
        self.granularidade
            .as_ref()
            .and_then(Value::as_str)
            .and_then(MapGranularity::from_hint)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ficha {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_ficha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitacoes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub id_filtro: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome_filtro: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub nome_option: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
impl FilterOption {
    pub fn value(&self) -> String {
        value_to_option_string(&self.nome_option)
    }
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => self.value(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub option_echarts: ChartOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applyed_filters: Option<Vec<AppliedFilter>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppliedFilter {
    pub id_filtro: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id_option: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartOption {
    #[serde(rename = "xAxis", default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Vec<Series>,
    #[serde(rename = "visualMap", default, skip_serializing_if = "Option::is_none")]
    pub visual_map: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
impl ChartOption {
    /// Category labels of the first x-axis; ECharts accepts an axis object or a list of them.
    pub fn x_axis_data(&self) -> Option<&Vec<Value>> {
        let axis = match self.x_axis.as_ref()? {
            Value::Array(axes) => axes.first()?,
            other => other,
        };
        axis.get("data").and_then(Value::as_array)
    }
    pub fn visual_map_bounds(&self) -> (Option<f64>, Option<f64>) {
        let visual_map = match self.visual_map.as_ref() {
            Some(Value::Array(maps)) => maps.first(),
            other => other,
        };
        match visual_map {
            Some(vm) => (
                vm.get("min").and_then(Value::as_f64),
                vm.get("max").and_then(Value::as_f64),
            ),
            None => (None, None),
        }
    }
    pub fn first_series(&self) -> Option<&Series> {
        self.series.first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
impl Series {
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_ref().and_then(Value::as_str)
    }
    pub fn data_points(&self) -> &[Value] {
        match &self.data {
            Some(Value::Array(points)) => points,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub indicators: Vec<IndicatorId>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Truthiness as the dashboard scripts see it: `null`, `false`, `0` and `""` are absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn is_present(value: Option<&Value>) -> bool {
    value.is_some_and(is_truthy)
}

/// String form of an option value, so that `2025.0` and `2025` select the same option.
pub fn value_to_option_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
                    Some(f) => f.to_string(),
                    None => n.to_string(),
                }
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
