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

use thiserror::Error;

use crate::classifier::ChartFamily;

#[derive(Error, Debug)]
pub enum VistaError {
    #[error("Fetch failure: {0}")]
    Fetch(#[from] FetchError),
    #[error("Chart build error: {0}")]
    Build(#[from] BuildError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
}
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to '{url}' failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Request to '{url}' could not be sent: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Response from '{url}' could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Line chart requires xAxis.data")]
    MissingAxisData,
    #[error("Line chart requires at least one series")]
    EmptySeries,
    #[error("Map chart requires data in the first series")]
    NoMapData,
    #[error("Map datum {index} has no numeric value (found {found})")]
    NonNumericValue { index: usize, found: String },
    #[error("Geography overlay unavailable: {0}")]
    Geography(#[from] FetchError),
}
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer for '{family}' cannot draw a {spec} spec")]
    SpecMismatch {
        family: ChartFamily,
        spec: &'static str,
    },
}
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("A filter request is already in flight for '{target}'")]
    FilterInFlight { target: String },
    #[error("Indicator '{id}' has no card on the dashboard")]
    UnknownIndicator { id: String },
}
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, VistaError>;
pub type FetchResult<T> = std::result::Result<T, FetchError>;
pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type RenderResult<T> = std::result::Result<T, RenderError>;
pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl VistaError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VistaError::Build(_)
                | VistaError::Render(_)
                | VistaError::Dashboard(DashboardError::FilterInFlight { .. })
        )
    }
    pub fn category(&self) -> &'static str {
        match self {
            VistaError::Fetch(_) => "Fetch",
            VistaError::Build(_) => "Build",
            VistaError::Render(_) => "Render",
            VistaError::Dashboard(_) => "Dashboard",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            VistaError::Fetch(_) | VistaError::Build(BuildError::Geography(_)) => {
                crate::dashboard::INLINE_ERROR_MESSAGE.to_string()
            }
            VistaError::Build(BuildError::NoMapData) => {
                "Nenhum dado encontrado para o mapa".to_string()
            }
            VistaError::Dashboard(DashboardError::FilterInFlight { .. }) => {
                "Aguarde a conclusão da filtragem atual.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
