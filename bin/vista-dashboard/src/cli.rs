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

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use vista::query::filter_field;
use vista::{ConfigError, DashboardConfig, FilterSelections, IndicatorId};

#[derive(Parser, Debug, Clone)]
#[command(name = "vista-dashboard")]
#[command(about = "Fetches indicators from the backend and writes an ECharts dashboard page")]
pub struct Args {
    /// Backend base URL, overrides VISTA_API_BASE
    #[arg(short, long)]
    pub api_base: Option<String>,

    /// Indicators per page, overrides VISTA_PAGE_LIMIT
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// How many pages to load before writing the page
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,

    /// Request timeout in seconds, 0 disables it
    #[arg(short, long)]
    pub timeout: Option<u64>,

    #[arg(short, long, default_value = "dashboard.html")]
    pub output: PathBuf,

    #[arg(long, default_value = "Painel de Indicadores")]
    pub title: String,

    /// Indicator to re-query with --filter selections
    #[arg(short, long)]
    pub indicator: Option<String>,

    /// Filter selection as FILTER=VALUE, repeatable. FILTER is a filter id or a full field name.
    #[arg(short, long = "filter", value_parser = parse_selection)]
    pub filters: Vec<(String, String)>,

    /// Dump the option JSON for chart families without a renderer
    #[arg(long)]
    pub raw_dump: bool,

    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Command-line values win over the environment.
    pub fn apply(&self, mut config: DashboardConfig) -> Result<DashboardConfig, ConfigError> {
        if let Some(base) = &self.api_base {
            config.api_base = base.clone();
        }
        if let Some(limit) = self.limit {
            config.page_limit = limit;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn indicator_id(&self) -> Option<IndicatorId> {
        self.indicator.as_deref().map(|raw| match raw.parse::<i64>() {
            Ok(n) => IndicatorId::from(n),
            Err(_) => IndicatorId::from(raw),
        })
    }

    pub fn selections(&self) -> FilterSelections {
        let mut selections = FilterSelections::new();
        for (field, value) in &self.filters {
            selections
                .entry(field.clone())
                .or_default()
                .push(value.clone());
        }
        selections
    }
}

fn parse_selection(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FILTER=VALUE, got '{raw}'"))?;
    let field = match key.trim().parse::<i64>() {
        Ok(id) => filter_field(id),
        Err(_) => key.trim().to_string(),
    };
    Ok((field, value.to_string()))
}
