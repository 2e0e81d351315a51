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

use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::dashboard::DEFAULT_PAGE_LIMIT;
use crate::error::{ConfigError, ConfigResult};
use crate::region::MapCodes;
use crate::spec_builder::DEFAULT_MAP_NAME;

pub const DEFAULT_API_BASE: &str = "http://localhost:8002";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_base: String,
    pub page_limit: usize,
    /// Unset means requests wait as long as the backend takes.
    pub request_timeout: Option<Duration>,
    pub map_name: String,
    pub map_codes: MapCodes,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout: None,
            map_name: DEFAULT_MAP_NAME.to_string(),
            map_codes: MapCodes::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads `VISTA_*` variables, loading a `.env` file first when present.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base) = lookup("VISTA_API_BASE") {
            config.api_base = base;
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "VISTA_PAGE_LIMIT")? {
            config.page_limit = limit;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "VISTA_TIMEOUT_SECS")? {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(name) = lookup("VISTA_MAP_NAME") {
            config.map_name = name;
        }
        if let Some(code) = lookup("VISTA_MAP_CODE_MUNICIPALITY") {
            config.map_codes.municipality = code;
        }
        if let Some(code) = lookup("VISTA_MAP_CODE_MACRO_REGION") {
            config.map_codes.macro_region = code;
        }
        if let Some(code) = lookup("VISTA_MAP_CODE_HEALTH_REGION") {
            config.map_codes.health_region = code;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Url::parse(&self.api_base).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base.clone(),
            reason: e.to_string(),
        })?;
        if self.page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_limit".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.api_base, "http://localhost:8002");
        assert_eq!(config.page_limit, 10);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn variables_override_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("VISTA_API_BASE", "http://api.saude.go:9000"),
            ("VISTA_PAGE_LIMIT", "25"),
            ("VISTA_TIMEOUT_SECS", "30"),
            ("VISTA_MAP_CODE_MUNICIPALITY", "DF_mun"),
        ]))
        .unwrap();
        assert_eq!(config.page_limit, 25);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.map_codes.municipality, "DF_mun");
        assert_eq!(config.map_codes.health_region, "GO_reg");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = DashboardConfig::from_lookup(lookup(&[("VISTA_PAGE_LIMIT", "ten")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "VISTA_PAGE_LIMIT"));
        let err = DashboardConfig::from_lookup(lookup(&[("VISTA_API_BASE", "::")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
