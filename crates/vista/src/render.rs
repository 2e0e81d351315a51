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

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::board::{ChartBoard, ChartContent};
use crate::classifier::ChartFamily;
use crate::error::{RenderError, RenderResult};
use crate::spec_builder::RenderSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn { revision: u64 },
    Skipped,
}

#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(
        &self,
        board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome>;

    fn name(&self) -> &'static str;
}

pub struct LineRenderer;

#[async_trait]
impl ChartRenderer for LineRenderer {
    async fn render(
        &self,
        board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome> {
        let RenderSpec::Line(line) = spec else {
            return Err(RenderError::SpecMismatch {
                family,
                spec: spec.kind(),
            });
        };
        let revision = board.set_option(target, ChartFamily::Line, line.to_option());
        Ok(RenderOutcome::Drawn { revision })
    }

    fn name(&self) -> &'static str {
        "line"
    }
}

pub struct MapRenderer;

#[async_trait]
impl ChartRenderer for MapRenderer {
    async fn render(
        &self,
        board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome> {
        let RenderSpec::Map(map) = spec else {
            return Err(RenderError::SpecMismatch {
                family,
                spec: spec.kind(),
            });
        };
        board.register_map(&map.map_name, map.geography.clone());
        let revision = board.set_option(target, ChartFamily::Map, map.to_option());
        Ok(RenderOutcome::Drawn { revision })
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

/// Families that are classified but have no renderer: warn and leave the target alone.
pub struct UnsupportedFamily;

#[async_trait]
impl ChartRenderer for UnsupportedFamily {
    async fn render(
        &self,
        _board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        _spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome> {
        warn!(target_id = target, %family, "No renderer for chart family, skipping");
        Ok(RenderOutcome::Skipped)
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

/// Writes the spec's option as pretty-printed JSON into the target.
pub struct RawDumpRenderer;

#[async_trait]
impl ChartRenderer for RawDumpRenderer {
    async fn render(
        &self,
        board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome> {
        let option = spec.to_option();
        let dump = serde_json::to_string_pretty(&option).unwrap_or_else(|_| option.to_string());
        let revision = board.set_content(target, family, ChartContent::Dump(dump));
        Ok(RenderOutcome::Drawn { revision })
    }

    fn name(&self) -> &'static str {
        "raw-dump"
    }
}

pub struct RenderDispatcher {
    routes: HashMap<ChartFamily, Arc<dyn ChartRenderer>>,
    fallback: Arc<dyn ChartRenderer>,
}

impl Default for RenderDispatcher {
    fn default() -> Self {
        let mut routes: HashMap<ChartFamily, Arc<dyn ChartRenderer>> = HashMap::new();
        routes.insert(ChartFamily::Line, Arc::new(LineRenderer));
        routes.insert(ChartFamily::Map, Arc::new(MapRenderer));
        Self {
            routes,
            fallback: Arc::new(UnsupportedFamily),
        }
    }
}

impl RenderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, family: ChartFamily, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.routes.insert(family, renderer);
        self
    }

    pub fn with_fallback(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.fallback = renderer;
        self
    }

    pub fn renderer_for(&self, family: ChartFamily) -> &dyn ChartRenderer {
        self.routes
            .get(&family)
            .map_or(self.fallback.as_ref(), |renderer| renderer.as_ref())
    }

    pub async fn render(
        &self,
        board: &mut ChartBoard,
        target: &str,
        family: ChartFamily,
        spec: &RenderSpec,
    ) -> RenderResult<RenderOutcome> {
        let renderer = self.renderer_for(family);
        debug!(target_id = target, %family, renderer = renderer.name(), "Dispatching render");
        renderer.render(board, target, family, spec).await
    }
}
