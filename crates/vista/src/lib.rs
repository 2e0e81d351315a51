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

pub mod board;
pub mod classifier;
pub mod client;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod error;
pub mod filter_form;
pub mod page;
pub mod payload;
pub mod query;
pub mod region;
pub mod render;
pub mod spec_builder;

pub use board::{ChartBoard, ChartContent, ChartInstance};
pub use classifier::{classify, ChartFamily, Classification, ClassificationRule};
pub use client::{GeographySource, HttpBackend, IndicatorSource};
pub use config::DashboardConfig;
pub use controls::{ControlGuard, FilterControls};
pub use dashboard::{
    Card, Dashboard, ErrorSink, FilterOutcome, LoadSummary, LogSink, PageCursor, PlotReport,
    PlotStatus,
};
pub use error::{
    BuildError, ConfigError, DashboardError, FetchError, RenderError, Result, VistaError,
};
pub use filter_form::{FilterField, FilterForm, InfoSheet};
pub use payload::{
    AppliedFilter, ChartOption, ExampleData, FilterOption, FilterSpec, IndicatorId,
    IndicatorPage, IndicatorPayload, Metadata, Series,
};
pub use query::{decode, encode, FilterSelections};
pub use region::{resolve_granularity, GranularityResolver, MapCodes, MapGranularity};
pub use render::{ChartRenderer, RawDumpRenderer, RenderDispatcher, RenderOutcome};
pub use spec_builder::{build, RenderSpec, SpecBuilder, ValueRange};
