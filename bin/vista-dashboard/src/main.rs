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

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vista::{
    Dashboard, DashboardConfig, FilterOutcome, HttpBackend, PlotStatus, RawDumpRenderer,
    RenderDispatcher, SpecBuilder,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // from_env loads .env before reading VISTA_* variables.
    let config = args.apply(DashboardConfig::from_env()?)?;
    info!(api_base = %config.api_base, page_limit = config.page_limit, "Starting dashboard");

    let backend = HttpBackend::new(&config.api_base, config.request_timeout)?;
    let mut dispatcher = RenderDispatcher::default();
    if args.raw_dump {
        dispatcher = dispatcher.with_fallback(Arc::new(RawDumpRenderer));
    }
    let mut dashboard = Dashboard::new(backend)
        .with_page_limit(config.page_limit)
        .with_builder(SpecBuilder::new(config.map_codes.clone(), config.map_name.clone()))
        .with_dispatcher(dispatcher);

    let mut summary = dashboard
        .load()
        .await
        .context("Failed to load the indicator list")?;
    let mut failed = count_failures(&summary.plotted);
    for _ in 1..args.pages.max(1) {
        if !summary.has_more {
            break;
        }
        summary = dashboard.load_more().await?;
        failed += count_failures(&summary.plotted);
    }

    if let Some(id) = args.indicator_id() {
        match dashboard.apply_filters(&id, &args.selections()).await? {
            FilterOutcome::NothingSelected => warn!(indicator = %id, "No filter selected"),
            FilterOutcome::Applied(report) => {
                info!(target_id = %report.target, status = ?report.status, "Filters applied")
            }
            FilterOutcome::Failed(reason) => {
                warn!(indicator = %id, %reason, "Filtered query failed, keeping previous chart")
            }
        }
    }

    let html = dashboard.to_html(&args.title);
    std::fs::write(&args.output, html)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} charts to {} ({} failed, more available: {})",
        dashboard.board().len(),
        args.output.display(),
        failed,
        dashboard.cursor().has_more()
    );
    Ok(())
}

fn count_failures(reports: &[vista::PlotReport]) -> usize {
    reports
        .iter()
        .filter(|r| {
            matches!(
                r.status,
                PlotStatus::BuildFailed(_) | PlotStatus::RenderFailed(_)
            )
        })
        .count()
}
