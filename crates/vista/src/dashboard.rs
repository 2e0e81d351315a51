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

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::board::ChartBoard;
use crate::classifier::{classify, ChartFamily, Classification};
use crate::client::{GeographySource, IndicatorSource};
use crate::controls::FilterControls;
use crate::error::{DashboardError, Result, VistaError};
use crate::filter_form::{FilterForm, InfoSheet};
use crate::payload::{IndicatorId, IndicatorPage, IndicatorPayload};
use crate::query::{encode, FilterSelections};
use crate::render::{RenderDispatcher, RenderOutcome};
use crate::spec_builder::SpecBuilder;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const INLINE_ERROR_MESSAGE: &str = "Erro ao carregar dados. Veja console.";
/// Target passed to the error sink for failures not tied to one chart.
pub const DASHBOARD_TARGET: &str = "dashboard";

pub trait ErrorSink: Send + Sync {
    fn report(&self, target: &str, error: &VistaError);
}

impl<F> ErrorSink for F
where
    F: Fn(&str, &VistaError) + Send + Sync,
{
    fn report(&self, target: &str, error: &VistaError) {
        self(target, error)
    }
}

pub struct LogSink;

impl ErrorSink for LogSink {
    fn report(&self, target: &str, error: &VistaError) {
        error!(target_id = target, category = error.category(), "{error}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    offset: usize,
    limit: usize,
    total: Option<usize>,
}

impl PageCursor {
    pub fn new(limit: usize) -> Self {
        Self {
            offset: 0,
            limit: limit.max(1),
            total: None,
        }
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn limit(&self) -> usize {
        self.limit
    }
    pub fn total(&self) -> Option<usize> {
        self.total
    }
    pub fn reset(&mut self) {
        self.offset = 0;
        self.total = None;
    }
    pub fn advance(&mut self) {
        self.offset += self.limit;
    }
    /// A short page without a reported total means the listing ended there.
    pub fn record(&mut self, page: &IndicatorPage) {
        self.total = page.total.or_else(|| {
            (page.indicators.len() < self.limit).then(|| self.offset + page.indicators.len())
        });
    }
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => self.offset + self.limit < total,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub indicator_id: IndicatorId,
    pub target: String,
    pub title: String,
    pub caption: Option<String>,
    pub payload: IndicatorPayload,
    pub family: Option<ChartFamily>,
    /// Inline error marker shown over the chart.
    pub error: Option<String>,
    pub controls: FilterControls,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotStatus {
    Drawn { revision: u64 },
    Skipped,
    BuildFailed(String),
    RenderFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotReport {
    pub target: String,
    pub classification: Classification,
    pub status: PlotStatus,
    /// Text for the card's inline error marker when the plot failed.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub offset: usize,
    pub plotted: Vec<PlotReport>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    NothingSelected,
    Applied(PlotReport),
    Failed(String),
}

pub struct Dashboard<S> {
    source: S,
    builder: SpecBuilder,
    dispatcher: RenderDispatcher,
    board: ChartBoard,
    cards: IndexMap<String, Card>,
    cursor: PageCursor,
    sink: Arc<dyn ErrorSink>,
}

impl<S> Dashboard<S>
where
    S: IndicatorSource + GeographySource,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            builder: SpecBuilder::default(),
            dispatcher: RenderDispatcher::default(),
            board: ChartBoard::new(),
            cards: IndexMap::new(),
            cursor: PageCursor::new(DEFAULT_PAGE_LIMIT),
            sink: Arc::new(LogSink),
        }
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.cursor = PageCursor::new(limit);
        self
    }

    pub fn with_builder(mut self, builder: SpecBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: RenderDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn board(&self) -> &ChartBoard {
        &self.board
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    pub fn card(&self, id: &IndicatorId) -> Option<&Card> {
        self.cards.get(&id.chart_target())
    }

    pub fn controls_enabled(&self, id: &IndicatorId) -> bool {
        self.card(id).map_or(true, |card| card.controls.is_enabled())
    }

    pub fn filter_form(&self, id: &IndicatorId) -> Option<FilterForm> {
        self.card(id).map(|card| FilterForm::from_payload(&card.payload))
    }

    pub fn info_sheet(&self, id: &IndicatorId) -> Option<InfoSheet> {
        self.card(id)
            .map(|card| InfoSheet::from_metadata(&card.payload.metadata))
    }

    pub fn to_html(&self, title: &str) -> String {
        crate::page::render_page(title, self.cards(), &self.board)
    }

    /// Replaces every card with the first page of indicators.
    pub async fn load(&mut self) -> Result<LoadSummary> {
        self.cursor.reset();
        self.load_page(false).await
    }

    pub async fn load_more(&mut self) -> Result<LoadSummary> {
        if !self.cursor.has_more() {
            return Ok(LoadSummary {
                offset: self.cursor.offset(),
                plotted: Vec::new(),
                has_more: false,
            });
        }
        self.cursor.advance();
        self.load_page(true).await
    }

    async fn load_page(&mut self, append: bool) -> Result<LoadSummary> {
        let offset = self.cursor.offset();
        let page = match self
            .source
            .list_indicators(self.cursor.limit(), offset)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                let err = VistaError::Fetch(e);
                self.report(DASHBOARD_TARGET, &err);
                return Err(err);
            }
        };
        self.cursor.record(&page);
        info!(
            offset,
            count = page.indicators.len(),
            total = ?self.cursor.total(),
            "Loaded indicator page"
        );

        if !append {
            self.cards.clear();
            self.board.clear();
        }

        let mut plotted = Vec::with_capacity(page.indicators.len());
        for id in &page.indicators {
            let payload = match self.source.fetch_indicator(id).await {
                Ok(payload) => payload,
                Err(e) => {
                    let err = VistaError::Fetch(e);
                    self.report(&id.chart_target(), &err);
                    return Err(err);
                }
            };
            plotted.push(self.show(id, payload).await);
        }

        Ok(LoadSummary {
            offset,
            plotted,
            has_more: self.cursor.has_more(),
        })
    }

    /// Creates or refreshes the card for `id` and plots the payload into it.
    pub async fn show(&mut self, id: &IndicatorId, payload: IndicatorPayload) -> PlotReport {
        let target = id.chart_target();
        let card = self
            .cards
            .entry(target.clone())
            .or_insert_with(|| Card {
                indicator_id: id.clone(),
                target: target.clone(),
                title: String::new(),
                caption: None,
                payload: IndicatorPayload::default(),
                family: None,
                error: None,
                controls: FilterControls::new(),
            });
        card.title = payload.metadata.nome.clone();
        card.caption = payload.metadata.ficha.complemento.clone();
        card.error = None;
        card.payload = payload;

        let payload = card.payload.clone();
        let report = self.plot(&target, &payload).await;
        if let Some(card) = self.cards.get_mut(&target) {
            card.family = Some(report.classification.family);
        }
        report
    }

    /// classify, build, dispatch. Failures are reported and leave the target as it was.
    pub async fn plot(&mut self, target: &str, payload: &IndicatorPayload) -> PlotReport {
        let classification = classify(payload);
        if classification.is_fallback() {
            warn!(
                target_id = target,
                "Chart type not identified, using 'line' as fallback"
            );
        }
        let family = classification.family;

        let spec = match self.builder.build(family, payload, &self.source).await {
            Ok(spec) => spec,
            Err(e) => {
                let message = e.to_string();
                let err = VistaError::Build(e);
                self.report(target, &err);
                return PlotReport {
                    target: target.to_string(),
                    classification,
                    status: PlotStatus::BuildFailed(message),
                    notice: Some(err.user_message()),
                };
            }
        };

        let mut notice = None;
        let status = match self
            .dispatcher
            .render(&mut self.board, target, family, &spec)
            .await
        {
            Ok(RenderOutcome::Drawn { revision }) => PlotStatus::Drawn { revision },
            Ok(RenderOutcome::Skipped) => PlotStatus::Skipped,
            Err(e) => {
                let message = e.to_string();
                let err = VistaError::Render(e);
                self.report(target, &err);
                notice = Some(err.user_message());
                PlotStatus::RenderFailed(message)
            }
        };

        PlotReport {
            target: target.to_string(),
            classification,
            status,
            notice,
        }
    }

    /// Re-queries one indicator with the selected filters and re-plots only its chart.
    /// When the fetch or the plot fails, the card keeps its previous payload and chart
    /// and gets an inline error marker.
    pub async fn apply_filters(
        &mut self,
        id: &IndicatorId,
        selections: &FilterSelections,
    ) -> Result<FilterOutcome> {
        let target = id.chart_target();
        let controls = match self.cards.get(&target) {
            Some(card) => card.controls.clone(),
            None => {
                return Err(DashboardError::UnknownIndicator { id: id.to_string() }.into());
            }
        };

        let query = encode(selections);
        if query.is_empty() {
            return Ok(FilterOutcome::NothingSelected);
        }

        let _guard = controls.try_acquire(&target)?;
        info!(target_id = %target, query = %query, "Applying filters");

        match self.source.fetch_filtered(id, &query).await {
            Ok(payload) => {
                let previous = self.cards.get(&target).cloned();
                let report = self.show(id, payload).await;
                let Some(notice) = report.notice.clone() else {
                    return Ok(FilterOutcome::Applied(report));
                };
                if let (Some(card), Some(previous)) = (self.cards.get_mut(&target), previous) {
                    card.title = previous.title;
                    card.caption = previous.caption;
                    card.payload = previous.payload;
                    card.family = previous.family;
                    card.error = Some(notice);
                }
                let message = match report.status {
                    PlotStatus::BuildFailed(message) | PlotStatus::RenderFailed(message) => message,
                    PlotStatus::Drawn { .. } | PlotStatus::Skipped => String::new(),
                };
                Ok(FilterOutcome::Failed(message))
            }
            Err(e) => {
                let message = e.to_string();
                let err = VistaError::Fetch(e);
                if let Some(card) = self.cards.get_mut(&target) {
                    card.error = Some(err.user_message());
                }
                self.report(&target, &err);
                Ok(FilterOutcome::Failed(message))
            }
        }
    }

    fn report(&self, target: &str, error: &VistaError) {
        self.sink.report(target, error);
    }
}
