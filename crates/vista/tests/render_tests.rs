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
use serde_json::{json, Value};
use std::sync::Arc;
use vista::error::FetchResult;
use vista::page::charts_script;
use vista::render::{LineRenderer, MapRenderer, UnsupportedFamily};
use vista::{
    classify, ChartBoard, ChartContent, ChartFamily, ChartRenderer, GeographySource,
    IndicatorPayload, RawDumpRenderer, RenderDispatcher, RenderOutcome, SpecBuilder,
};

struct StaticGeography;

#[async_trait]
impl GeographySource for StaticGeography {
    async fn fetch_geography(&self, code: &str) -> FetchResult<Value> {
        Ok(json!({"type": "FeatureCollection", "features": [], "code": code}))
    }
}

fn map_payload() -> IndicatorPayload {
    serde_json::from_value(json!({
        "metadata": {"id": 9, "nome": "Mapa", "geojson": true},
        "data_example": {"option_echarts": {
            "series": [{"type": "map", "data": [{"name": "A", "value": 1}, {"name": "B", "value": 9}]}]
        }}
    }))
    .unwrap()
}

fn line_payload() -> IndicatorPayload {
    serde_json::from_value(json!({
        "metadata": {"id": 9, "nome": "Linha"},
        "data_example": {"option_echarts": {
            "xAxis": {"data": ["2022", "2023"]},
            "series": [{"data": [3, 4]}]
        }}
    }))
    .unwrap()
}

async fn draw(
    dispatcher: &RenderDispatcher,
    board: &mut ChartBoard,
    payload: &IndicatorPayload,
) -> RenderOutcome {
    let family = classify(payload).family;
    let spec = SpecBuilder::default()
        .build(family, payload, &StaticGeography)
        .await
        .unwrap();
    dispatcher
        .render(board, "chart_9", family, &spec)
        .await
        .unwrap()
}

#[tokio::test]
async fn rerender_replaces_previous_option_entirely() {
    let dispatcher = RenderDispatcher::default();
    let mut board = ChartBoard::new();

    let first = draw(&dispatcher, &mut board, &map_payload()).await;
    assert_eq!(first, RenderOutcome::Drawn { revision: 1 });
    let instance = board.instance("chart_9").unwrap();
    assert_eq!(instance.family, ChartFamily::Map);
    assert!(instance.option().unwrap().get("visualMap").is_some());
    assert!(board.registered_map("goias_GO_reg").is_some());

    let second = draw(&dispatcher, &mut board, &line_payload()).await;
    assert_eq!(second, RenderOutcome::Drawn { revision: 2 });
    let instance = board.instance("chart_9").unwrap();
    assert_eq!(instance.family, ChartFamily::Line);
    let option = instance.option().unwrap();
    assert!(option.get("visualMap").is_none());
    assert_eq!(option["series"][0]["type"], json!("line"));
    assert_eq!(option["xAxis"]["data"], json!(["2022", "2023"]));
    assert_eq!(board.len(), 1);
}

#[tokio::test]
async fn default_routes_cover_line_and_map() {
    let dispatcher = RenderDispatcher::default();
    assert_eq!(dispatcher.renderer_for(ChartFamily::Line).name(), LineRenderer.name());
    assert_eq!(dispatcher.renderer_for(ChartFamily::Map).name(), MapRenderer.name());
    assert_eq!(
        dispatcher.renderer_for(ChartFamily::Scatter).name(),
        UnsupportedFamily.name()
    );
}

#[tokio::test]
async fn unsupported_family_leaves_previous_chart() {
    let dispatcher = RenderDispatcher::default();
    let mut board = ChartBoard::new();
    draw(&dispatcher, &mut board, &line_payload()).await;

    let bar: IndicatorPayload = serde_json::from_value(json!({
        "data_example": {"option_echarts": {"series": [{"type": "bar", "data": [1]}]}}
    }))
    .unwrap();
    let outcome = draw(&dispatcher, &mut board, &bar).await;

    assert_eq!(outcome, RenderOutcome::Skipped);
    let instance = board.instance("chart_9").unwrap();
    assert_eq!(instance.family, ChartFamily::Line);
    assert_eq!(instance.revision, 1);
}

#[tokio::test]
async fn custom_route_overrides_fallback() {
    let dispatcher = RenderDispatcher::default()
        .with_route(ChartFamily::Bar, Arc::new(RawDumpRenderer) as Arc<dyn ChartRenderer>);
    let mut board = ChartBoard::new();

    let bar: IndicatorPayload = serde_json::from_value(json!({
        "data_example": {"option_echarts": {"series": [{"type": "bar", "data": [1, 5]}]}}
    }))
    .unwrap();
    let outcome = draw(&dispatcher, &mut board, &bar).await;

    assert_eq!(outcome, RenderOutcome::Drawn { revision: 1 });
    match &board.instance("chart_9").unwrap().content {
        ChartContent::Dump(text) => assert!(text.contains("\"bar\"")),
        other => panic!("expected a dump, got {other:?}"),
    }
}

#[tokio::test]
async fn maps_of_different_granularity_keep_their_own_overlay() {
    let dispatcher = RenderDispatcher::default();
    let mut board = ChartBoard::new();
    let municipal: IndicatorPayload = serde_json::from_value(json!({
        "metadata": {"id": 1, "nome": "Casos por município"},
        "data_example": {"option_echarts": {
            "series": [{"type": "map", "data": [{"name": "Goiânia", "value": 4}]}]
        }}
    }))
    .unwrap();

    for (target, payload) in [("chart_1", municipal), ("chart_2", map_payload())] {
        let spec = SpecBuilder::default()
            .build(ChartFamily::Map, &payload, &StaticGeography)
            .await
            .unwrap();
        dispatcher
            .render(&mut board, target, ChartFamily::Map, &spec)
            .await
            .unwrap();
    }

    assert_eq!(board.registered_map("goias_GO_mun").unwrap()["code"], json!("GO_mun"));
    assert_eq!(board.registered_map("goias_GO_reg").unwrap()["code"], json!("GO_reg"));
    let series_map = |target: &str| {
        board.instance(target).unwrap().option().unwrap()["series"][0]["map"].clone()
    };
    assert_eq!(series_map("chart_1"), json!("goias_GO_mun"));
    assert_eq!(series_map("chart_2"), json!("goias_GO_reg"));

    let script = charts_script(&board);
    assert!(script.contains("echarts.registerMap(\"goias_GO_mun\""));
    assert!(script.contains("echarts.registerMap(\"goias_GO_reg\""));
}
