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

use serde_json::json;
use std::time::Duration;
use vista::error::FetchError;
use vista::query::{encode, filter_field, FilterSelections};
use vista::{GeographySource, HttpBackend, IndicatorId, IndicatorSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn lists_indicators_with_limit_and_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indicators"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indicators": [21, "22", 23],
            "total": 23,
            "limit": 10,
            "offset": 20
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), None).unwrap();
    let page = backend.list_indicators(10, 20).await.unwrap();

    assert_eq!(
        page.indicators,
        vec![
            IndicatorId::from(21),
            IndicatorId::from("22"),
            IndicatorId::from(23)
        ]
    );
    assert_eq!(page.total, Some(23));
}

#[tokio::test]
async fn fetches_indicator_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indicators/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"id": 7, "nome": "Mortalidade infantil", "ficha": null, "filtros": null},
            "data_example": {"option_echarts": {"xAxis": {"data": ["2023"]}, "series": [{"data": [4]}]}}
        })))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), Some(Duration::from_secs(5))).unwrap();
    let payload = backend.fetch_indicator(&IndicatorId::from(7)).await.unwrap();

    assert_eq!(payload.metadata.id, IndicatorId::from(7));
    assert_eq!(payload.metadata.nome, "Mortalidade infantil");
    assert!(payload.metadata.filtros.is_empty());
    assert_eq!(payload.option().series.len(), 1);
}

#[tokio::test]
async fn filtered_fetch_sends_encoded_selections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indicators/3/filter"))
        .and(query_param("nome_option_f1", "Centro Oeste"))
        .and(query_param("nome_option_f1", "Abadiânia"))
        .and(query_param("nome_option_f2", "2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"id": 3, "nome": "Filtrado"},
            "data_example": {
                "option_echarts": {"xAxis": {"data": ["2025"]}, "series": [{"data": [1]}]},
                "applyed_filters": [{"id_filtro": 1, "id_option": ["Centro Oeste"]}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut selections = FilterSelections::new();
    selections.insert(
        filter_field(1),
        vec!["Centro Oeste".to_string(), "Abadiânia".to_string()],
    );
    selections.insert(filter_field(2), vec!["2025".to_string()]);

    let backend = HttpBackend::new(&server.uri(), None).unwrap();
    let payload = backend
        .fetch_filtered(&IndicatorId::from(3), &encode(&selections))
        .await
        .unwrap();

    assert_eq!(payload.metadata.nome, "Filtrado");
    let applied = payload.data_example.applyed_filters.unwrap();
    assert_eq!(applied[0].id_filtro, 1);
}

#[tokio::test]
async fn fetches_geography_by_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/GO_mac"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"type": "FeatureCollection", "features": []})),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&format!("{}/", server.uri()), None).unwrap();
    let geography = backend.fetch_geography("GO_mac").await.unwrap();
    assert_eq!(geography["type"], json!("FeatureCollection"));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indicators/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Indicator not found"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), None).unwrap();
    let err = backend
        .fetch_indicator(&IndicatorId::from(404))
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, body, url } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Indicator not found");
            assert!(url.ends_with("/indicators/404"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indicators"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(&server.uri(), None).unwrap();
    let err = backend.list_indicators(10, 0).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
    let err = backend.list_indicators(10, 0).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}
