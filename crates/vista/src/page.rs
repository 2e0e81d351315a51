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

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde_json::Value;

use crate::board::{ChartBoard, ChartContent};
use crate::dashboard::Card;
use crate::filter_form::{FilterForm, InfoSheet, NO_FILTERS_MESSAGE};

pub const ECHARTS_CDN: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

fn script_json(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

pub const FILTERS_READ_ONLY_NOTE: &str =
    "Filtros aplicados ao gerar esta página; use --filter para alterá-los.";

/// Read-only view of the filter selection; a static page has no way to re-query the backend.
fn filter_view(form: &FilterForm) -> Markup {
    html! {
        fieldset class="filters" disabled {
            @if form.is_empty() {
                p class="text-muted" { (NO_FILTERS_MESSAGE) }
            } @else {
                small class="text-muted" { (FILTERS_READ_ONLY_NOTE) }
            }
            @for field in &form.fields {
                label for=(field.field) { (field.label) }
                @if let Some(description) = &field.description {
                    small { (description) }
                }
                select id=(field.field) name=(field.field) multiple disabled {
                    @for choice in &field.options {
                        option value=(choice.value) selected[field.selected().contains(&choice.value)] {
                            (choice.label)
                        }
                    }
                }
            }
        }
    }
}

fn info_view(sheet: &InfoSheet) -> Markup {
    html! {
        details class="info" {
            summary { (sheet.title) }
            @for section in &sheet.sections {
                h6 { (section.title) }
                p { (section.text) }
            }
        }
    }
}

fn card_view(card: &Card, board: &ChartBoard) -> Markup {
    let dump = board.instance(&card.target).and_then(|i| match &i.content {
        ChartContent::Dump(text) => Some(text.as_str()),
        ChartContent::Option(_) => None,
    });
    html! {
        div class="card" data-indicator-id=(card.indicator_id.to_string()) {
            div class="card-body" data-chart-id=(card.target) style="position:relative" {
                h4 { (card.title) }
                @if let Some(message) = &card.error {
                    div class="chart-error" { (message) }
                }
                @if let Some(text) = dump {
                    pre id=(card.target) { (text) }
                } @else {
                    div id=(card.target) style="width:100%;height:380px;" {}
                }
                @if let Some(caption) = &card.caption {
                    small { (caption) }
                }
                (info_view(&InfoSheet::from_metadata(&card.payload.metadata)))
                (filter_view(&FilterForm::from_payload(&card.payload)))
            }
        }
    }
}

/// Script that registers every map and applies each option without merging.
pub fn charts_script(board: &ChartBoard) -> String {
    let mut lines = Vec::new();
    for (name, geography) in board.maps() {
        lines.push(format!(
            "echarts.registerMap({}, {});",
            script_json(&Value::String(name.to_string())),
            script_json(geography)
        ));
    }
    for (target, instance) in board.instances() {
        if let Some(option) = instance.option() {
            lines.push(format!(
                "echarts.init(document.getElementById({})).setOption({}, true);",
                script_json(&Value::String(target.to_string())),
                script_json(option)
            ));
        }
    }
    format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        lines.join("\n")
    )
}

pub fn render_page<'a>(
    title: &str,
    cards: impl IntoIterator<Item = &'a Card>,
    board: &ChartBoard,
) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="utf-8";
                title { (title) }
                script src=(ECHARTS_CDN) {}
            }
            body {
                main id="chartsContainer" {
                    @for card in cards {
                        (card_view(card, board))
                    }
                }
                script { (PreEscaped(charts_script(board))) }
            }
        }
    };
    markup.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ChartFamily;
    use crate::controls::FilterControls;
    use crate::payload::{IndicatorId, IndicatorPayload};
    use serde_json::json;

    #[test]
    fn script_escapes_closing_tags_and_disables_merge() {
        let mut board = ChartBoard::new();
        board.register_map("goias", json!({"type": "FeatureCollection"}));
        board.set_option(
            "chart_1",
            ChartFamily::Line,
            json!({"series": [{"name": "</script><b>"}]}),
        );
        let script = charts_script(&board);
        assert!(script.contains("echarts.registerMap(\"goias\""));
        assert!(script.contains("setOption("));
        assert!(script.contains(", true);"));
        assert!(!script.contains("</script>"));
    }

    #[test]
    fn filters_render_read_only_with_current_selection() {
        let payload: IndicatorPayload = serde_json::from_value(json!({
            "metadata": {
                "id": 5,
                "nome": "Óbitos",
                "filtros": [{
                    "id_filtro": 2,
                    "nome_filtro": "Ano",
                    "nome": "ano",
                    "options": [{"nome_option": 2024.0}, {"nome_option": 2025.0}]
                }]
            },
            "data_example": {
                "option_echarts": {},
                "applyed_filters": [{"id_filtro": 2, "id_option": [2025.0]}]
            }
        }))
        .unwrap();
        let card = Card {
            indicator_id: IndicatorId::from(5),
            target: "chart_5".to_string(),
            title: "Óbitos".to_string(),
            caption: None,
            payload,
            family: None,
            error: None,
            controls: FilterControls::new(),
        };

        let page = render_page("Painel", [&card], &ChartBoard::new());

        assert!(!page.contains("<form"));
        assert!(!page.contains("action="));
        assert!(!page.contains("type=\"submit\""));
        assert!(page.contains("<fieldset class=\"filters\" disabled>"));
        assert!(page.contains("<option value=\"2025\" selected>"));
        assert!(page.contains("<option value=\"2024\">"));
        assert!(page.contains(FILTERS_READ_ONLY_NOTE));
    }
}
