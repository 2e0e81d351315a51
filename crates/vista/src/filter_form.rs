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

use serde::Serialize;
use std::collections::HashMap;

use crate::payload::{value_to_option_string, IndicatorId, IndicatorPayload, Metadata};
use crate::query::{filter_field, FilterSelections};

pub const NO_FILTERS_MESSAGE: &str = "Nenhum filtro disponível para este indicador.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterField {
    pub id_filtro: i64,
    /// Query key, `nome_option_f{id_filtro}`.
    pub field: String,
    pub label: String,
    pub name: String,
    pub description: Option<String>,
    pub options: Vec<FormOption>,
    selected: Vec<String>,
}
impl FilterField {
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Replaces the selection, keeping the given order and dropping values that are not options.
    pub fn select<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected.clear();
        for value in values {
            let value = value.into();
            if self.has_option(&value) && !self.selected.contains(&value) {
                self.selected.push(value);
            }
        }
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// The filter modal's state for one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterForm {
    pub indicator_id: IndicatorId,
    pub fields: Vec<FilterField>,
}

impl FilterForm {
    pub fn from_payload(payload: &IndicatorPayload) -> Self {
        let applied: HashMap<i64, Vec<String>> = payload
            .data_example
            .applyed_filters
            .iter()
            .flatten()
            .map(|f| {
                (
                    f.id_filtro,
                    f.id_option.iter().map(value_to_option_string).collect(),
                )
            })
            .collect();

        let fields = payload
            .metadata
            .filtros
            .iter()
            .map(|filtro| {
                let mut field = FilterField {
                    id_filtro: filtro.id_filtro,
                    field: filter_field(filtro.id_filtro),
                    label: filtro.nome_filtro.clone(),
                    name: filtro.nome.clone(),
                    description: filtro.descricao.clone().filter(|d| !d.is_empty()),
                    options: filtro
                        .options
                        .iter()
                        .map(|o| FormOption {
                            value: o.value(),
                            label: o.display_label(),
                        })
                        .collect(),
                    selected: Vec::new(),
                };
                if let Some(values) = applied.get(&filtro.id_filtro) {
                    field.select(values.iter().cloned());
                }
                field
            })
            .collect();

        Self {
            indicator_id: payload.metadata.id.clone(),
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&FilterField> {
        self.fields.iter().find(|f| f.field == field)
    }

    pub fn field_mut(&mut self, field: &str) -> Option<&mut FilterField> {
        self.fields.iter_mut().find(|f| f.field == field)
    }

    pub fn selections(&self) -> FilterSelections {
        self.fields
            .iter()
            .filter(|f| !f.selected.is_empty())
            .map(|f| (f.field.clone(), f.selected.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoSection {
    pub title: &'static str,
    pub text: String,
}

/// The info modal: indicator name plus the non-empty parts of its ficha.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoSheet {
    pub title: String,
    pub sections: Vec<InfoSection>,
}

impl InfoSheet {
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let ficha = &metadata.ficha;
        let sections = [
            ("Resumo", &ficha.resumo),
            ("Fórmula", &ficha.formula_ficha),
            ("Limitações", &ficha.limitacoes),
            ("Referências", &ficha.referencias),
            ("Complemento", &ficha.complemento),
        ]
        .into_iter()
        .filter_map(|(title, text)| match text {
            Some(text) if !text.trim().is_empty() => Some(InfoSection {
                title,
                text: text.clone(),
            }),
            _ => None,
        })
        .collect();

        Self {
            title: metadata.nome.clone(),
            sections,
        }
    }
}
