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
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Selected values per filter field, in the order the fields were chosen.
pub type FilterSelections = IndexMap<String, Vec<String>>;

/// Characters left as-is by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const FIELD_PREFIX: &str = "nome_option_f";

pub fn filter_field(id_filtro: i64) -> String {
    format!("{FIELD_PREFIX}{id_filtro}")
}

pub fn filter_id_from_field(field: &str) -> Option<i64> {
    field.strip_prefix(FIELD_PREFIX)?.parse().ok()
}

pub fn encode(selections: &FilterSelections) -> String {
    selections
        .iter()
        .flat_map(|(field, values)| {
            let field = utf8_percent_encode(field, COMPONENT).to_string();
            values
                .iter()
                .map(move |value| format!("{field}={}", utf8_percent_encode(value, COMPONENT)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn decode(query: &str) -> FilterSelections {
    let mut selections = FilterSelections::new();
    for pair in query.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (field, value) = pair.split_once('=').unwrap_or((pair, ""));
        let field = percent_decode_str(field).decode_utf8_lossy().into_owned();
        let value = percent_decode_str(value).decode_utf8_lossy().into_owned();
        selections.entry(field).or_default().push(value);
    }
    selections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selections(entries: &[(&str, &[&str])]) -> FilterSelections {
        entries
            .iter()
            .map(|(field, values)| {
                (
                    field.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn repeats_key_and_encodes_each_value() {
        let s = selections(&[("nome_option_f1", &["Centro Oeste", "Abadiânia"])]);
        assert_eq!(
            encode(&s),
            "nome_option_f1=Centro%20Oeste&nome_option_f1=Abadi%C3%A2nia"
        );
    }

    #[test]
    fn empty_mapping_encodes_to_empty_string() {
        assert_eq!(encode(&FilterSelections::new()), "");
    }

    #[test]
    fn fields_without_values_are_omitted_and_order_kept() {
        let s = selections(&[
            ("nome_option_f7", &["2016", "2017"]),
            ("nome_option_f2", &[]),
            ("nome_option_f3", &["Nordeste"]),
        ]);
        assert_eq!(
            encode(&s),
            "nome_option_f7=2016&nome_option_f7=2017&nome_option_f3=Nordeste"
        );
    }

    #[test]
    fn reserved_characters_are_escaped_like_encode_uri_component() {
        let s = selections(&[("a&b", &["x=y+z/ (ok)!"])]);
        assert_eq!(encode(&s), "a%26b=x%3Dy%2Bz%2F%20(ok)!");
        assert_eq!(decode(&encode(&s)), s);
    }

    #[test]
    fn decode_groups_repeated_keys() {
        let decoded = decode("nome_option_f3=Centro%20Oeste&nome_option_f1=Abadi%C3%A2nia&nome_option_f3=Norte");
        assert_eq!(
            decoded,
            selections(&[
                ("nome_option_f3", &["Centro Oeste", "Norte"]),
                ("nome_option_f1", &["Abadiânia"]),
            ])
        );
    }

    #[test]
    fn field_names_follow_filter_ids() {
        assert_eq!(filter_field(7), "nome_option_f7");
        assert_eq!(filter_id_from_field("nome_option_f11"), Some(11));
        assert_eq!(filter_id_from_field("ano"), None);
    }
}
