// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-class alias tables
//!
//! An [`AliasMap`] is computed once when a node class is registered and maps
//! every alternative attribute name onto a canonical (possibly dotted) path.
//! Install order decides conflicts, and the first writer wins:
//!
//! 1. explicit aliases, most-derived class first, then ancestors in
//!    declaration order
//! 2. the global dictionary, walked over the schema's fields and then the
//!    class's accessors in declaration order
//! 3. composed aliases into nested node-typed fields
//!
//! Canonical field and accessor names are never shadowed by an alias.
//! Wildcard prefixes are kept apart and only consulted after an exact miss.

use super::{FieldType, Schema};
use indexmap::IndexMap;

/// Synonyms installed on every class declaring the key as a field or accessor
pub const GLOBAL_ALIASES: &[(&str, &[&str])] = &[
    ("radius_1", &["r", "r1", "radius", "R", "R1"]),
    ("radius_2", &["r2", "R2"]),
    ("diameter_1", &["d", "d1", "diameter", "dia", "D", "D1"]),
    ("diameter_2", &["d2", "D2"]),
    ("radius", &["r", "R"]),
    ("diameter", &["d", "D", "dia"]),
    ("height", &["h", "H"]),
    ("inner", &["i"]),
    ("outer", &["o"]),
    ("inner_radius", &["ir", "iR"]),
    ("outer_radius", &["or", "oR"]),
    ("angle", &["a", "sweep"]),
    ("start_angle", &["start"]),
];

/// Global synonyms for one canonical name
pub fn global_aliases(name: &str) -> &'static [&'static str] {
    GLOBAL_ALIASES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// A `prefix*` pattern redirecting `prefix<rest>` to `field.<rest>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    pub prefix: String,
    pub field: String,
}

#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    exact: IndexMap<String, String>,
    wildcards: Vec<Wildcard>,
}

/// Inputs for [`AliasMap::build`]
pub(crate) struct AliasSources<'a> {
    pub explicit: &'a [(String, String)],
    pub schema: &'a Schema,
    pub accessors: &'a [&'a str],
    pub wildcards: Vec<Wildcard>,
}

impl AliasMap {
    pub(crate) fn build(sources: AliasSources<'_>) -> AliasMap {
        let AliasSources {
            explicit,
            schema,
            accessors,
            wildcards,
        } = sources;
        let canonical =
            |name: &str| schema.contains(name) || accessors.iter().any(|acc| *acc == name);

        let mut exact: IndexMap<String, String> = IndexMap::new();
        let install = |exact: &mut IndexMap<String, String>, alias: String, target: String| {
            if alias != target && !canonical(&alias) && !exact.contains_key(&alias) {
                exact.insert(alias, target);
            }
        };

        for (alias, target) in explicit {
            install(&mut exact, alias.clone(), target.clone());
        }

        let names: Vec<&str> = schema.names().chain(accessors.iter().copied()).collect();
        for name in &names {
            for alias in global_aliases(name) {
                install(&mut exact, alias.to_string(), name.to_string());
            }
        }

        for spec in schema.fields() {
            let FieldType::Node(inner) = &spec.ty else {
                continue;
            };
            let prefixes: Vec<String> = exact
                .iter()
                .filter(|(_, target)| **target == spec.name)
                .map(|(alias, _)| alias.clone())
                .collect();
            if prefixes.is_empty() {
                continue;
            }
            let inner_names: Vec<(String, String)> = inner
                .aliases()
                .exact
                .iter()
                .map(|(alias, target)| (alias.clone(), target.clone()))
                .chain(
                    inner
                        .schema()
                        .names()
                        .chain(inner.accessor_names())
                        .map(|name| (name.to_string(), name.to_string())),
                )
                .collect();
            for prefix in &prefixes {
                for (alias, target) in &inner_names {
                    install(
                        &mut exact,
                        format!("{prefix}{alias}"),
                        format!("{}.{target}", spec.name),
                    );
                }
            }
        }

        AliasMap { exact, wildcards }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.exact.get(name).map(String::as_str)
    }

    /// Wildcard candidates for `name` as `(field, rest)` pairs, in declaration order
    pub fn wildcard_candidates<'n>(
        &'n self,
        name: &'n str,
    ) -> impl Iterator<Item = (&'n str, &'n str)> + 'n {
        self.wildcards.iter().filter_map(move |wc| {
            name.strip_prefix(wc.prefix.as_str())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (wc.field.as_str(), rest))
        })
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exact.iter().map(|(a, t)| (a.as_str(), t.as_str()))
    }

    pub fn wildcards(&self) -> &[Wildcard] {
        &self.wildcards
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcards.is_empty()
    }
}
