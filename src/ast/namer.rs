// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Auto-naming counters

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Hands out `<Type>_<n>` labels with one monotonic counter per type name.
///
/// The process-wide instance behind [`Namer::global`] is never reset
/// implicitly; names are labels, not identity.
#[derive(Debug, Default)]
pub struct Namer {
    counters: DashMap<String, u64>,
}

static GLOBAL: Lazy<Namer> = Lazy::new(Namer::new);

impl Namer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static Namer {
        &GLOBAL
    }

    pub fn next(&self, type_name: &str) -> String {
        let mut counter = self.counters.entry(type_name.to_string()).or_insert(0);
        let name = format!("{type_name}_{}", *counter);
        *counter += 1;
        name
    }

    /// Counter value the next name for `type_name` will use
    pub fn peek(&self, type_name: &str) -> u64 {
        self.counters.get(type_name).map(|c| *c).unwrap_or(0)
    }

    /// Start every counter over; call between independent builds
    pub fn reset(&self) {
        self.counters.clear();
    }
}
