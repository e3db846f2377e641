// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use tracing::debug;

use crate::{FilterSpec, Record, RecordField, RecordStore, SortKey, ViewBehavior};

/// Which query inputs the current view reflects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveQuery {
    #[default]
    All,
    Search,
    Filter,
    SearchAndFilter,
}

impl ActiveQuery {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Search => "search",
            Self::Filter => "filter",
            Self::SearchAndFilter => "search+filter",
        }
    }
}

pub fn search_matches(record: &Record, query: &str) -> bool {
    let needle = query.to_lowercase();
    RecordField::ALL
        .iter()
        .any(|field| record.field_text(*field).to_lowercase().contains(&needle))
}

pub fn filter_matches(record: &Record, spec: &FilterSpec) -> bool {
    let Some(field) = spec.attribute.field() else {
        return true;
    };
    record
        .field_text(field)
        .to_lowercase()
        .contains(&spec.value.to_lowercase())
}

pub fn search_records(full: &[Record], query: &str) -> Vec<Record> {
    full.iter()
        .filter(|record| search_matches(record, query))
        .cloned()
        .collect()
}

pub fn filter_records(full: &[Record], spec: &FilterSpec) -> Vec<Record> {
    full.iter()
        .filter(|record| filter_matches(record, spec))
        .cloned()
        .collect()
}

pub fn compare_records(
    left: &Record,
    right: &Record,
    key: SortKey,
    behavior: ViewBehavior,
) -> Ordering {
    match key {
        RecordField::Id if behavior.numeric_id_sort => left.id.cmp(&right.id),
        field => left.field_text(field).cmp(&right.field_text(field)),
    }
}

/// Stable ascending sort; ties keep their current relative order.
pub fn sort_records(records: &mut [Record], key: SortKey, behavior: ViewBehavior) {
    records.sort_by(|left, right| compare_records(left, right, key, behavior));
}

/// Recomputes the derived view from the full collection and the query inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewController {
    behavior: ViewBehavior,
    search: String,
    filter: FilterSpec,
    sort: Option<SortKey>,
    active: ActiveQuery,
}

impl ViewController {
    pub fn new(behavior: ViewBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn behavior(&self) -> ViewBehavior {
        self.behavior
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn active_query(&self) -> ActiveQuery {
        self.active
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.behavior);
    }

    pub fn apply_search(&mut self, store: &mut RecordStore, query: &str) {
        self.search = query.to_owned();
        let view = if self.behavior.compose_search_and_filter {
            self.composed_view(store.full())
        } else {
            self.active = ActiveQuery::Search;
            search_records(store.full(), &self.search)
        };
        self.install(store, view);
    }

    /// Works from the full collection, so in the reference behavior any
    /// earlier search result is dropped.
    pub fn apply_filter(&mut self, store: &mut RecordStore, spec: FilterSpec) {
        self.filter = spec;
        let view = if self.behavior.compose_search_and_filter {
            self.composed_view(store.full())
        } else {
            self.active = ActiveQuery::Filter;
            filter_records(store.full(), &self.filter)
        };
        self.install(store, view);
    }

    /// Reorders the current view in place; membership never changes.
    pub fn apply_sort(&mut self, store: &mut RecordStore, key: SortKey) {
        sort_records(store.view_mut(), key, self.behavior);
        self.sort = Some(key);
        debug!(key = key.as_str(), rows = store.view().len(), "view sorted");
    }

    fn composed_view(&mut self, full: &[Record]) -> Vec<Record> {
        self.active = match (self.search.is_empty(), self.filter.is_passthrough()) {
            (true, true) => ActiveQuery::All,
            (false, true) => ActiveQuery::Search,
            (true, false) => ActiveQuery::Filter,
            (false, false) => ActiveQuery::SearchAndFilter,
        };
        full.iter()
            .filter(|record| search_matches(record, &self.search))
            .filter(|record| filter_matches(record, &self.filter))
            .cloned()
            .collect()
    }

    fn install(&mut self, store: &mut RecordStore, mut view: Vec<Record>) {
        // A recompute from the full collection is back in fetch order.
        match self.sort {
            Some(key) if self.behavior.compose_search_and_filter => {
                sort_records(&mut view, key, self.behavior);
            }
            _ => self.sort = None,
        }
        debug!(
            active = self.active.label(),
            rows = view.len(),
            "view recomputed"
        );
        store.replace_view(view);
    }
}
