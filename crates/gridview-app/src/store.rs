// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Record;

/// The fetched collection plus the view currently derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    full: Vec<Record>,
    view: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection wholesale. The view starts as a copy of it in
    /// fetch order.
    pub fn load(&mut self, records: Vec<Record>) {
        self.view = records.clone();
        self.full = records;
    }

    pub fn full(&self) -> &[Record] {
        &self.full
    }

    pub fn view(&self) -> &[Record] {
        &self.view
    }

    pub(crate) fn replace_view(&mut self, view: Vec<Record>) {
        self.view = view;
    }

    pub(crate) fn view_mut(&mut self) -> &mut [Record] {
        &mut self.view
    }
}
