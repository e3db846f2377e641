// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::RangeInclusive;
use tracing::info;

use crate::{
    ActiveQuery, FilterSpec, Paginator, Record, RecordStore, SortKey, ViewBehavior, ViewController,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Pending,
    Loaded,
    Failed(String),
}

/// Everything the viewer knows: the collection, the derived view, the query
/// inputs that produced it, and the page cursor. Mutated only via
/// [`GridState::dispatch`], so readers never see a half-recomputed view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridState {
    store: RecordStore,
    controller: ViewController,
    pager: Paginator,
    fetch: FetchStatus,
    pub status_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    Load(Vec<Record>),
    Search(String),
    Filter(FilterSpec),
    Sort(SortKey),
    SetPage(usize),
    NextPage,
    PrevPage,
    FetchFailed(String),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    RecordsLoaded { count: usize },
    ViewChanged { rows: usize, total_pages: usize },
    SortChanged(SortKey),
    PageChanged(usize),
    FetchFailed(String),
    StatusUpdated(String),
    StatusCleared,
}

impl GridState {
    pub fn new(behavior: ViewBehavior) -> Self {
        Self {
            controller: ViewController::new(behavior),
            ..Self::default()
        }
    }

    pub fn behavior(&self) -> ViewBehavior {
        self.controller.behavior()
    }

    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch
    }

    pub fn full(&self) -> &[Record] {
        self.store.full()
    }

    pub fn view(&self) -> &[Record] {
        self.store.view()
    }

    pub fn search_query(&self) -> &str {
        self.controller.search_query()
    }

    pub fn filter(&self) -> &FilterSpec {
        self.controller.filter()
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.controller.sort_key()
    }

    pub fn active_query(&self) -> ActiveQuery {
        self.controller.active_query()
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.store.view().len())
    }

    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        self.pager.page_numbers(self.store.view().len())
    }

    /// Rows visible on the current page.
    pub fn page_slice(&self) -> &[Record] {
        self.pager.page_slice(self.store.view())
    }

    /// First row number on the current page, one-based; zero when the page is empty.
    pub fn first_row_number(&self) -> usize {
        let range = self.pager.row_range(self.store.view().len());
        if range.is_empty() { 0 } else { range.start + 1 }
    }

    pub fn dispatch(&mut self, command: GridCommand) -> Vec<GridEvent> {
        match command {
            GridCommand::Load(records) => self.load(records),
            GridCommand::Search(query) => {
                self.controller.apply_search(&mut self.store, &query);
                let status = if query.is_empty() {
                    "search cleared".to_owned()
                } else {
                    format!("search {query:?}: {} rows", self.store.view().len())
                };
                self.view_changed(status)
            }
            GridCommand::Filter(spec) => {
                let status = match spec.attribute.field() {
                    None => "filter off".to_owned(),
                    Some(field) => format!("filter {} ~ {:?}", field.as_str(), spec.value),
                };
                self.controller.apply_filter(&mut self.store, spec);
                let status = format!("{status}: {} rows", self.store.view().len());
                self.view_changed(status)
            }
            GridCommand::Sort(key) => {
                self.controller.apply_sort(&mut self.store, key);
                let mut events = vec![GridEvent::SortChanged(key)];
                events.extend(self.view_changed(format!("sort {} asc", key.as_str())));
                events
            }
            GridCommand::SetPage(page) => {
                self.pager.set_page(page);
                vec![GridEvent::PageChanged(self.pager.current_page())]
            }
            GridCommand::NextPage => {
                let total = self.total_pages();
                if self.pager.current_page() >= total {
                    return vec![self.set_status("last page")];
                }
                self.pager.set_page(self.pager.current_page() + 1);
                vec![GridEvent::PageChanged(self.pager.current_page())]
            }
            GridCommand::PrevPage => {
                let current = self.pager.current_page();
                if current <= 1 {
                    return vec![self.set_status("first page")];
                }
                let previous = (current - 1).min(self.total_pages().max(1));
                self.pager.set_page(previous);
                vec![GridEvent::PageChanged(self.pager.current_page())]
            }
            GridCommand::FetchFailed(message) => {
                self.fetch = FetchStatus::Failed(message.clone());
                vec![
                    GridEvent::FetchFailed(message.clone()),
                    self.set_status(&format!("fetch failed: {message}")),
                ]
            }
            GridCommand::SetStatus(message) => vec![self.set_status(&message)],
            GridCommand::ClearStatus => {
                self.status_line = None;
                vec![GridEvent::StatusCleared]
            }
        }
    }

    fn load(&mut self, records: Vec<Record>) -> Vec<GridEvent> {
        let count = records.len();
        self.store.load(records);
        self.controller.reset();
        self.pager.reset();
        self.fetch = FetchStatus::Loaded;
        info!(count, "records loaded");
        vec![
            GridEvent::RecordsLoaded { count },
            GridEvent::ViewChanged {
                rows: count,
                total_pages: self.total_pages(),
            },
            GridEvent::PageChanged(1),
            self.set_status(&format!("loaded {count} records")),
        ]
    }

    fn view_changed(&mut self, status: String) -> Vec<GridEvent> {
        let mut events = vec![GridEvent::ViewChanged {
            rows: self.store.view().len(),
            total_pages: self.total_pages(),
        }];
        if self.behavior().reset_page_on_change && self.pager.current_page() != 1 {
            self.pager.reset();
            events.push(GridEvent::PageChanged(1));
        }
        events.push(self.set_status(&status));
        events
    }

    fn set_status(&mut self, message: &str) -> GridEvent {
        self.status_line = Some(message.to_owned());
        GridEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchStatus, GridCommand, GridEvent, GridState};
    use crate::{FilterAttribute, FilterSpec, Record, RecordField, ViewBehavior};

    fn numbered(count: i64) -> Vec<Record> {
        (1..=count)
            .map(|id| Record::new(id, format!("title {id}"), format!("body {id}")))
            .collect()
    }

    #[test]
    fn load_resets_page_and_reports_counts() {
        let mut state = GridState::default();
        assert_eq!(state.fetch_status(), &FetchStatus::Pending);

        let events = state.dispatch(GridCommand::Load(numbered(23)));
        assert_eq!(state.fetch_status(), &FetchStatus::Loaded);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.total_pages(), 3);
        assert_eq!(
            events,
            vec![
                GridEvent::RecordsLoaded { count: 23 },
                GridEvent::ViewChanged {
                    rows: 23,
                    total_pages: 3,
                },
                GridEvent::PageChanged(1),
                GridEvent::StatusUpdated("loaded 23 records".to_owned()),
            ],
        );
    }

    #[test]
    fn view_change_keeps_page_in_reference_mode() {
        let mut state = GridState::default();
        state.dispatch(GridCommand::Load(numbered(23)));
        state.dispatch(GridCommand::SetPage(3));

        state.dispatch(GridCommand::Search("title 1".to_owned()));
        assert_eq!(state.current_page(), 3);
        assert!(state.page_slice().is_empty());
    }

    #[test]
    fn view_change_resets_page_when_configured() {
        let mut state = GridState::new(ViewBehavior {
            reset_page_on_change: true,
            ..ViewBehavior::default()
        });
        state.dispatch(GridCommand::Load(numbered(23)));
        state.dispatch(GridCommand::SetPage(3));

        let events = state.dispatch(GridCommand::Filter(FilterSpec::new(
            FilterAttribute::Title,
            "1",
        )));
        assert_eq!(state.current_page(), 1);
        assert!(events.contains(&GridEvent::PageChanged(1)));
        assert!(!state.page_slice().is_empty());
    }

    #[test]
    fn next_and_prev_stay_within_bounds() {
        let mut state = GridState::default();
        state.dispatch(GridCommand::Load(numbered(15)));

        assert_eq!(
            state.dispatch(GridCommand::NextPage),
            vec![GridEvent::PageChanged(2)]
        );
        assert_eq!(
            state.dispatch(GridCommand::NextPage),
            vec![GridEvent::StatusUpdated("last page".to_owned())]
        );
        assert_eq!(state.current_page(), 2);

        state.dispatch(GridCommand::PrevPage);
        assert_eq!(
            state.dispatch(GridCommand::PrevPage),
            vec![GridEvent::StatusUpdated("first page".to_owned())]
        );
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn prev_from_out_of_range_page_lands_on_last_page() {
        let mut state = GridState::default();
        state.dispatch(GridCommand::Load(numbered(15)));
        state.dispatch(GridCommand::SetPage(9));

        state.dispatch(GridCommand::PrevPage);
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn fetch_failure_leaves_view_empty() {
        let mut state = GridState::default();
        let events = state.dispatch(GridCommand::FetchFailed("timed out".to_owned()));

        assert!(state.view().is_empty());
        assert_eq!(state.total_pages(), 0);
        assert_eq!(
            state.fetch_status(),
            &FetchStatus::Failed("timed out".to_owned())
        );
        assert_eq!(
            events,
            vec![
                GridEvent::FetchFailed("timed out".to_owned()),
                GridEvent::StatusUpdated("fetch failed: timed out".to_owned()),
            ],
        );
    }

    #[test]
    fn sort_emits_sort_event_and_status() {
        let mut state = GridState::default();
        state.dispatch(GridCommand::Load(vec![
            Record::new(1, "b", ""),
            Record::new(2, "a", ""),
        ]));

        let events = state.dispatch(GridCommand::Sort(RecordField::Title));
        assert_eq!(events[0], GridEvent::SortChanged(RecordField::Title));
        assert_eq!(state.status_line.as_deref(), Some("sort title asc"));
        assert_eq!(state.sort_key(), Some(RecordField::Title));
        assert_eq!(state.view()[0].id.get(), 2);
    }

    #[test]
    fn first_row_number_tracks_page() {
        let mut state = GridState::default();
        assert_eq!(state.first_row_number(), 0);

        state.dispatch(GridCommand::Load(numbered(23)));
        state.dispatch(GridCommand::SetPage(2));
        assert_eq!(state.first_row_number(), 11);
    }

    #[test]
    fn clear_status() {
        let mut state = GridState::default();
        state.dispatch(GridCommand::SetStatus("hello".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("hello"));

        let events = state.dispatch(GridCommand::ClearStatus);
        assert_eq!(state.status_line, None);
        assert_eq!(events, vec![GridEvent::StatusCleared]);
    }
}
