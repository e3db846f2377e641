// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;

use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub body: String,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// String form of a single field, the text every search, filter, and
    /// default sort comparison works on.
    pub fn field_text(&self, field: RecordField) -> Cow<'_, str> {
        match field {
            RecordField::Id => Cow::Owned(self.id.to_string()),
            RecordField::Title => Cow::Borrowed(&self.title),
            RecordField::Body => Cow::Borrowed(&self.body),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Id,
    Title,
    Body,
}

impl RecordField {
    pub const ALL: [Self; 3] = [Self::Id, Self::Title, Self::Body];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Body => "body",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Title => "Title",
            Self::Body => "Body",
        }
    }
}

/// Column the derived view is ordered by.
pub type SortKey = RecordField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterAttribute {
    #[default]
    None,
    Id,
    Title,
    Body,
}

impl FilterAttribute {
    pub const ALL: [Self; 4] = [Self::None, Self::Id, Self::Title, Self::Body];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Id => "id",
            Self::Title => "title",
            Self::Body => "body",
        }
    }

    /// Unrecognized names select no attribute, which lets every record through.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Self::Id,
            "title" => Self::Title,
            "body" => Self::Body,
            _ => Self::None,
        }
    }

    pub const fn field(self) -> Option<RecordField> {
        match self {
            Self::None => None,
            Self::Id => Some(RecordField::Id),
            Self::Title => Some(RecordField::Title),
            Self::Body => Some(RecordField::Body),
        }
    }

    pub fn cycle(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let current = Self::ALL
            .iter()
            .position(|attribute| *attribute == self)
            .unwrap_or(0) as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub attribute: FilterAttribute,
    pub value: String,
}

impl FilterSpec {
    pub fn new(attribute: FilterAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.attribute == FilterAttribute::None
    }
}

/// Switches between the reference behavior (all `false`) and the corrected
/// variants of the view rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewBehavior {
    /// AND search and filter together instead of letting the last one win.
    pub compose_search_and_filter: bool,
    /// Compare ids as integers when sorting instead of as rendered text.
    pub numeric_id_sort: bool,
    /// Return to page 1 whenever search, filter, or sort changes the view.
    pub reset_page_on_change: bool,
}

impl ViewBehavior {
    pub const fn faithful() -> Self {
        Self {
            compose_search_and_filter: false,
            numeric_id_sort: false,
            reset_page_on_change: false,
        }
    }

    pub const fn corrected() -> Self {
        Self {
            compose_search_and_filter: true,
            numeric_id_sort: true,
            reset_page_on_change: true,
        }
    }
}
