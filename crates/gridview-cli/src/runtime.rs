// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use gridview_app::Record;
use gridview_source::RecordSource;
use gridview_tui::{GridRuntime, InternalEvent};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{info, warn};

/// Runs the fetch off the UI thread so the table can render while the
/// request is in flight.
pub struct SourceRuntime<S> {
    source: Arc<S>,
}

impl<S: RecordSource + Send + Sync + 'static> SourceRuntime<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: RecordSource + Send + Sync + 'static> GridRuntime for SourceRuntime<S> {
    fn source_label(&self) -> String {
        self.source.describe()
    }

    fn fetch_records(&mut self) -> Result<Vec<Record>> {
        self.source.fetch_records()
    }

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let source = Arc::clone(&self.source);
        thread::Builder::new()
            .name("gridview-fetch".to_owned())
            .spawn(move || {
                let event = match source.fetch_records() {
                    Ok(records) => {
                        info!(count = records.len(), "fetch finished");
                        InternalEvent::RecordsFetched(records)
                    }
                    Err(error) => InternalEvent::FetchFailed(format!("{error:#}")),
                };
                if tx.send(event).is_err() {
                    warn!("UI exited before fetch completed");
                }
            })
            .context("spawn fetch thread")?;
        Ok(())
    }
}
