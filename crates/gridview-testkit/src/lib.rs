// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use gridview_app::Record;
use std::path::PathBuf;

const WORDS: [&str; 48] = [
    "sunt", "aut", "facere", "repellat", "provident", "occaecati", "excepturi", "optio",
    "reprehenderit", "qui", "est", "esse", "dolorem", "ea", "molestias", "quasi", "eum",
    "et", "nesciunt", "quia", "voluptatem", "magnam", "nihil", "dolor", "beatae", "ullam",
    "tempora", "odio", "fugit", "accusamus", "magni", "ipsam", "rerum", "veniam", "sint",
    "quo", "totam", "vero", "labore", "alias", "harum", "possimus", "natus", "saepe",
    "animi", "iure", "porro", "culpa",
];

const TITLE_WORDS: (usize, usize) = (3, 8);
const BODY_SENTENCES: (usize, usize) = (2, 4);
const SENTENCE_WORDS: (usize, usize) = (6, 12);
const USERS: usize = 10;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for placeholder posts shaped like a typical JSON
/// placeholder API.
#[derive(Debug, Clone)]
pub struct PostFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl PostFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn record(&mut self) -> Record {
        let id = self.next_id;
        self.next_id += 1;
        let title = self.words(TITLE_WORDS);
        let sentences = self.range(BODY_SENTENCES);
        let body = (0..sentences)
            .map(|_| self.sentence())
            .collect::<Vec<_>>()
            .join("\n");
        Record::new(id, title, body)
    }

    pub fn records(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|_| self.record()).collect()
    }

    fn sentence(&mut self) -> String {
        let mut sentence = self.words(SENTENCE_WORDS);
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence
    }

    fn words(&mut self, bounds: (usize, usize)) -> String {
        let count = self.range(bounds);
        (0..count)
            .map(|_| WORDS[self.rng.int_n(WORDS.len())])
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn range(&mut self, (low, high): (usize, usize)) -> usize {
        low + self.rng.int_n(high - low + 1)
    }
}

/// Records with ids `1..=count` in ascending order and titles/bodies that
/// embed the id, so substring expectations are easy to reason about.
pub fn sequential_records(count: i64) -> Vec<Record> {
    (1..=count)
        .map(|id| Record::new(id, format!("post {id}"), format!("body of post {id}")))
        .collect()
}

/// JSON array in the wire shape of the upstream API, including a `userId`
/// field the viewer ignores.
pub fn posts_json(records: &[Record]) -> String {
    let values = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::json!({
                "userId": index % USERS + 1,
                "id": record.id.get(),
                "title": record.title,
                "body": record.body,
            })
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(values).to_string()
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}
