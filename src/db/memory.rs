// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.
//!
//! Documents are held as JSON values so both backends see the same
//! serialized shape.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError> {
        let value = self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned());
        value.map(decode).transpose()
    }

    pub fn put<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc).map_err(|e| AppError::Database(e.to_string()))?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    pub fn delete(&self, collection: &str, id: &str) {
        if let Some(mut docs) = self.collections.get_mut(collection) {
            docs.remove(id);
        }
    }

    pub fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, AppError> {
        self.list_matching(collection, |_| true)
    }

    pub fn list_where<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError> {
        self.list_matching(collection, |doc| {
            doc.get(field).and_then(Value::as_str) == Some(value)
        })
    }

    fn list_matching<T, F>(&self, collection: &str, keep: F) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned,
        F: Fn(&Value) -> bool,
    {
        let values: Vec<Value> = match self.collections.get(collection) {
            Some(docs) => docs.values().filter(|doc| keep(*doc)).cloned().collect(),
            None => Vec::new(),
        };
        values.into_iter().map(decode).collect()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| AppError::Database(e.to_string()))
}
