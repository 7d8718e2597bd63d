//! Request context value object
//!
//! Every component that used to peek at global request state receives an
//! explicit `RequestContext` instead: query parameters, POST body (form
//! fields, including checkbox-map submissions), an optional uploaded file
//! and the session id. This keeps list parsing and action dispatch
//! deterministic and unit-testable.

use std::collections::HashMap;
use std::path::PathBuf;

/// A submitted form field
///
/// Checkbox-style submissions arrive as a map (`delete[id] = 1`), multi-
/// selects as a list, everything else as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
    Map(HashMap<String, String>),
}

/// Immutable snapshot of one admin request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Request path (no query string)
    path: String,

    /// Query parameters in submission order
    query: Vec<(String, String)>,

    /// POST body fields
    post: HashMap<String, FormValue>,

    /// Uploaded package file, when the request carried one
    upload: Option<PathBuf>,

    /// Session id, stripped from rebuilt URLs
    session_id: Option<String>,

    /// Name of the query parameter carrying the session id
    session_param: Option<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Append a query parameter (keeps submission order)
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a plain-text POST field
    pub fn with_post(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post.insert(key.into(), FormValue::Text(value.into()));
        self
    }

    /// Set a list-shaped POST field
    pub fn with_post_list(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.post.insert(key.into(), FormValue::List(values));
        self
    }

    /// Set a checkbox-map POST field (`key[id] = anything`)
    pub fn with_post_map(mut self, key: impl Into<String>, ids: Vec<String>) -> Self {
        let map = ids.into_iter().map(|id| (id, "1".to_string())).collect();
        self.post.insert(key.into(), FormValue::Map(map));
        self
    }

    pub fn with_upload(mut self, path: PathBuf) -> Self {
        self.upload = Some(path);
        self
    }

    pub fn with_session(
        mut self,
        param: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        let param = param.into();
        let id = session_id.into();
        self.query.push((param.clone(), id.clone()));
        self.session_param = Some(param);
        self.session_id = Some(id);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// First query value for a key
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All query parameters in order
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Raw POST field
    pub fn post(&self, key: &str) -> Option<&FormValue> {
        self.post.get(key)
    }

    /// POST field as plain text
    pub fn post_text(&self, key: &str) -> Option<&str> {
        match self.post.get(key) {
            Some(FormValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether a POST field is present and non-empty
    ///
    /// This is the action-dispatch probe: an empty text field or an empty
    /// list/map does not count as a submitted command.
    pub fn post_set(&self, key: &str) -> bool {
        match self.post.get(key) {
            Some(FormValue::Text(s)) => !s.is_empty(),
            Some(FormValue::List(l)) => !l.is_empty(),
            Some(FormValue::Map(m)) => !m.is_empty(),
            None => false,
        }
    }

    /// Resolve the target ids of a batch command field
    ///
    /// Accepts an explicit id list, the keys of a checkbox-map submission
    /// or a single text id. Order is made deterministic for map fields.
    pub fn post_ids(&self, key: &str) -> Vec<String> {
        match self.post.get(key) {
            Some(FormValue::Text(s)) if !s.is_empty() => vec![s.clone()],
            Some(FormValue::List(l)) => l.clone(),
            Some(FormValue::Map(m)) => {
                let mut ids: Vec<String> = m.keys().cloned().collect();
                ids.sort();
                ids
            }
            _ => Vec::new(),
        }
    }

    pub fn upload(&self) -> Option<&PathBuf> {
        self.upload.as_ref()
    }

    /// Rebuild the request URL, dropping the named parameters and the
    /// session id parameter
    ///
    /// Used by the pager to derive link targets from the current request.
    pub fn url_without(&self, drop: &[&str]) -> String {
        let kept: Vec<String> = self
            .query
            .iter()
            .filter(|(k, _)| {
                !drop.contains(&k.as_str()) && Some(k.as_str()) != self.session_param.as_deref()
            })
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        if kept.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, kept.join("&"))
        }
    }
}
