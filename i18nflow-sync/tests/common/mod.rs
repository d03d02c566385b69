//! Shared fixtures for the orchestrator integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::Path;

use i18nflow_core::{Config, FlatMap, LocaleSet};
use i18nflow_sync::{PushRequest, PushResponse, RemoteTransport, TransportError};

/// In-memory remote store that records every call.
#[derive(Default)]
pub struct FakeTransport {
    pub remote: LocaleSet,
    pub response: PushResponse,
    pub fetches: Cell<usize>,
    pub pushes: RefCell<Vec<PushRequest>>,
    pub fail_with: Option<String>,
}

impl FakeTransport {
    pub fn with_remote(remote: LocaleSet) -> Self {
        Self {
            remote,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.fetches.get() + self.pushes.borrow().len()
    }

    fn check(&self, url: &str) -> Result<(), TransportError> {
        match &self.fail_with {
            Some(message) => Err(TransportError::Network {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl RemoteTransport for FakeTransport {
    fn fetch_translations(
        &self,
        _project_id: &str,
        _locale: Option<&str>,
    ) -> Result<LocaleSet, TransportError> {
        self.fetches.set(self.fetches.get() + 1);
        self.check("fake://cli/translations")?;
        Ok(self.remote.clone())
    }

    fn push_keys(&self, request: &PushRequest) -> Result<PushResponse, TransportError> {
        self.pushes.borrow_mut().push(request.clone());
        self.check("fake://cli/keys")?;
        Ok(self.response.clone())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn flat(pairs: &[(&str, &str)]) -> FlatMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn locale_set(locales: &[(&str, FlatMap)]) -> LocaleSet {
    locales
        .iter()
        .map(|(code, map)| (code.to_string(), map.clone()))
        .collect()
}

pub fn config() -> Config {
    Config {
        api_key: "secret".into(),
        project_id: "7".into(),
        ..Config::default()
    }
}

/// Write `content` at `root/relative`, creating parents.
pub fn put(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative)).unwrap()
}

pub fn read_json(root: &Path, relative: &str) -> serde_json::Value {
    serde_json::from_str(&read(root, relative)).unwrap()
}
