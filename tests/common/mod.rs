#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use voltrix_admin::api::{Backend, Method, RequestFailed};
use voltrix_admin::state::{AppState, Command, apply_delta};
use voltrix_admin::worker::run_command;

/// Canned backend: a path missing from `gets` or `posts` fails.
#[derive(Default)]
pub struct FakeApi {
    pub gets: HashMap<String, Value>,
    pub posts: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<(String, Value)>>,
}

impl FakeApi {
    pub fn with_get(mut self, path: &str, body: Value) -> Self {
        self.gets.insert(path.to_string(), body);
        self
    }

    pub fn with_post(mut self, path: &str, body: Value) -> Self {
        self.posts.insert(path.to_string(), body);
        self
    }

    /// Every request so far, as `"GET /path"` or `"POST /path"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<(String, Value)> {
        self.posted.lock().unwrap().clone()
    }
}

impl Backend for FakeApi {
    fn get(&self, path: &str) -> Result<Value, RequestFailed> {
        self.calls.lock().unwrap().push(format!("GET {path}"));
        self.gets
            .get(path)
            .cloned()
            .ok_or_else(|| RequestFailed::new(Method::Get, path, Some(503), "unavailable"))
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, RequestFailed> {
        self.calls.lock().unwrap().push(format!("POST {path}"));
        self.posted
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        self.posts
            .get(path)
            .cloned()
            .ok_or_else(|| RequestFailed::new(Method::Post, path, Some(400), "bad request"))
    }
}

/// Runs the issued command synchronously and applies its result.
pub fn pump(state: &mut AppState, api: &FakeApi, cmd: Option<Command>) {
    let cmd = cmd.expect("a command should have been issued");
    apply_delta(state, run_command(api, &cmd));
}
