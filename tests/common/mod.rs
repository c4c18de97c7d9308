#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ackscan::backend::{AUTH_PING_PATH, AUTH_SUCCESS_MSG, RESULTS_PATH};
use ackscan::cli::{DeliveryArgs, ScanArgs};
use ackscan::models::{HttpMethod, ResponseInfo};
use ackscan::scanner::{ApiSpec, EngineRequest};
use ackscan::{
    BackendClient, DeliveryError, EngineError, Finding, OpenApiParser, Pipeline, RemotePath,
    ScanEngine, Uploader,
};

pub struct StubEngine {
    result: Result<Option<Vec<Finding>>, EngineError>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<EngineRequest>>,
}

impl StubEngine {
    pub fn returning(result: Result<Option<Vec<Finding>>, EngineError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanEngine for StubEngine {
    async fn run(
        &self,
        _spec: &ApiSpec,
        request: &EngineRequest,
    ) -> Result<Option<Vec<Finding>>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.result.clone()
    }
}

pub struct StubUploader {
    succeed: bool,
    pub calls: AtomicUsize,
    pub saw_file: Mutex<Option<PathBuf>>,
}

impl StubUploader {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: AtomicUsize::new(0),
            saw_file: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Uploader for StubUploader {
    async fn upload(
        &self,
        local: &Path,
        bucket: &str,
        _object_name: Option<&str>,
    ) -> Result<RemotePath, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if local.is_file() {
            *self.saw_file.lock().unwrap() = Some(local.to_path_buf());
        }

        if self.succeed {
            Ok(RemotePath::new(bucket, "results/stub.json"))
        } else {
            Err(DeliveryError::Upload {
                bucket: bucket.to_string(),
                reason: "access denied".to_string(),
            })
        }
    }
}

pub fn finding(path: &str) -> Finding {
    Finding {
        test_name: "unauthenticated_access".into(),
        method: HttpMethod::Get,
        path: path.into(),
        url: format!("http://api.test{}", path),
        vulnerable: path.contains("open"),
        description: "probe".into(),
        responses: vec![ResponseInfo::new("authenticated", 200, 2, 1)],
    }
}

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(
            dir.path().join("openapi.json"),
            r#"{"openapi": "3.0.0", "servers": [{"url": "http://api.test"}], "paths": {"/a": {"get": {}}}}"#,
        )
        .expect("write spec");
        Self { dir }
    }

    pub fn spec(&self) -> String {
        self.dir.path().join("openapi.json").display().to_string()
    }

    pub fn results_dir(&self) -> PathBuf {
        self.dir.path().join("results")
    }

    pub fn artifacts(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.results_dir()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn args(&self, base_url: &str) -> ScanArgs {
        ScanArgs {
            file: self.spec(),
            rate_limit: 60.0,
            path_regex: None,
            headers: vec!["X-Trace: 1".into()],
            test_data_config: None,
            format: "json".into(),
            target_url: None,
            results_dir: self.results_dir(),
            delivery: DeliveryArgs {
                token: "scanner-token".into(),
                bucket: Some("results-bucket".into()),
                region: None,
                base_url: base_url.to_string(),
                skip_report: false,
                strict_delivery: false,
            },
            concurrency: 1,
            timeout: 5,
        }
    }
}

pub fn pipeline(
    engine: StubEngine,
    uploader: StubUploader,
) -> Pipeline<BackendClient, StubEngine, StubUploader> {
    Pipeline::new(
        BackendClient::new(5).expect("backend client"),
        engine,
        uploader,
        OpenApiParser::new(5).expect("parser"),
    )
}

pub async fn mount_auth(server: &MockServer, valid: bool) {
    let body = if valid {
        serde_json::json!({ "status_code": 200, "msg": AUTH_SUCCESS_MSG })
    } else {
        serde_json::json!({ "status_code": 401, "msg": "Invalid token" })
    };

    Mock::given(method("GET"))
        .and(path(AUTH_PING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_results(server: &MockServer, status_code: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(RESULTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status_code": status_code, "msg": "ok" })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}
