use std::io::Write;
use std::sync::Mutex;

use super::*;
use crate::foundation::core::Canvas;
use crate::pipeline::store::LocalStore;
use crate::render::cpu::RenderOpts;
use crate::service::{CompletionRequest, CompletionService};

const SPEC: &str = r#"{"title":"X","nodes":[{"id":"a","label":"A","type":"client","x":60,"y":60},{"id":"b","label":"B","type":"db","x":250,"y":60}],"flows":[{"from":"a","to":"b","label":"call"}],"frames":[{"index":1,"highlightNodes":["a"]},{"index":0,"caption":"start"}]}"#;

struct Fixed(Result<String, String>, Mutex<usize>);

impl Fixed {
    fn ok(raw: &str) -> Arc<Self> {
        Arc::new(Self(Ok(raw.to_string()), Mutex::new(0)))
    }

    fn err(msg: &str) -> Arc<Self> {
        Arc::new(Self(Err(msg.to_string()), Mutex::new(0)))
    }

    fn calls(&self) -> usize {
        *self.1.lock().unwrap()
    }
}

impl CompletionService for Fixed {
    fn complete(&self, _req: &CompletionRequest) -> FlowResult<String> {
        *self.1.lock().unwrap() += 1;
        match &self.0 {
            Ok(s) => Ok(s.clone()),
            Err(msg) => Err(FlowError::service(msg.clone())),
        }
    }
}

/// Local store whose publishing writes always fail.
struct ReadOnlyDestinations;

impl ArtifactStore for ReadOnlyDestinations {
    fn ensure_dir(&self, dir: &Path) -> FlowResult<()> {
        LocalStore.ensure_dir(dir)
    }

    fn create(&self, path: &Path) -> FlowResult<Box<dyn Write + Send>> {
        LocalStore.create(path)
    }

    fn read(&self, path: &Path) -> FlowResult<Vec<u8>> {
        LocalStore.read(path)
    }

    fn write_bytes(&self, path: &Path, _bytes: &[u8]) -> FlowResult<()> {
        Err(FlowError::io(format!("read-only: {}", path.display())))
    }

    fn remove_file(&self, path: &Path) -> FlowResult<()> {
        LocalStore.remove_file(path)
    }
}

/// Local store whose staging cleanup always fails.
struct StickyStaging;

impl ArtifactStore for StickyStaging {
    fn ensure_dir(&self, dir: &Path) -> FlowResult<()> {
        LocalStore.ensure_dir(dir)
    }

    fn create(&self, path: &Path) -> FlowResult<Box<dyn Write + Send>> {
        LocalStore.create(path)
    }

    fn read(&self, path: &Path) -> FlowResult<Vec<u8>> {
        LocalStore.read(path)
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> FlowResult<()> {
        LocalStore.write_bytes(path, bytes)
    }

    fn remove_file(&self, path: &Path) -> FlowResult<()> {
        Err(FlowError::io(format!("busy: {}", path.display())))
    }
}

fn config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        destinations: vec![root.join("assets/images"), root.join("public/assets/images")],
        staging_dir: root.join("staging"),
        render: RenderOpts::without_text(Canvas::new(320, 120).unwrap()),
        ..PipelineConfig::default()
    }
}

fn orchestrator(
    svc: Arc<dyn CompletionService>,
    store: Arc<dyn ArtifactStore>,
    root: &Path,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(SpecGenerator::new(svc), store, config(root)).unwrap()
}

fn staging_is_empty(root: &Path) -> bool {
    std::fs::read_dir(root.join("staging"))
        .map(|mut d| d.next().is_none())
        .unwrap_or(true)
}

#[test]
fn success_publishes_to_every_destination() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(Fixed::ok(SPEC), Arc::new(LocalStore), dir.path());

    let res = orch.generate(&ArticleRequest::new("article", " my-post "));
    assert!(res.success, "{:?}", res.error);
    assert_eq!(res.artifact_path, "/assets/images/my-post/flow.gif");
    assert_eq!(res.error, None);
    assert_eq!(res.spec.title, "X");
    let order: Vec<i64> = res.spec.frames.iter().map(|f| f.index).collect();
    assert_eq!(order, vec![0, 1]);

    let a = std::fs::read(dir.path().join("assets/images/my-post/flow.gif")).unwrap();
    let b = std::fs::read(dir.path().join("public/assets/images/my-post/flow.gif")).unwrap();
    assert!(a.starts_with(b"GIF89a"));
    assert_eq!(a, b);
    assert!(staging_is_empty(dir.path()));
}

#[test]
fn blank_inputs_fail_without_calling_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let svc = Fixed::ok(SPEC);
    let orch = orchestrator(svc.clone(), Arc::new(LocalStore), dir.path());

    for req in [
        ArticleRequest::new("  ", "slug"),
        ArticleRequest::new("text", " "),
        ArticleRequest::new("text", "../escape"),
    ] {
        let res = orch.generate(&req);
        assert!(!res.success);
        assert!(res.error.unwrap().starts_with("validation error"));
    }
    assert_eq!(svc.calls(), 0);
}

#[test]
fn generator_failure_returns_placeholder_with_title() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(
        Fixed::err("HTTP 503: overloaded"),
        Arc::new(LocalStore),
        dir.path(),
    );

    let res = orch.generate(&ArticleRequest::new("article", "post").with_title("My Post"));
    assert!(!res.success);
    assert_eq!(res.artifact_path, "");
    assert_eq!(res.spec, DiagramSpec::placeholder(Some("My Post")));
    assert!(res.error.unwrap().contains("overloaded"));
    assert!(!dir.path().join("assets/images/post").exists());
}

#[test]
fn schema_failure_uses_fallback_title() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(
        Fixed::ok(r#"{"title":"","nodes":[],"flows":[],"frames":[]}"#),
        Arc::new(LocalStore),
        dir.path(),
    );
    let res = orch.generate(&ArticleRequest::new("article", "post"));
    assert!(!res.success);
    assert_eq!(res.spec.title, "Untitled");
    assert!(res.spec.nodes.is_empty() && res.spec.frames.is_empty());
    assert!(res.error.unwrap().starts_with("schema error"));
}

#[test]
fn publish_failure_is_data_and_staging_is_cleaned() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(
        Fixed::ok(SPEC),
        Arc::new(ReadOnlyDestinations),
        dir.path(),
    );

    let res = orch.generate(&ArticleRequest::new("article", "post"));
    assert!(!res.success);
    assert!(res.error.unwrap().starts_with("io error"));
    assert_eq!(res.spec.title, "Untitled");
    assert!(staging_is_empty(dir.path()));
    assert!(!dir.path().join("assets/images/post/flow.gif").exists());
}

#[test]
fn cleanup_failure_does_not_change_the_result() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(Fixed::ok(SPEC), Arc::new(StickyStaging), dir.path());

    let res = orch.generate(&ArticleRequest::new("article", "post"));
    assert!(res.success, "{:?}", res.error);
    assert_eq!(res.artifact_path, "/assets/images/post/flow.gif");
    assert_eq!(res.spec.title, "X");
    for root in ["assets/images", "public/assets/images"] {
        let bytes = std::fs::read(dir.path().join(root).join("post/flow.gif")).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }
    assert!(!staging_is_empty(dir.path()));
}

#[test]
fn request_validation_returns_normalized_slug() {
    assert_eq!(ArticleRequest::new("text", " post ").validate().unwrap(), "post");
    assert!(matches!(
        ArticleRequest::new(" ", "post").validate(),
        Err(FlowError::Validation(_))
    ));
}

#[test]
fn zero_frame_spec_still_publishes() {
    let dir = tempfile::tempdir().unwrap();
    let orch = orchestrator(
        Fixed::ok(r#"{"title":"Empty","nodes":[],"flows":[],"frames":[]}"#),
        Arc::new(LocalStore),
        dir.path(),
    );
    let res = orch.generate(&ArticleRequest::new("article", "empty"));
    assert!(res.success, "{:?}", res.error);
    assert!(dir.path().join("assets/images/empty/flow.gif").is_file());
}

#[test]
fn result_serializes_camel_case() {
    let res = PipelineResult::failed(None, &FlowError::validation("slug must not be empty"));
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["artifactPath"], "");
    assert_eq!(json["spec"]["title"], "Untitled");
    assert_eq!(json["error"], "validation error: slug must not be empty");

    let ok = PipelineResult::published("/x".to_string(), DiagramSpec::placeholder(Some("t")));
    let json = serde_json::to_value(&ok).unwrap();
    assert!(json.get("error").is_none());
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = PipelineConfig {
        destinations: vec![],
        ..PipelineConfig::default()
    };
    let err = PipelineOrchestrator::new(
        SpecGenerator::new(Fixed::ok(SPEC)),
        Arc::new(LocalStore),
        cfg,
    )
    .unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));
}
