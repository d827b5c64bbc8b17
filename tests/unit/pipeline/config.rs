use super::*;

#[test]
fn defaults_match_the_published_layout() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.artifact_path("kafka-intro"), "/assets/images/kafka-intro/flow.gif");
    assert_eq!(
        cfg.destination_paths("kafka-intro"),
        vec![
            PathBuf::from("assets/images/kafka-intro/flow.gif"),
            PathBuf::from("public/assets/images/kafka-intro/flow.gif"),
        ]
    );
}

#[test]
fn sink_config_follows_fps_and_canvas() {
    let cfg = PipelineConfig::default();
    let sink = cfg.sink_config();
    assert_eq!((sink.width, sink.height), (960, 540));
    assert_eq!(sink.frame_delay_ms, 166);
    assert_eq!(sink.loop_count, 0);
}

#[test]
fn trailing_slash_in_prefix_is_ignored() {
    let cfg = PipelineConfig {
        assets_prefix: "/static/".to_string(),
        ..PipelineConfig::default()
    };
    assert_eq!(cfg.artifact_path("s"), "/static/s/flow.gif");
}

#[test]
fn invalid_configs_are_rejected() {
    let no_dest = PipelineConfig {
        destinations: vec![],
        ..PipelineConfig::default()
    };
    assert!(matches!(no_dest.validate(), Err(FlowError::Config(_))));

    let nested_name = PipelineConfig {
        artifact_filename: "a/flow.gif".to_string(),
        ..PipelineConfig::default()
    };
    assert!(matches!(nested_name.validate(), Err(FlowError::Config(_))));

    let zero_fps = PipelineConfig {
        fps: Fps(0),
        ..PipelineConfig::default()
    };
    assert!(matches!(zero_fps.validate(), Err(FlowError::Config(_))));
}

#[test]
fn slugs_are_trimmed_single_segments() {
    assert_eq!(normalize_slug("  my-post ").unwrap(), "my-post");
    for bad in ["", "   ", "a/b", "a\\b", "..", ".", "x..y", "/etc"] {
        assert!(
            matches!(normalize_slug(bad), Err(FlowError::Validation(_))),
            "expected rejection for {bad:?}"
        );
    }
}
