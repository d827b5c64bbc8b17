use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        loop_count: 0,
        frame_delay_ms: 166,
    }
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(cfg(0, 10).validate().is_err());
    assert!(cfg(10, 0).validate().is_err());
    assert!(cfg(70_000, 10).validate().is_err());
    assert!(
        SinkConfig {
            frame_delay_ms: 0,
            ..cfg(10, 10)
        }
        .validate()
        .is_err()
    );
    assert!(cfg(10, 10).validate().is_ok());
}

#[test]
fn in_memory_sink_keeps_call_order() {
    let mut sink = InMemorySink::new();
    sink.start(cfg(2, 1)).unwrap();
    for v in [3u8, 1, 2] {
        sink.add_frame(&FrameRGBA::solid(2, 1, [v, v, v, 255])).unwrap();
    }
    sink.finish().unwrap();
    let firsts: Vec<u8> = sink.frames().iter().map(|f| f.data[0]).collect();
    assert_eq!(firsts, vec![3, 1, 2]);
    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg(2, 1)));
}

#[test]
fn in_memory_sink_rejects_out_of_sequence_calls() {
    let mut sink = InMemorySink::new();
    let f = FrameRGBA::solid(2, 1, [0, 0, 0, 255]);
    assert!(matches!(sink.add_frame(&f), Err(FlowError::InvalidState(_))));
    assert!(matches!(sink.finish(), Err(FlowError::InvalidState(_))));
    sink.start(cfg(2, 1)).unwrap();
    assert!(matches!(sink.start(cfg(2, 1)), Err(FlowError::InvalidState(_))));
    assert!(matches!(
        sink.add_frame(&FrameRGBA::solid(3, 1, [0, 0, 0, 255])),
        Err(FlowError::Validation(_))
    ));
    sink.finish().unwrap();
    assert!(matches!(sink.add_frame(&f), Err(FlowError::InvalidState(_))));
    assert!(matches!(sink.finish(), Err(FlowError::InvalidState(_))));
}
