// Integration tests driving an annotation workspace from event scripts
//
// Scripts are JSON lines of playback samples, scrubs and key presses, the same
// input the replay command reads.

use std::sync::Arc;

use gazeline::codec::{load_annotations, load_annotations_async, write_annotations};
use gazeline::recording::{EventOutcome, Transition};
use gazeline::{
    AnnotationCodec, AnnotationWorkspace, AppConfig, DecodeContext, FrameSpan, GazeLabel,
    Taxonomy, TrackKey, WorkspaceEvent,
};
use tempfile::TempDir;

fn key(key: &str) -> WorkspaceEvent {
    WorkspaceEvent::Key {
        key: key.to_string(),
    }
}

fn playback(position: f64, elapsed_ms: u64) -> WorkspaceEvent {
    WorkspaceEvent::Playback {
        position,
        elapsed_ms,
    }
}

fn run_script(workspace: &mut AnnotationWorkspace, events: &[WorkspaceEvent]) -> Vec<EventOutcome> {
    events
        .iter()
        .map(|event| workspace.handle(event).unwrap())
        .collect()
}

#[test]
fn test_script_survives_json_lines() {
    let temp_dir = TempDir::new().unwrap();
    let script = temp_dir.path().join("events.jsonl");
    let events = vec![
        key("space"),
        playback(1.0, 1000),
        key("l"),
        playback(2.0, 2000),
        WorkspaceEvent::Scrub { position: 3.5 },
        key("l"),
    ];
    serde_jsonlines::write_json_lines(&script, &events).unwrap();

    let read_back = serde_jsonlines::json_lines(&script)
        .unwrap()
        .collect::<Result<Vec<WorkspaceEvent>, std::io::Error>>()
        .unwrap();
    assert_eq!(read_back, events);
}

#[test]
fn test_left_right_session() {
    let mut workspace = AnnotationWorkspace::new(&AppConfig::default(), 10., None).unwrap();
    let outcomes = run_script(
        &mut workspace,
        &[
            key("space"),
            playback(1.0, 1000),
            key("l"),
            // arrives inside the refresh window and is dropped
            playback(1.5, 1005),
            playback(2.0, 2000),
            key("r"),
            playback(4.0, 4000),
            key("l"),
            // starting inside the recorded interval is refused
            WorkspaceEvent::Scrub { position: 3.0 },
            key("l"),
            WorkspaceEvent::Scrub { position: 6.0 },
            key("r"),
        ],
    );

    assert_eq!(outcomes[0], EventOutcome::PlaybackToggled { playing: true });
    assert_eq!(outcomes[3], EventOutcome::SampleDropped);
    assert_eq!(
        outcomes[9],
        EventOutcome::Recording {
            track: TrackKey::from("leftPersonGaze"),
            transition: Transition::Blocked,
        }
    );

    let exported = workspace.export();
    assert_eq!(
        exported.spans(&TrackKey::from("leftPersonGaze")),
        &[FrameSpan::new(30, 120)]
    );
    assert_eq!(
        exported.spans(&TrackKey::from("rightPersonGaze")),
        &[FrameSpan::new(60, 180)]
    );

    // binary tracks read back as label shares per subject
    let shares = exported.to_annotation_set(Taxonomy::LeftRight).unwrap();
    let left = shares.label_percentages("left").unwrap();
    assert_eq!(left[&GazeLabel::Person], 30.);
    assert_eq!(left[&GazeLabel::Neither], 70.);
    let right = shares.label_percentages("right").unwrap();
    assert_eq!(right[&GazeLabel::Person], 40.);
}

#[test]
fn test_doctor_patient_session_export_and_evaluate() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("manual.json");
    let prediction_path = temp_dir.path().join("prediction.json");
    std::fs::write(
        &prediction_path,
        r#"[
            { "frame": 0, "change_type": "gaze", "details": { "human": 2, "contact": "human" } },
            { "frame": 60, "change_type": "gaze", "details": { "human": 2, "contact": "screen" } },
            { "frame": 120, "change_type": "gaze", "details": { "human": 2, "contact": "none" } },
            { "frame": 120, "change_type": "gaze", "details": { "human": 1, "contact": "human" } }
        ]"#,
    )
    .unwrap();

    let config = AppConfig {
        taxonomy: Taxonomy::DoctorPatient,
        ..Default::default()
    };
    let mut workspace = AnnotationWorkspace::new(&config, 6., Some(30.)).unwrap();
    let ticket = workspace.begin_import();

    run_script(
        &mut workspace,
        &[
            key("1"),
            WorkspaceEvent::Scrub { position: 2.0 },
            key("2"),
            WorkspaceEvent::Scrub { position: 4.0 },
            key("4"),
            key("3"),
        ],
    );
    assert_eq!(
        workspace.gaze_session("doctor").unwrap().current_state(),
        Some(GazeLabel::Neither)
    );
    workspace.finish();

    let percentages = workspace
        .annotations()
        .label_percentages("doctor")
        .unwrap();
    assert!((percentages[&GazeLabel::Person] - 100. / 3.).abs() < 1e-9);
    assert!((percentages[&GazeLabel::Neither] - 100. / 3.).abs() < 1e-9);

    let exported = workspace.export();
    write_annotations(&output, &exported).unwrap();
    let context = DecodeContext::new(Taxonomy::DoctorPatient).with_duration(Some(6.));
    let reloaded = load_annotations(&output, &AnnotationCodec::new(), &context).unwrap();
    assert_eq!(reloaded, exported);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let prediction = runtime.block_on(load_annotations_async(
        prediction_path,
        Arc::new(AnnotationCodec::new()),
        context,
    ));
    assert!(workspace.apply_import(ticket, prediction).unwrap());

    let report = workspace.evaluate().unwrap();
    // doctor: person 0..60, screen 60..120; patient: 120..180 in both
    assert_eq!(report.overall, 100.);
}

#[test]
fn test_reloading_video_discards_annotations() {
    let mut workspace = AnnotationWorkspace::new(&AppConfig::default(), 10., None).unwrap();
    run_script(
        &mut workspace,
        &[key("l"), WorkspaceEvent::Scrub { position: 5.0 }, key("l")],
    );
    let first = workspace.session_id();

    let second = workspace.load_video(20., Some(25.)).unwrap();
    assert_ne!(first, second);
    assert_eq!(workspace.cursor().current_time(), 0.);

    let exported = workspace.export();
    assert_eq!(exported.video_info.total_frames, 500);
    assert!(exported.tracks.values().all(Vec::is_empty));
}
