use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use log::{debug, error, info, warn};

use gazeline::{
    AnnotationCodec, AnnotationSet, AnnotationWorkspace, AppConfig, DecodeContext,
    FrameAnnotations, GazelineError, WorkspaceEvent,
    codec::{load_annotations, load_annotations_async, write_annotations},
    evaluation::{AccuracyEvaluator, rasterize_spans},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file, defaults to the user's config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a prediction against manual annotations
    Evaluate {
        #[arg(short, long)]
        manual: PathBuf,

        #[arg(short, long)]
        prediction: PathBuf,

        #[arg(short, long)]
        frame_rate: Option<f64>,

        #[arg(short, long)]
        duration: Option<f64>,
    },
    /// Annotate a video from a JSON-lines script of playback and key events
    Replay {
        #[arg(short, long)]
        events: PathBuf,

        #[arg(short, long)]
        duration: f64,

        #[arg(short, long)]
        frame_rate: Option<f64>,

        #[arg(short, long)]
        output: PathBuf,

        /// Evaluate the replayed annotations against this prediction
        #[arg(short, long)]
        prediction: Option<PathBuf>,
    },
    /// Print per-track coverage and per-subject label shares
    Summary {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        frame_rate: Option<f64>,

        #[arg(short, long)]
        duration: Option<f64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, GazelineError> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::from_local_file(),
    }
}

fn decode_context(config: &AppConfig, frame_rate: Option<f64>, duration: Option<f64>) -> DecodeContext {
    DecodeContext::new(config.taxonomy)
        .with_frame_rate(Some(frame_rate.unwrap_or(config.default_frame_rate)))
        .with_duration(duration)
}

fn evaluate(
    config: &AppConfig,
    manual: &Path,
    prediction: &Path,
    context: DecodeContext,
) -> Result<(), GazelineError> {
    let codec = AnnotationCodec::new();
    let manual = load_annotations(manual, &codec, &context)?;
    let prediction = load_annotations(prediction, &codec, &context)?;

    match AccuracyEvaluator::new(config.taxonomy).evaluate(&manual, &prediction) {
        Some(report) => println!("{report}"),
        None => warn!("Manual annotations have no measurable duration, nothing to report"),
    }
    Ok(())
}

fn read_events(events: &Path) -> Result<Vec<WorkspaceEvent>, GazelineError> {
    if !events.exists() {
        return Err(GazelineError::InvalidEventScript {
            path: format!("{:?}", events),
        });
    }
    serde_jsonlines::json_lines(events)
        .map_err(|e| GazelineError::EventScriptError { source: e })?
        .collect::<Result<Vec<WorkspaceEvent>, std::io::Error>>()
        .map_err(|e| GazelineError::EventScriptError { source: e })
}

fn replay(
    config: &AppConfig,
    events: &Path,
    duration: f64,
    frame_rate: Option<f64>,
    output: &Path,
    prediction: Option<PathBuf>,
) -> Result<(), GazelineError> {
    let events = read_events(events)?;
    let mut workspace = AnnotationWorkspace::new(config, duration, frame_rate)?;

    // imports are ticketed before the script runs and applied after it
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| GazelineError::ImportTaskError {
            reason: e.to_string(),
        })?;
    let import = prediction.map(|path| {
        let context = DecodeContext::new(config.taxonomy)
            .with_frame_rate(Some(workspace.annotations().frame_rate()))
            .with_duration(Some(duration));
        let ticket = workspace.begin_import();
        let task = runtime.spawn(load_annotations_async(
            path,
            Arc::new(AnnotationCodec::new()),
            context,
        ));
        (ticket, task)
    });

    for event in &events {
        let outcome = workspace.handle(event)?;
        debug!("{event:?} -> {outcome:?}");
    }
    workspace.finish();

    let exported = workspace.export();
    write_annotations(output, &exported)?;
    info!("Replayed {} events into {:?}", events.len(), output);
    print_label_shares(config, &exported.to_annotation_set(config.taxonomy)?);

    if let Some((ticket, task)) = import {
        let result = runtime
            .block_on(task)
            .map_err(|e| GazelineError::ImportTaskError {
                reason: e.to_string(),
            })?;
        workspace.apply_import(ticket, result)?;
        match workspace.evaluate() {
            Some(report) => println!("{report}"),
            None => warn!("No report available for the replayed annotations"),
        }
    }
    Ok(())
}

fn summary(config: &AppConfig, input: &Path, context: DecodeContext) -> Result<(), GazelineError> {
    let annotations = load_annotations(input, &AnnotationCodec::new(), &context)?;
    print_coverage(config, &annotations);
    print_label_shares(config, &annotations.to_annotation_set(config.taxonomy)?);
    Ok(())
}

fn print_coverage(config: &AppConfig, annotations: &FrameAnnotations) {
    let total_frames = annotations.video_info.total_frames as usize;
    println!(
        "{:.2}s at {} fps, {} frames",
        annotations.video_info.duration, annotations.video_info.frame_rate, total_frames
    );
    if total_frames == 0 {
        return;
    }

    for spec in config.taxonomy.tracks() {
        let frames = rasterize_spans(annotations.spans(&spec.key), total_frames);
        let covered = frames.iter().filter(|looking| **looking).count();
        println!(
            "{} ({}): {} spans, {:.1}% of frames",
            spec.title,
            spec.key,
            annotations.spans(&spec.key).len(),
            covered as f64 / total_frames as f64 * 100.
        );
    }
}

fn print_label_shares(config: &AppConfig, annotations: &AnnotationSet) {
    for subject in config.taxonomy.subjects() {
        let Some(percentages) = annotations.label_percentages(subject) else {
            continue;
        };
        let shares = config
            .taxonomy
            .labels_for(subject)
            .into_iter()
            .map(|label| {
                format!(
                    "{} {:.1}%",
                    label.description(),
                    percentages.get(&label).copied().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>();
        println!("{subject}: {}", shares.join(", "));
    }
}

fn run(cli: &Args) -> Result<(), GazelineError> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Commands::Evaluate {
            manual,
            prediction,
            frame_rate,
            duration,
        } => evaluate(
            &config,
            manual,
            prediction,
            decode_context(&config, *frame_rate, *duration),
        ),
        Commands::Replay {
            events,
            duration,
            frame_rate,
            output,
            prediction,
        } => replay(
            &config,
            events,
            *duration,
            *frame_rate,
            output,
            prediction.clone(),
        ),
        Commands::Summary {
            input,
            frame_rate,
            duration,
        } => summary(
            &config,
            input,
            decode_context(&config, *frame_rate, *duration),
        ),
    }
}

fn main() {
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}
