use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use facesort_core::avatar::domain::avatar_selector::AvatarSelector;
use facesort_core::avatar::infrastructure::image_avatar_writer::ImageAvatarWriter;
use facesort_core::clustering::domain::progress::ProgressCounters;
use facesort_core::clustering::infrastructure::resolver_factory::create_resolver;
use facesort_core::embedding::infrastructure::sidecar_embedding_source::SidecarEmbeddingSource;
use facesort_core::organize::infrastructure::filesystem_materializer::FilesystemMaterializer;
use facesort_core::pipeline::group_photos_use_case::{GroupPhotosUseCase, GroupingReport};
use facesort_core::pipeline::infrastructure::photo_discovery::discover_photos;
use facesort_core::pipeline::infrastructure::threaded_extraction_executor::ThreadedExtractionExecutor;
use facesort_core::shared::person::BucketLabel;
use facesort_core::shared::settings::{GroupingSettings, Strategy};

/// Group a photo library into one folder per person.
///
/// Face embeddings are read from `<photo>.faces.json` sidecars written by
/// the embedding model service.
#[derive(Parser)]
#[command(name = "facesort")]
struct Cli {
    /// Directory of photos to group (searched recursively).
    input: PathBuf,

    /// Output directory; one sub-folder per person plus `unknown`.
    output: PathBuf,

    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity resolver: incremental or batch.
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Incremental match tolerance (cosine distance, lower = stricter).
    #[arg(long)]
    tolerance: Option<f64>,

    /// Batch initial clustering cut-off (cosine distance).
    #[arg(long)]
    distance_threshold: Option<f64>,

    /// Batch centroid merge cut-off (cosine distance).
    #[arg(long)]
    merge_threshold: Option<f64>,

    /// Discard faces with detection confidence below this (0.0-1.0).
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Pixels added around the face for avatar crops.
    #[arg(long)]
    avatar_padding: Option<u32>,

    /// Extraction worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Write the full grouping report as JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Remove the output directory before writing.
    #[arg(long)]
    clean: bool,

    /// Print the copy plan without touching the filesystem.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = load_settings(&cli)?;
    let materializer = if cli.dry_run {
        None
    } else {
        let materializer =
            FilesystemMaterializer::new(cli.output.clone(), Box::new(ImageAvatarWriter::new()))
                .with_clean(cli.clean);
        materializer.check_output()?;
        Some(materializer)
    };

    let photos = discover_photos(&cli.input);
    if photos.is_empty() {
        return Err(format!("No photos found in {}", cli.input.display()).into());
    }
    log::info!("Found {} photos in {}", photos.len(), cli.input.display());

    let progress = Arc::new(ProgressCounters::new());
    let use_case = GroupPhotosUseCase::new(
        Box::new(SidecarEmbeddingSource::new()),
        Box::new(ThreadedExtractionExecutor::new(settings.workers)),
        create_resolver(&settings),
        AvatarSelector::new(settings.avatar_padding),
        settings.min_confidence,
    )
    .with_progress(progress.clone())
    .with_extract_progress(Box::new(|done, total| {
        eprint!("\rExtracting faces {done}/{total}");
    }));

    let report = {
        let finished = Arc::new(AtomicBool::new(false));
        let reporter = spawn_progress_reporter(progress, finished.clone());
        let result = use_case.execute(&photos);
        finished.store(true, Ordering::Relaxed);
        let _ = reporter.join();
        eprintln!();
        result?
    };

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
    }

    if let Some(materializer) = materializer {
        let summary = materializer.materialize(&report.placements, &report.avatars)?;
        log::info!(
            "Copied {} photos and {} avatars to {}",
            summary.photos_copied,
            summary.avatars_written,
            cli.output.display()
        );
    } else {
        print_plan(&report, &cli.output);
    }

    print_summary(&report);
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<GroupingSettings, Box<dyn std::error::Error>> {
    let mut settings = GroupingSettings::load(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        settings.strategy = strategy;
    }
    if let Some(tolerance) = cli.tolerance {
        settings.tolerance = tolerance;
    }
    if let Some(threshold) = cli.distance_threshold {
        settings.distance_threshold = threshold;
    }
    if let Some(threshold) = cli.merge_threshold {
        settings.merge_threshold = threshold;
    }
    if let Some(confidence) = cli.min_confidence {
        settings.min_confidence = confidence;
    }
    if let Some(padding) = cli.avatar_padding {
        settings.avatar_padding = padding;
    }
    if let Some(workers) = cli.workers {
        settings.workers = workers;
    }
    settings.validate()?;
    Ok(settings)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input.display()).into());
    }
    if cli.clean && cli.dry_run {
        return Err("--clean and --dry-run are mutually exclusive".into());
    }
    let input = resolve_path(&cli.input)?;
    let output = resolve_path(&cli.output)?;
    if output.starts_with(&input) {
        return Err("Output directory must not be inside the input directory".into());
    }
    if cli.clean && input.starts_with(&output) {
        return Err("--clean would remove the input directory".into());
    }
    Ok(())
}

/// Absolute form of `path` with symlinks resolved, for paths that may not
/// exist yet: the nearest existing ancestor is canonicalized and the rest
/// appended lexically.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    let mut resolved = loop {
        match existing.canonicalize() {
            Ok(resolved) => break resolved,
            Err(e) => {
                let (Some(parent), Some(name)) =
                    (existing.parent(), existing.components().next_back())
                else {
                    return Err(e);
                };
                missing.push(name);
                existing = parent;
            }
        }
    };

    for component in missing.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => resolved.push(name),
            _ => {}
        }
    }
    Ok(resolved)
}

/// Prints resolver counters to stderr until `finished` is set.
fn spawn_progress_reporter(
    progress: Arc<ProgressCounters>,
    finished: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut last = progress.snapshot();
        while !finished.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(100));
            let snap = progress.snapshot();
            if snap != last && snap.faces_total > 0 {
                eprint!(
                    "\rClustering faces {}/{} ({} clusters)",
                    snap.faces_processed, snap.faces_total, snap.clusters_found
                );
                last = snap;
            }
        }
    })
}

fn write_report(report: &GroupingReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

fn print_plan(report: &GroupingReport, output: &Path) {
    for placement in &report.placements {
        println!(
            "{} -> {}",
            placement.source.display(),
            output
                .join(placement.bucket.to_string())
                .join(&placement.filename)
                .display()
        );
    }
}

fn print_summary(report: &GroupingReport) {
    for (label, photos) in report.assignment.buckets() {
        let noun = if photos.len() == 1 { "photo" } else { "photos" };
        match label {
            BucketLabel::Person(_) => println!("{label}: {} {noun}", photos.len()),
            BucketLabel::Unknown => println!("{label} (no face found): {} {noun}", photos.len()),
        }
    }
    let s = &report.summary;
    println!(
        "{} persons, {} photos, {} faces ({} below confidence, {} detection failures)",
        s.persons, s.photos, s.faces_accepted, s.faces_dropped, s.detection_failures
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn cli(args: &[&OsStr]) -> Cli {
        Cli::parse_from(std::iter::once(OsStr::new("facesort")).chain(args.iter().copied()))
    }

    #[test]
    fn test_clean_refused_when_relative_output_contains_input() {
        // Tests run from the package root, where `src` exists.
        let args = cli(&[OsStr::new("src"), OsStr::new("."), OsStr::new("--clean")]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_clean_refused_when_absolute_output_contains_relative_input() {
        let cwd = std::env::current_dir().unwrap();
        let args = cli(&[OsStr::new("src"), cwd.as_os_str(), OsStr::new("--clean")]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_missing_output_inside_input_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("photos");
        fs::create_dir_all(&input).unwrap();
        let output = root.path().join("elsewhere").join("..").join("photos").join("sorted");

        let args = cli(&[input.as_os_str(), output.as_os_str()]);
        assert!(validate(&args).is_err());
    }

    #[test]
    fn test_sibling_output_is_accepted() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("photos");
        fs::create_dir_all(&input).unwrap();
        let output = root.path().join("sorted");

        let args = cli(&[input.as_os_str(), output.as_os_str(), OsStr::new("--clean")]);
        assert!(validate(&args).is_ok());
    }

    #[test]
    fn test_resolve_path_handles_missing_tail() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("a")).unwrap();
        let path = root.path().join("a").join("nope").join("..").join("b");

        let resolved = resolve_path(&path).unwrap();
        assert_eq!(resolved, root.path().canonicalize().unwrap().join("a").join("b"));
    }
}
