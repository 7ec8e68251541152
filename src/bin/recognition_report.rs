use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use sign_hmm::{
    compute_report, Meta, Recognizer, SelectorConfig, SelectorKind, TestSet, WordCorpus,
    WordModelsBuilder,
};
use tracing_subscriber::EnvFilter;

#[path = "recognition_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SelectorChoice {
    Constant,
    Bic,
    Dic,
    Cv,
}

impl SelectorChoice {
    fn kind(self) -> SelectorKind {
        match self {
            Self::Constant => SelectorKind::Constant,
            Self::Bic => SelectorKind::Bic,
            Self::Dic => SelectorKind::Dic,
            Self::Cv => SelectorKind::Cv,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "recognition_report")]
#[command(about = "Train per-word HMMs with a state-count selector and score a test set")]
struct Args {
    #[arg(long, env = "SIGN_HMM_TRAIN")]
    train: PathBuf,
    #[arg(long, env = "SIGN_HMM_TEST")]
    test: PathBuf,
    #[arg(
        long,
        env = "SIGN_HMM_SELECTOR",
        value_enum,
        default_value_t = SelectorChoice::Constant
    )]
    selector: SelectorChoice,
    /// JSON selector configuration; flags below override its fields.
    #[arg(long, env = "SIGN_HMM_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "SIGN_HMM_MIN_N")]
    min_n: Option<usize>,
    #[arg(long, env = "SIGN_HMM_MAX_N")]
    max_n: Option<usize>,
    #[arg(long, env = "SIGN_HMM_N_CONSTANT")]
    n_constant: Option<usize>,
    #[arg(long, env = "SIGN_HMM_RANDOM_STATE")]
    random_state: Option<u64>,
    #[arg(long, env = "SIGN_HMM_OUT")]
    out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("recognition_report: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let config = load_config(&args, &repo_root)?;
    let train_path = resolve_path(&repo_root, &args.train);
    let test_path = resolve_path(&repo_root, &args.test);
    let out_path = resolve_out_path(&repo_root, args.out.as_ref());

    let corpus = WordCorpus::load(&train_path).map_err(|err| err.to_string())?;
    let test_set = TestSet::load(&test_path).map_err(|err| err.to_string())?;
    if corpus.is_empty() {
        return Err(format!("Training corpus '{}' has no words.", train_path.display()));
    }

    let selector = args.selector.kind();
    let progress = ProgressBar::new(corpus.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let started = Instant::now();
    let trained = WordModelsBuilder::new(config.clone())
        .with_selector(selector)
        .build_with_progress(&corpus, |word, n_states| {
            match n_states {
                Some(n) => progress.set_message(format!("{word} ({n} states)")),
                None => progress.set_message(format!("{word} (untrained)")),
            }
            progress.inc(1);
        })
        .map_err(|err| err.to_string())?;
    progress.finish_with_message("training complete");
    let training_seconds = started.elapsed().as_secs_f64();

    let untrained_words = trained.untrained;
    let recognizer = Recognizer::new(trained.models);
    let recognition = recognizer.recognize(&test_set);

    let meta = Meta {
        generated_at: Utc::now().to_rfc3339(),
        selector: selector.as_str().to_string(),
        cv_scoring: config.cv_scoring.as_str().to_string(),
        min_n_components: config.min_n_components,
        max_n_components: config.max_n_components,
        trained_words: recognizer.models().len(),
        untrained_words,
    };
    let report = compute_report(&test_set, &recognition, meta).map_err(|err| err.to_string())?;

    println!(
        "selector: {} training: {:.2}s words: {} items: {} correct: {} WER: {:.4}",
        selector.as_str(),
        training_seconds,
        report.meta.trained_words,
        report.summary.total,
        report.summary.correct,
        report.summary.word_error_rate
    );
    json_report_formatter::write_report(&out_path, &report)?;
    println!("{}", out_path.display());
    Ok(())
}

fn load_config(args: &Args, repo_root: &Path) -> Result<SelectorConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => {
            SelectorConfig::load(&resolve_path(repo_root, path)).map_err(|err| err.to_string())?
        }
        None => SelectorConfig::default(),
    };
    if let Some(min_n) = args.min_n {
        config.min_n_components = min_n;
    }
    if let Some(max_n) = args.max_n {
        config.max_n_components = max_n;
    }
    if let Some(n_constant) = args.n_constant {
        config.n_constant = n_constant;
    }
    if let Some(random_state) = args.random_state {
        config.random_state = random_state;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("recognition_reports")
        .join(format!("recognition-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}
