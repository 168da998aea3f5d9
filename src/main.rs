use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use skillgap::config::{Config, VectorizerBackend};
use skillgap::gap::Thresholds;
use skillgap::output::{export, terminal};
use skillgap::recommend::DEFAULT_RECOMMENDATION_LIMIT;
use skillgap::scoring::AggregationPolicy;
use skillgap::skills::{parse_skill_list, Normalizer};
use skillgap::vectorize::embeddings::EmbeddingModel;
use skillgap::vectorize::tfidf::{TfIdfVectorizer, VocabularyScope};
use skillgap::vectorize::{download, Vectorizer};
use skillgap::AnalysisConfig;

/// skillgap: skill gap analysis between a resume and a job description.
///
/// Compares the skills listed on a resume against those a job asks for,
/// buckets every job skill as matched, partial or missing, and reports an
/// overall alignment score.
#[derive(Parser)]
#[command(name = "skillgap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a resume skill list against a job description skill list
    Analyze {
        /// File with resume skills (one per line, or comma separated)
        #[arg(long)]
        resume: PathBuf,

        /// File with job description skills (one per line, or comma separated)
        #[arg(long)]
        job: PathBuf,

        /// Similarity at or above which a job skill counts as matched
        #[arg(long)]
        high: f64,

        /// Similarity at or above which a job skill counts as a partial match
        #[arg(long)]
        low: f64,

        /// How to reduce the classification to one score
        /// (mean-row-max or weighted-buckets)
        #[arg(long)]
        policy: AggregationPolicy,

        /// Vectorizer backend (tfidf or embedding); defaults to SKILLGAP_VECTORIZER
        #[arg(long)]
        vectorizer: Option<VectorizerBackend>,

        /// Embedding model (all-MiniLM-L6-v2 or paraphrase-MiniLM-L3-v2);
        /// defaults to SKILLGAP_EMBEDDING_MODEL
        #[arg(long)]
        model: Option<EmbeddingModel>,

        /// Where the TF-IDF vocabulary weights are fit
        #[arg(long, value_enum, default_value = "joint")]
        scope: ScopeArg,

        /// Drop English stop words before TF-IDF weighting
        #[arg(long)]
        stop_words: bool,

        /// Also list the N closest resume skills for every job skill
        #[arg(long)]
        top_k: Option<usize>,

        /// Suggest courses for the first missing skills
        #[arg(long)]
        recommend: bool,

        /// Write the gap report (matched/partial/missing) as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the similarity matrix as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Stdout format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Download an ONNX sentence embedding model (~70-90 MB)
    DownloadModel {
        /// Model to fetch; defaults to SKILLGAP_EMBEDDING_MODEL
        #[arg(long)]
        model: Option<EmbeddingModel>,
    },

    /// Show configuration and which embedding models are installed
    Status,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    Joint,
    Independent,
}

impl From<ScopeArg> for VocabularyScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Joint => VocabularyScope::Joint,
            ScopeArg::Independent => VocabularyScope::Independent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Structured logging on stderr so JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skillgap=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            resume,
            job,
            high,
            low,
            policy,
            vectorizer,
            model,
            scope,
            stop_words,
            top_k,
            recommend,
            json,
            csv,
            format,
        } => {
            let mut config = Config::load()?;
            if let Some(model) = model {
                config.embedding_model = model;
            }

            let thresholds = Thresholds::new(high, low)?;
            let mut analysis_config = AnalysisConfig::new(thresholds, policy);
            if let Some(k) = top_k {
                analysis_config = analysis_config.with_top_k(k);
            }
            if recommend {
                analysis_config =
                    analysis_config.with_recommendations(DEFAULT_RECOMMENDATION_LIMIT);
            }

            let resume_skills = read_skill_file(&resume)?;
            let job_skills = read_skill_file(&job)?;

            let backend = vectorizer.unwrap_or(config.vectorizer);
            let vectorizer = build_vectorizer(backend, scope.into(), stop_words, &config)?;

            info!(
                backend = backend.as_str(),
                resume = %resume.display(),
                job = %job.display(),
                "Starting skill gap analysis"
            );

            // Embedding inference is CPU-bound; keep it off the async runtime
            let analysis = tokio::task::spawn_blocking(move || {
                skillgap::analyze(
                    &resume_skills,
                    &job_skills,
                    &Normalizer::default(),
                    vectorizer.as_ref(),
                    &analysis_config,
                )
            })
            .await
            .context("Analysis task panicked")??;

            match format {
                OutputFormat::Text => terminal::display_report(&analysis.report),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&analysis.report)?)
                }
            }

            if let Some(path) = json {
                export::write_gap_json(&analysis.report, &path)?;
                eprintln!("Gap report written to {}", path.display());
            }
            if let Some(path) = csv {
                export::write_matrix_csv(&analysis.matrix, &path)?;
                eprintln!("Similarity matrix written to {}", path.display());
            }
        }

        Commands::DownloadModel { model } => {
            let mut config = Config::load()?;
            if let Some(model) = model {
                config.embedding_model = model;
            }
            download_model(&config).await?;
        }

        Commands::Status => {
            let config = Config::load()?;
            println!("\n{}", "=== skillgap status ===".bold());
            println!("  Default vectorizer: {}", config.vectorizer.as_str());
            println!("  Embedding model:    {}", config.embedding_model);
            println!("  Model directory:    {}", config.model_dir.display());
            for model in EmbeddingModel::ALL {
                let installed = download::embedding_files_present(&config.model_dir, model);
                println!(
                    "    {:<26} {}",
                    model.name(),
                    if installed {
                        "installed".green()
                    } else {
                        format!("not installed (run `skillgap download-model --model {model}`)")
                            .yellow()
                    }
                );
            }
        }
    }

    Ok(())
}

/// Read a plain-text skill list from disk.
fn read_skill_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read skill list from {}", path.display()))?;
    Ok(parse_skill_list(&text))
}

/// Construct the vectorizer for this run. The embedding model is loaded
/// once here and lives for the rest of the process.
fn build_vectorizer(
    backend: VectorizerBackend,
    scope: VocabularyScope,
    stop_words: bool,
    config: &Config,
) -> Result<Box<dyn Vectorizer>> {
    match backend {
        VectorizerBackend::TfIdf => Ok(Box::new(
            TfIdfVectorizer::new(scope).with_stop_words(stop_words),
        )),
        VectorizerBackend::Embedding => load_embedding_vectorizer(config),
    }
}

#[cfg(feature = "embeddings")]
fn load_embedding_vectorizer(config: &Config) -> Result<Box<dyn Vectorizer>> {
    use skillgap::vectorize::embeddings::{EmbeddingVectorizer, SentenceEmbedder};

    config.require_embedding_model()?;
    let embedder = SentenceEmbedder::load(&config.embedding_model_dir(), config.embedding_model)?;
    Ok(Box::new(EmbeddingVectorizer::new(embedder)))
}

#[cfg(not(feature = "embeddings"))]
fn load_embedding_vectorizer(_config: &Config) -> Result<Box<dyn Vectorizer>> {
    anyhow::bail!(
        "This build of skillgap was compiled without the `embeddings` feature.\n\
         Use `--vectorizer tfidf` or rebuild with `--features embeddings`."
    )
}

#[cfg(feature = "embeddings")]
async fn download_model(config: &Config) -> Result<()> {
    let model = config.embedding_model;
    println!(
        "Downloading {} (~{} MB)...",
        model.name(),
        model.approx_size_mb()
    );
    let outcome = download::download_model(&config.model_dir, model).await?;
    for path in &outcome.fetched {
        println!("  {} {}", "fetched".green(), path.display());
    }
    for path in &outcome.skipped {
        println!("  {} {}", "already present".dimmed(), path.display());
    }
    println!(
        "\n{}",
        format!("Model ready in {}", outcome.dir.display()).bold()
    );
    Ok(())
}

#[cfg(not(feature = "embeddings"))]
async fn download_model(_config: &Config) -> Result<()> {
    anyhow::bail!("This build of skillgap was compiled without the `embeddings` feature.")
}
