use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use papermap::config::Config;
use papermap::embedding::{EmbedParams, LearningRate, Metric};
use papermap::output::terminal;
use papermap::papers::loader::CorpusQuery;
use papermap::papers::models::Conference;
use papermap::pipeline;
use papermap::status;

/// papermap: collect CVPR/ICLR papers and map them as a labeled landscape.
///
/// Papers are stored as one table per conference year; the map embeds
/// title+abstract TF-IDF vectors in 2-D and labels clusters with frequent
/// title keywords.
#[derive(Parser)]
#[command(name = "papermap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one conference year and save it as a table
    Collect {
        /// Conference to collect (cvpr or iclr)
        #[arg(long)]
        conf: String,

        /// Conference year (CVPR 2013-2023, ICLR 2018-2023)
        #[arg(long)]
        year: u16,

        /// Directory for stored tables (default: PAPERS_DATA_PATH or ./papers_info)
        #[arg(long)]
        data_path: Option<PathBuf>,

        /// Drop abstracts shorter than this many characters (default: 200)
        #[arg(long)]
        min_abstract_len: Option<usize>,
    },

    /// Embed stored papers in 2-D and render a keyword map
    Visualize {
        /// Directory for stored tables (default: PAPERS_DATA_PATH or ./papers_info)
        #[arg(long)]
        data_path: Option<PathBuf>,

        /// Directory the PNG is written to (default: PAPERS_RESULTS_PATH or ./results)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Conference filter, or "all"
        #[arg(long, default_value = "all")]
        conf: String,

        /// Year filter, or "all"
        #[arg(long, default_value = "all")]
        year: YearFilter,

        /// Document vectorization
        #[arg(long, default_value = "tfidf")]
        mode: String,

        /// 2-D projection (umap or tsne)
        #[arg(long, default_value = "umap")]
        mapping: String,

        /// Output file name, without extension
        #[arg(long, default_value = "papers_visualize")]
        title: String,

        /// Open the map in the system viewer instead of saving it
        #[arg(long)]
        show: bool,

        /// UMAP neighbourhood size
        #[arg(long, default_value = "20")]
        n_neighbors: usize,

        /// UMAP minimum distance between embedded points
        #[arg(long, default_value = "0.1")]
        min_dist: f64,

        /// UMAP input metric (cosine or euclidean)
        #[arg(long, default_value = "cosine")]
        metric: String,

        /// t-SNE perplexity
        #[arg(long, default_value = "10")]
        perplexity: f64,

        /// t-SNE learning rate ("auto" or a number)
        #[arg(long, default_value = "auto")]
        learning_rate: String,

        /// Random seed for the layout
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print the title keywords used to label the map
    Keywords {
        /// Directory for stored tables (default: PAPERS_DATA_PATH or ./papers_info)
        #[arg(long)]
        data_path: Option<PathBuf>,

        /// Conference filter, or "all"
        #[arg(long, default_value = "all")]
        conf: String,

        /// Year filter, or "all"
        #[arg(long, default_value = "all")]
        year: YearFilter,
    },

    /// List stored tables with row counts and modification times
    Status {
        /// Directory for stored tables (default: PAPERS_DATA_PATH or ./papers_info)
        #[arg(long)]
        data_path: Option<PathBuf>,
    },
}

/// `--year` for the readers: a single year or "all".
#[derive(Debug, Clone, Copy)]
enum YearFilter {
    All,
    Year(u16),
}

impl FromStr for YearFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::All);
        }
        s.parse()
            .map(YearFilter::Year)
            .map_err(|_| format!("expected a year or \"all\", got '{s}'"))
    }
}

fn corpus_query(conf: String, year: YearFilter) -> CorpusQuery {
    let query = CorpusQuery::all().conference(conf);
    match year {
        YearFilter::All => query,
        YearFilter::Year(y) => query.year(y),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("papermap=info")),
        )
        .init();

    let cli = Cli::parse();
    // Numeric settings are only read for collect
    let config = match &cli.command {
        Commands::Collect { .. } => Config::load()?,
        _ => Config::load_paths(),
    };

    match cli.command {
        Commands::Collect {
            conf,
            year,
            data_path,
            min_abstract_len,
        } => {
            let conference: Conference = conf.parse()?;
            let data_path = data_path.unwrap_or_else(|| config.data_path.clone());
            let min_abstract_len = min_abstract_len.unwrap_or(config.min_abstract_len);

            let outcome =
                pipeline::collect::run(conference, year, &config, &data_path, min_abstract_len)
                    .await?;
            terminal::display_collection(conference, year, &outcome);
        }

        Commands::Visualize {
            data_path,
            output_dir,
            conf,
            year,
            mode,
            mapping,
            title,
            show,
            n_neighbors,
            min_dist,
            metric,
            perplexity,
            learning_rate,
            seed,
        } => {
            let params = EmbedParams {
                n_neighbors,
                min_dist,
                metric: metric.parse::<Metric>()?,
                perplexity,
                learning_rate: learning_rate.parse::<LearningRate>()?,
                seed,
                ..Default::default()
            };
            let output_dir = if show {
                None
            } else {
                Some(output_dir.unwrap_or_else(|| config.results_path.clone()))
            };

            let request = pipeline::visualize::VisualizeRequest {
                data_path: data_path.unwrap_or_else(|| config.data_path.clone()),
                query: corpus_query(conf, year),
                mode,
                mapping,
                params,
                output_dir,
                title,
                font_path: config.font_path.clone(),
            };

            info!(mapping = %request.mapping, "Building paper map...");
            let (prepared, path) =
                tokio::task::spawn_blocking(move || pipeline::visualize::run(&request))
                    .await
                    .context("Visualization task panicked")??;

            terminal::display_keywords(&prepared.corpus, &prepared.keywords);
            terminal::display_map_written(&path, prepared.corpus.len(), prepared.keywords.len());
        }

        Commands::Keywords {
            data_path,
            conf,
            year,
        } => {
            let data_path = data_path.unwrap_or_else(|| config.data_path.clone());
            let (corpus, keywords) =
                pipeline::visualize::keywords(&data_path, &corpus_query(conf, year))?;
            terminal::display_keywords(&corpus, &keywords);
        }

        Commands::Status { data_path } => {
            let data_path = data_path.unwrap_or_else(|| config.data_path.clone());
            let tables = status::scan(&data_path)?;
            terminal::display_status(&data_path, &tables);
        }
    }

    Ok(())
}
