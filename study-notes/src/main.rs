//! study-notes - Turn transcripts and documents into study chunks and flashcard questions

mod config;
mod error;
mod input;
mod models;
mod output;
mod qa;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{SegmenterKind, StudyConfig, TokenizerKind};
use indicatif::{ProgressBar, ProgressStyle};
use output::OutputFormat;
use qa::QuestionGenerator;
use std::path::{Path, PathBuf};
use text::{CleaningLevel, SentenceSegmenter, chunk_text, clean_text};

#[derive(Parser, Debug)]
#[command(name = "study-notes")]
#[command(about = "Turn transcripts and documents into study chunks and flashcard questions", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean raw text and print it
    Clean {
        /// Text file to read ("-" for stdin)
        input: PathBuf,

        /// Cleaning aggressiveness (default from config)
        #[arg(long, value_enum)]
        level: Option<CleaningLevel>,
    },
    /// Split text into token-bounded chunks
    Chunk {
        /// Text file to read ("-" for stdin)
        input: PathBuf,

        #[command(flatten)]
        chunking: ChunkArgs,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate deduplicated study questions (and answers) from text
    Questions {
        /// Text file to read ("-" for stdin)
        input: PathBuf,

        #[command(flatten)]
        chunking: ChunkArgs,

        /// Maximum questions per chunk
        #[arg(long)]
        per_chunk: Option<usize>,

        /// Only generate questions, no answers
        #[arg(long)]
        no_answers: bool,

        /// Keep quiz-style questions such as "which of the following"
        #[arg(long)]
        allow_quiz_style: bool,

        /// Model preset for questions (overrides config)
        #[arg(long)]
        question_model: Option<String>,

        /// Model preset for answers (overrides config)
        #[arg(long)]
        answer_model: Option<String>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for the chunking section of the config file.
#[derive(clap::Args, Debug)]
struct ChunkArgs {
    /// Cleaning aggressiveness
    #[arg(long, value_enum)]
    level: Option<CleaningLevel>,

    /// Token budget per chunk
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Drop chunks smaller than this
    #[arg(long)]
    min_tokens: Option<usize>,

    /// Keep only the first N chunks
    #[arg(long)]
    max_chunks: Option<usize>,

    #[arg(long, value_enum)]
    tokenizer: Option<TokenizerKind>,

    #[arg(long, value_enum)]
    segmenter: Option<SegmenterKind>,
}

impl ChunkArgs {
    fn apply(&self, config: &mut StudyConfig) {
        if let Some(level) = self.level {
            config.cleaning_level = level;
        }
        if let Some(max) = self.max_tokens {
            config.chunking.max_tokens_per_chunk = max;
        }
        if let Some(min) = self.min_tokens {
            config.chunking.min_tokens_per_chunk = min;
        }
        if self.max_chunks.is_some() {
            config.chunking.max_chunks = self.max_chunks;
        }
        if let Some(tokenizer) = self.tokenizer {
            config.tokenizer = tokenizer;
        }
        if let Some(segmenter) = self.segmenter {
            config.segmenter = segmenter;
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// List model presets available in llm.toml
    Models,
    /// Set default cleaning level
    SetCleaning {
        #[arg(value_enum)]
        level: CleaningLevel,
    },
    /// Set default token budget per chunk
    SetMaxTokens { value: usize },
    /// Set default questions per chunk
    SetQuestionsPerChunk { value: usize },
    /// Set the model preset used for questions
    SetQuestionModel { preset: String },
    /// Set the model preset used for answers
    SetAnswerModel { preset: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match args.command {
        Commands::Clean { input, level } => {
            let config = StudyConfig::load().context("Failed to load configuration")?;
            let text = input::read_input(&input)?;
            let cleaned = clean_text(&text, level.unwrap_or(config.cleaning_level));
            input::write_output(&cleaned, None)
        }
        Commands::Chunk {
            input,
            chunking,
            format,
            output,
        } => {
            let mut config = StudyConfig::load().context("Failed to load configuration")?;
            chunking.apply(&mut config);
            let segmenter = config.build_segmenter()?;
            let chunks = load_chunks(&input, &config, segmenter.as_ref(), args.debug)?;
            input::write_output(&output::render_chunks(&chunks, format)?, output.as_deref())
        }
        Commands::Questions {
            input,
            chunking,
            per_chunk,
            no_answers,
            allow_quiz_style,
            question_model,
            answer_model,
            format,
            output,
        } => {
            let mut config = StudyConfig::load().context("Failed to load configuration")?;
            chunking.apply(&mut config);
            if let Some(per_chunk) = per_chunk {
                config.questions.questions_per_chunk = per_chunk;
            }
            if no_answers {
                config.questions.generate_answers = false;
            }
            if allow_quiz_style {
                config.questions.filter_low_quality = false;
            }
            if question_model.is_some() {
                config.question_preset = question_model;
            }
            if answer_model.is_some() {
                config.answer_preset = answer_model;
            }

            let rendered = generate_questions(&input, &config, format, args.debug).await?;
            input::write_output(&rendered, output.as_deref())
        }
        Commands::Config { action } => handle_config_command(&action),
    }
}

/// Clean, segment and chunk an input file.
fn load_chunks(
    input: &Path,
    config: &StudyConfig,
    segmenter: &dyn SentenceSegmenter,
    debug: bool,
) -> Result<Vec<String>> {
    let text = input::read_input(input)?;
    let tokenizer = config.tokenizer();

    let chunks = chunk_text(
        &text,
        config.cleaning_level,
        segmenter,
        &config.chunking,
        Some(&tokenizer),
    )?;

    if debug {
        eprintln!("Input: {} ({} chars)", input.display(), text.len());
        eprintln!("Cleaning: {:?}, tokenizer: {:?}", config.cleaning_level, tokenizer);
    }
    eprintln!("Chunks: {}", chunks.len());

    Ok(chunks)
}

async fn generate_questions(
    input: &Path,
    config: &StudyConfig,
    format: OutputFormat,
    debug: bool,
) -> Result<String> {
    let segmenter = config.build_segmenter()?;
    let chunks = load_chunks(input, config, segmenter.as_ref(), debug)?;
    if chunks.is_empty() {
        eprintln!("Nothing left to ask about after cleaning and chunking.");
        return output::render_items(&[], format);
    }

    let question_model = models::load_model(config.question_preset.as_deref(), debug)?;
    let answer_model = match &config.answer_preset {
        Some(preset) if config.questions.generate_answers => {
            Some(models::load_model(Some(preset), debug)?)
        }
        _ => None,
    };

    let mut generator = QuestionGenerator::new(
        question_model.as_ref(),
        segmenter.as_ref(),
        config.questions.clone(),
    );
    if let Some(model) = &answer_model {
        generator = generator.with_answer_model(model.as_ref());
    }

    let progress = ProgressBar::new(chunks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let items = generator
        .generate(&chunks, |count| {
            progress.inc(1);
            progress.set_message(format!("{} questions", count));
        })
        .await
        .context("Cannot generate questions")?;
    progress.finish_and_clear();

    eprintln!(
        "Generated {} questions from {} chunks (up to {} per chunk)",
        items.len(),
        chunks.len(),
        generator.settings().questions_per_chunk
    );

    output::render_items(&items, format)
}

/// Print the presets from llm.toml, marking this program's default.
fn list_models() -> Result<()> {
    let llm_config = llm_client::Config::load()?;
    let current_default = llm_config.get_default_for_program(models::PROGRAM);
    println!("Available presets:");
    for (name, preset) in llm_config.sorted_presets() {
        let default_marker = if name == current_default {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {} - {} / {}{}",
            name, preset.provider, preset.model, default_marker
        );
    }
    Ok(())
}

/// Handle config subcommands
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    let mut config = StudyConfig::load()?;

    match action {
        ConfigAction::Show => {
            let path = StudyConfig::config_path()?;
            println!("Config file: {}", path.display());
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigAction::Models => return list_models(),
        ConfigAction::SetCleaning { level } => {
            config.cleaning_level = *level;
            println!("Cleaning level set to: {:?}", level);
        }
        ConfigAction::SetMaxTokens { value } => {
            if *value == 0 {
                anyhow::bail!("Token budget must be greater than 0");
            }
            config.chunking.max_tokens_per_chunk = *value;
            println!("Max tokens per chunk set to: {}", value);
        }
        ConfigAction::SetQuestionsPerChunk { value } => {
            config.questions.questions_per_chunk = *value;
            println!("Questions per chunk set to: {}", value);
        }
        ConfigAction::SetQuestionModel { preset } => {
            llm_client::Config::load()?.get_preset(preset)?;
            config.question_preset = Some(preset.clone());
            println!("Question model preset set to: {}", preset);
        }
        ConfigAction::SetAnswerModel { preset } => {
            llm_client::Config::load()?.get_preset(preset)?;
            config.answer_preset = Some(preset.clone());
            println!("Answer model preset set to: {}", preset);
        }
    }

    config.save()?;
    Ok(())
}
