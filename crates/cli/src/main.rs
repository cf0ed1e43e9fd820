mod settings;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use meetscribe_core::audio::infrastructure::cpal_audio_source::CpalAudioSource;
use meetscribe_core::diarization::domain::diarization_engine::DiarizationEngine;
use meetscribe_core::diarization::infrastructure::external_diarizer::ExternalDiarizer;
use meetscribe_core::session::recording_session::RecordingSession;
use meetscribe_core::session::session_observer::SessionObserver;
use meetscribe_core::session::transcript_artifact;
use meetscribe_core::session::transcript_assembler::TranscriptAssembler;
use meetscribe_core::shared::constants::{
    OLLAMA_API_URL, OLLAMA_TAGS_URL, WHISPER_MODEL_NAME,
};
use meetscribe_core::shared::model_resolver;
use meetscribe_core::shared::paths::ensure_transcripts_dir;
use meetscribe_core::summarization::domain::summarizer::Summarizer;
use meetscribe_core::summarization::domain::summary_format::SummaryFormat;
use meetscribe_core::summarization::infrastructure::ollama_engine::OllamaEngine;
use meetscribe_core::transcription::domain::transcription_engine::TranscriptionEngine;
use meetscribe_core::transcription::infrastructure::whisper_cli_engine::WhisperCliEngine;
use meetscribe_core::transcription::infrastructure::whisper_rs_engine::WhisperRsEngine;

use settings::Settings;

/// Meeting recorder with live transcription, speaker labeling, and
/// LLM summaries.
#[derive(Parser)]
#[command(name = "meetscribe")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a meeting; press Enter to stop.
    Record {
        /// Transcription language code (e.g. en, de).
        #[arg(long)]
        language: Option<String>,

        /// Summary style: detailed, bullets, executive, email.
        #[arg(long)]
        format: Option<String>,

        /// Skip summary generation.
        #[arg(long)]
        no_summary: bool,

        /// Label transcript lines by speaker.
        #[arg(long)]
        diarize: bool,

        /// Directory for transcript, summary, and WAV artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Transcribe an existing WAV file.
    Transcribe {
        input: PathBuf,

        /// Write the transcript here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        language: Option<String>,

        /// Label transcript lines by speaker.
        #[arg(long)]
        diarize: bool,
    },

    /// Summarize an existing transcript file via Ollama.
    Summarize {
        input: PathBuf,

        /// Write the summary here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Summary style: detailed, bullets, executive, email.
        #[arg(long)]
        format: Option<String>,
    },

    /// Persist default options for future runs.
    Config {
        /// Transcription language code (e.g. en, de).
        #[arg(long)]
        language: Option<String>,

        /// Summary style: detailed, bullets, executive, email.
        #[arg(long)]
        format: Option<String>,

        /// Ollama model used for summaries.
        #[arg(long)]
        ollama_model: Option<String>,

        /// External diarizer executable (also enables diarization).
        #[arg(long)]
        diarizer: Option<PathBuf>,

        /// External whisper-cli executable.
        #[arg(long)]
        whisper_cli: Option<PathBuf>,

        /// Directory for session artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Report whether models, Ollama, and the diarizer are available.
    Check,
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
    let settings = Settings::load();

    match cli.command {
        Command::Record {
            language,
            format,
            no_summary,
            diarize,
            output_dir,
        } => run_record(&settings, language, format, no_summary, diarize, output_dir),
        Command::Transcribe {
            input,
            output,
            language,
            diarize,
        } => run_transcribe(&settings, &input, output.as_deref(), language, diarize),
        Command::Summarize {
            input,
            output,
            format,
        } => run_summarize(&settings, &input, output.as_deref(), format),
        Command::Config {
            language,
            format,
            ollama_model,
            diarizer,
            whisper_cli,
            output_dir,
        } => run_config(
            settings,
            language,
            format,
            ollama_model,
            diarizer,
            whisper_cli,
            output_dir,
        ),
        Command::Check => run_check(&settings),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_config(
    mut settings: Settings,
    language: Option<String>,
    format: Option<String>,
    ollama_model: Option<String>,
    diarizer: Option<PathBuf>,
    whisper_cli: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(v) = language {
        settings.language = v;
    }
    if let Some(v) = format {
        settings.summary_format = SummaryFormat::parse(&v);
    }
    if let Some(v) = ollama_model {
        settings.ollama_model = v;
    }
    if let Some(v) = diarizer {
        settings.diarizer_command = Some(v);
        settings.diarize = true;
    }
    if let Some(v) = whisper_cli {
        settings.whisper_cli = Some(v);
    }
    if let Some(v) = output_dir {
        settings.output_dir = Some(v);
    }

    settings.save();
    println!("language:       {}", settings.language);
    println!("summary format: {}", settings.summary_format);
    println!("ollama model:   {}", settings.ollama_model);
    if let Some(ref cmd) = settings.diarizer_command {
        println!("diarizer:       {}", cmd.display());
    }
    if let Some(ref exe) = settings.whisper_cli {
        println!("whisper-cli:    {}", exe.display());
    }
    if let Some(ref dir) = settings.output_dir {
        println!("output dir:     {}", dir.display());
    }
    Ok(())
}

/// Prints live entries to stdout so the user sees the transcript as it forms.
struct StdoutObserver;

impl SessionObserver for StdoutObserver {
    fn partial_transcript(&mut self, entry: &str) {
        println!("{entry}");
    }

    fn status(&mut self, message: &str) {
        log::info!("{message}");
    }
}

fn run_record(
    settings: &Settings,
    language: Option<String>,
    format: Option<String>,
    no_summary: bool,
    diarize: bool,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let language = language.unwrap_or_else(|| settings.language.clone());
    let output_dir = match output_dir.or_else(|| settings.output_dir.clone()) {
        Some(dir) => dir,
        None => ensure_transcripts_dir()?,
    };

    let engine = build_engine(settings)?;
    let summarizer = if no_summary || !settings.summarize {
        None
    } else {
        Some(build_summarizer(settings, format))
    };
    let diarizer = if diarize || settings.diarize {
        Some(build_diarizer(settings)?)
    } else {
        None
    };

    let mut session = RecordingSession::new(
        Box::new(CpalAudioSource::new()),
        engine,
        Box::new(StdoutObserver),
        summarizer,
        diarizer,
        language,
        output_dir,
    );

    session.start()?;
    eprintln!("Recording... press Enter to stop.");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    eprintln!("Processing...");
    let outcome = session
        .stop()?
        .join()
        .map_err(|_| "Post-processing thread panicked")?
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    println!("Transcript: {}", outcome.transcript_path.display());
    if let Some(summary) = outcome.summary_path {
        println!("Summary:    {}", summary.display());
    }
    println!("Audio:      {}", outcome.wav_path.display());
    Ok(())
}

fn run_transcribe(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    language: Option<String>,
    diarize: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    let language = language.unwrap_or_else(|| settings.language.clone());

    let engine = build_engine(settings)?;
    let text = engine.transcribe_file(input, &language)?;
    if text.trim().is_empty() {
        return Err("Transcription produced no text".into());
    }

    let mut diarizer: Option<Box<dyn DiarizationEngine>> = if diarize || settings.diarize {
        let mut d = build_diarizer(settings)?;
        d.ensure_ready()?;
        Some(d)
    } else {
        None
    };

    let diarizer_ref: Option<&mut dyn DiarizationEngine> = match diarizer.as_deref_mut() {
        Some(d) => Some(d),
        None => None,
    };
    let body = TranscriptAssembler::assemble(&[], &text, diarizer_ref, input);

    match output {
        Some(path) => {
            transcript_artifact::write(path, &body)?;
            log::info!("Transcript written to {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn run_summarize(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    format: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let transcript = std::fs::read_to_string(input)
        .map_err(|e| format!("Cannot read {}: {e}", input.display()))?;

    let summarizer = build_summarizer(settings, format);
    let summary = summarizer.generate_summary(&transcript, None);

    match output {
        Some(path) => {
            std::fs::write(path, summary)?;
            log::info!("Summary written to {}", path.display());
        }
        None => println!("{summary}"),
    }
    Ok(())
}

fn run_check(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut problems = 0;

    match &settings.whisper_cli {
        Some(exe) if exe.exists() => println!("whisper-cli:  ok ({})", exe.display()),
        Some(exe) => {
            println!("whisper-cli:  MISSING ({})", exe.display());
            problems += 1;
        }
        None => {
            let cached = model_resolver::model_dir()
                .map(|d| d.join(WHISPER_MODEL_NAME).exists())
                .unwrap_or(false);
            if cached {
                println!("whisper model: ok ({WHISPER_MODEL_NAME} cached)");
            } else {
                println!("whisper model: not cached (downloaded on first use)");
            }
        }
    }

    let ollama = OllamaEngine::new(OLLAMA_API_URL, OLLAMA_TAGS_URL, &settings.ollama_model);
    if ollama.ping() {
        println!("ollama:       ok ({})", settings.ollama_model);
    } else {
        println!("ollama:       unreachable (summaries will be placeholders)");
    }

    match &settings.diarizer_command {
        Some(cmd) if cmd.exists() => println!("diarizer:     ok ({})", cmd.display()),
        Some(cmd) => {
            println!("diarizer:     MISSING ({})", cmd.display());
            problems += 1;
        }
        None => println!("diarizer:     not configured"),
    }

    if problems > 0 {
        Err(format!("{problems} configured component(s) missing").into())
    } else {
        Ok(())
    }
}

fn build_engine(
    settings: &Settings,
) -> Result<Box<dyn TranscriptionEngine>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {WHISPER_MODEL_NAME}");
    let model_path = model_resolver::resolve_whisper_model(Some(Box::new(download_progress)))?;

    match &settings.whisper_cli {
        Some(exe) => Ok(Box::new(WhisperCliEngine::new(exe, &model_path)?)),
        None => Ok(Box::new(WhisperRsEngine::new(&model_path)?)),
    }
}

fn build_summarizer(settings: &Settings, format: Option<String>) -> Summarizer {
    let format = format
        .map(|f| SummaryFormat::parse(&f))
        .unwrap_or(settings.summary_format);
    let engine = OllamaEngine::new(OLLAMA_API_URL, OLLAMA_TAGS_URL, &settings.ollama_model);
    Summarizer::new(Box::new(engine), format)
}

fn build_diarizer(
    settings: &Settings,
) -> Result<Box<dyn DiarizationEngine>, Box<dyn std::error::Error>> {
    let command = settings
        .diarizer_command
        .as_ref()
        .ok_or("Diarization requested but no diarizer command is configured")?;
    Ok(Box::new(ExternalDiarizer::new(
        command,
        settings.hf_token.clone(),
    )))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}
