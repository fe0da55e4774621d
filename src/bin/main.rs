use anyhow::{bail, Context, Result};
use breaker_core::classifier::CipherClassifier;
use breaker_core::config::{BreakerConfig, OptimizationMethod};
use breaker_core::core::frequency::{index_of_coincidence, letter_frequency, top_ngrams, FrequencyAnalyzer};
use breaker_core::core::types::{AnalysisResult, CipherType, DetectionResult};
use breaker_core::create_breaker_with_config;
use breaker_core::persistence::{load_profile_file, read_ciphertext};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "breaker_cli")]
#[command(about = "Breaks classical ciphers (Caesar, substitution, Vigenere) from ciphertext alone")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Input {
    /// Read the text from a file instead of the command line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Text to analyze
    text: Option<String>,
}

impl Input {
    fn load(&self) -> Result<String> {
        match (&self.file, &self.text) {
            (Some(path), _) => read_ciphertext(path).with_context(|| format!("reading {}", path.display())),
            (None, Some(text)) => Ok(text.clone()),
            (None, None) => bail!("provide TEXT or --file"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recover the plaintext of a ciphertext
    Break {
        /// caesar, substitution, vigenere or auto
        #[arg(short, long, default_value = "auto")]
        cipher: String,

        /// Target language profile
        #[arg(short, long)]
        language: Option<String>,

        /// Substitution strategy: frequency, hill_climbing, simulated_annealing, hybrid
        #[arg(short, long)]
        method: Option<String>,

        /// Seed for reproducible substitution searches
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra language profile as LANG=PATH (CSV or JSON), repeatable
        #[arg(short, long)]
        profile: Vec<String>,

        #[command(flatten)]
        input: Input,
    },
    /// Guess which cipher produced a text
    Detect {
        #[command(flatten)]
        input: Input,
    },
    /// Print letter statistics of a text
    Frequency {
        #[command(flatten)]
        input: Input,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Break { cipher, language, method, seed, config, profile, input } => {
            let mut config = match config {
                Some(path) => BreakerConfig::from_file(&path).with_context(|| format!("loading {}", path.display()))?,
                None => BreakerConfig::default(),
            };
            config.verbose |= cli.verbose;
            if let Some(language) = language {
                config.target_language = language;
            }
            if let Some(method) = method {
                config.substitution.method = OptimizationMethod::from_name(&method)
                    .with_context(|| format!("unknown substitution method '{}'", method))?;
            }
            if seed.is_some() {
                config.substitution.seed = seed;
            }
            config.validate()?;
            run_break(&cipher, &config, &profile, &input.load()?)
        }
        Commands::Detect { input } => {
            let text = input.load()?;
            print_detection(&CipherClassifier::new().detect(&text));
            Ok(())
        }
        Commands::Frequency { input } => {
            print_frequency(&input.load()?);
            Ok(())
        }
    }
}

fn run_break(cipher: &str, config: &BreakerConfig, profiles: &[String], text: &str) -> Result<()> {
    let cipher_type = if cipher.eq_ignore_ascii_case("auto") {
        let detection = CipherClassifier::with_config(config.classifier.clone()).detect(text);
        print_detection(&detection);
        match detection.label {
            CipherType::Plaintext => {
                println!("{}", "Text already reads as plaintext.".yellow());
                return Ok(());
            }
            CipherType::Unknown => bail!("could not identify the cipher; pass --cipher explicitly"),
            label => label,
        }
    } else {
        CipherType::from_name(cipher).with_context(|| format!("unknown cipher '{}'", cipher))?
    };

    let mut breaker = create_breaker_with_config(cipher_type.as_str(), config)
        .with_context(|| format!("no engine for '{}'", cipher_type))?;
    for entry in profiles {
        let (language, path) = entry
            .split_once('=')
            .with_context(|| format!("profile '{}' must be LANG=PATH", entry))?;
        let distribution = load_profile_file(language, PathBuf::from(path).as_path())?;
        breaker.register_language(language, distribution);
        info!(language, path, "registered language profile");
    }

    let result = breaker.analyze(text);
    print_result(&result);
    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!("{}", format!("== {} analysis ==", result.cipher_type).cyan().bold());
    if result.is_empty() {
        println!("{}", "No solution found (input too short or not enough structure).".red());
        return;
    }
    println!("Key:        {}", result.key.to_string().green().bold());
    println!("Confidence: {:.1}%", result.confidence);
    println!("Time:       {:.2} ms", result.elapsed_ms);
    println!();
    println!("{}", result.plaintext);
}

fn print_detection(detection: &DetectionResult) {
    println!(
        "{} {} ({:.1}%)",
        "Detected:".cyan().bold(),
        detection.label.as_str().green().bold(),
        detection.confidence * 100.0
    );
    for (label, score) in &detection.scores {
        println!("  {:<13} {:.3}", label.as_str(), score);
    }
    println!("  {}", detection.rationale.as_str().dim());
}

fn print_frequency(text: &str) {
    let distribution = letter_frequency(text);
    println!("{}", "Letter frequencies".cyan().bold());
    for (letter, percent) in distribution.iter() {
        let bar = "#".repeat((percent * 2.0).round() as usize);
        println!("  {} {:>6.2}% {}", letter, percent, bar.green());
    }
    println!("Index of coincidence: {:.4}", index_of_coincidence(text));

    match FrequencyAnalyzer::new().detect_language(text) {
        Some((language, confidence)) => println!("Language: {} ({:.1}%)", language.bold(), confidence * 100.0),
        None => println!("Language: {}", "unknown".red()),
    }

    for (title, n) in [("Top bigrams", 2), ("Top trigrams", 3)] {
        let grams: Vec<String> = top_ngrams(text, n, 10)
            .into_iter()
            .map(|(gram, percent)| format!("{} {:.2}%", gram, percent))
            .collect();
        println!("{}: {}", title, grams.join(", "));
    }
}
