use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand, ValueHint};

use quizsmith::commands::generate::{self, GenerateArgs};
use quizsmith::commands::transform::{self, TransformArgs};
use quizsmith::config::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, GenerationSettings, MODEL_ENV,
    OUTPUT_DIR_ENV,
};
use quizsmith::llm::prompts::BLANK_EXERCISE_STEP;
use quizsmith::output::DEFAULT_OUTPUT_DIR;
use quizsmith::{llm, logging};

#[derive(Parser, Debug)]
#[command(
    name = "quizsmith",
    version,
    about = "Turn textbook pages into importable quiz sets.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert blank-exercise JSON into Inline-Choice and FIB import text
    Transform {
        /// File with the model reply. Reads stdin when omitted or "-".
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Write the result to a file instead of stdout
        #[arg(short, long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Seed for the option shuffle, for reproducible output
        #[arg(long, value_name = "SEED", conflicts_with = "no_shuffle")]
        seed: Option<u64>,
        /// Keep inline-choice options in declared order
        #[arg(long, default_value_t = false)]
        no_shuffle: bool,
        /// Warn about every blank that does not occur in its text
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Generate all question sets for a textbook page
    Generate {
        /// Text, markdown, .docx or .png/.jpg page with the textbook content
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath, conflicts_with = "text")]
        input: Option<PathBuf>,
        /// Use this text instead of a file
        #[arg(long, value_name = "TEXT")]
        text: Option<String>,
        /// Model used for every request
        #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL)]
        model: String,
        /// Sampling temperature
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE, conflicts_with = "no_temperature")]
        temperature: f32,
        /// Do not send a temperature (for models that reject it)
        #[arg(long, default_value_t = false)]
        no_temperature: bool,
        #[arg(long, value_name = "TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
        max_output_tokens: u32,
        /// Folder the responses are saved to
        #[arg(long, env = OUTPUT_DIR_ENV, default_value = DEFAULT_OUTPUT_DIR, value_hint = ValueHint::DirPath)]
        output_dir: PathBuf,
        /// Prompt step whose reply is converted to import documents
        #[arg(long, value_name = "STEP", default_value_t = BLANK_EXERCISE_STEP)]
        transform_step: usize,
        /// Seed for the option shuffle
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
        /// Warn about every blank that does not occur in its text
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Do not ask for confirmation before sending the document
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// Manage the OpenAI API key
    Llm {
        /// Store a new API key in the local auth file
        #[arg(long, value_name = "KEY", conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the OpenAI API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Transform {
            input,
            output,
            seed,
            no_shuffle,
            strict,
        } => transform::run(TransformArgs {
            input,
            output,
            seed,
            no_shuffle,
            strict,
        })?,
        Command::Generate {
            input,
            text,
            model,
            temperature,
            no_temperature,
            max_output_tokens,
            output_dir,
            transform_step,
            seed,
            strict,
            yes,
        } => {
            let settings = GenerationSettings {
                model,
                temperature: (!no_temperature).then_some(temperature),
                max_output_tokens,
                output_dir,
                transform_step,
            };
            generate::run(GenerateArgs {
                input,
                text,
                settings,
                seed,
                strict,
                assume_yes: yes,
            })
            .await?
        }
        Command::Llm { set, clear, test } => handle_llm_command(set, clear, test).await?,
    }

    Ok(())
}

async fn handle_llm_command(set: Option<String>, clear: bool, test: bool) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        llm::store_api_key(&key)?;
        println!("Stored OpenAI API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        if llm::clear_api_key()? {
            println!("Removed the stored OpenAI API key.");
        } else {
            println!("No OpenAI API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key().await?;
        println!("OpenAI API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
