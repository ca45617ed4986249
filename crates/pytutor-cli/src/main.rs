use clap::{Parser, Subcommand};
use pytutor::{
    ExecutionSettings, TutorSession, DEFAULT_ALLOWED_MODULES, EXAMPLES_PER_TOPIC,
};
use std::io::{self, Read};

/// Interactive Python tutor: lessons, generated examples, quizzes, and
/// sandboxed execution.
#[derive(Parser, Debug)]
#[command(name = "pytutor-cli", about = "Python tutor lessons and sandboxed code execution")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every topic in the catalog
    Topics,

    /// Show a topic's lesson summary and its pre-defined examples
    Lesson {
        /// Topic id (see `topics`)
        topic: String,
    },

    /// Generate randomized examples for a topic
    Examples {
        /// Topic id (math, loops, strings, functions)
        topic: String,

        /// How many examples to generate
        #[arg(long, default_value_t = EXAMPLES_PER_TOPIC)]
        count: usize,

        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,

        /// Execute each generated example and show its captured output
        #[arg(long)]
        run: bool,
    },

    /// Execute Python source from a file or stdin, print the result as JSON
    Run {
        /// Read source from a file instead of stdin
        #[arg(long)]
        file: Option<std::path::PathBuf>,

        /// Wall-clock timeout in milliseconds
        #[arg(long, default_value_t = 2_000)]
        timeout_ms: u64,

        /// Comma-separated module allowlist (default: standard tutor set)
        #[arg(long)]
        modules: Option<String>,
    },

    /// Print a topic's quiz bank
    Quiz {
        /// Topic id (see `topics`)
        topic: String,

        /// Reveal the correct answers
        #[arg(long)]
        answers: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Topics => topics(),
        Command::Lesson { topic } => lesson(&topic),
        Command::Examples { topic, count, seed, run } => examples(&topic, count, seed, run),
        Command::Run { file, timeout_ms, modules } => run(file, timeout_ms, modules),
        Command::Quiz { topic, answers } => quiz(&topic, answers),
    }
}

fn topics() {
    let catalog = pytutor::Catalog::global();
    for topic in catalog.topics() {
        println!("{:<18} {:?}: {}", topic.id, topic.category, topic.title);
    }
}

fn lesson(topic_id: &str) {
    let catalog = pytutor::Catalog::global();
    let Some(topic) = catalog.topic(topic_id) else {
        eprintln!("Unknown topic: {topic_id}");
        std::process::exit(1);
    };
    println!("# {}", topic.title);
    match catalog.lesson(topic_id) {
        Some(lesson) => {
            println!("{}\n", lesson.summary);
            for (title, source) in lesson.examples {
                println!("## {title}\n{source}");
            }
        }
        None => println!("No written lesson for this topic yet."),
    }
}

fn examples(topic: &str, count: usize, seed: Option<u64>, run: bool) {
    let settings = ExecutionSettings::default();
    let mut session = match seed {
        Some(seed) => TutorSession::with_seed(seed, settings),
        None => TutorSession::new(settings),
    };

    let Some(batch) = session.generated_examples(topic, count) else {
        eprintln!("No generated examples for topic: {topic}");
        std::process::exit(1);
    };

    for example in &batch {
        println!("## {}\n{}", example.label, example.source);
        if run {
            let result = session.run(&example.source);
            println!("Output:");
            print!("{}", result.stdout);
            if !result.outcome.is_completed() {
                println!("{}", render_outcome(&result.outcome));
            }
            println!();
        }
    }
}

fn run(file: Option<std::path::PathBuf>, timeout_ms: u64, modules: Option<String>) {
    let source = match file {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("Error reading stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let allowed_modules: Vec<String> = match modules {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => DEFAULT_ALLOWED_MODULES.iter().map(|s| s.to_string()).collect(),
    };

    let settings = ExecutionSettings {
        timeout_ms,
        allowed_modules,
        ..ExecutionSettings::default()
    };

    let result = pytutor::execute(&source, &settings);

    // Faults are data, not process failures — always exit 0 with the JSON.
    let json = serde_json::to_string(&result).expect("ExecutionResult is always serializable");
    println!("{json}");
}

fn quiz(topic_id: &str, answers: bool) {
    let catalog = pytutor::Catalog::global();
    let Some(bank) = catalog.quiz(topic_id) else {
        eprintln!("No quiz for topic: {topic_id}");
        std::process::exit(1);
    };
    for (i, question) in bank.iter().enumerate() {
        println!("Q{}: {}", i + 1, question.prompt);
        for (j, option) in question.options.iter().enumerate() {
            println!("  {}) {option}", j + 1);
        }
        if answers {
            println!("  -> {}", question.answer());
        }
        println!();
    }
}

fn render_outcome(outcome: &pytutor::ExecutionOutcome) -> String {
    match outcome {
        pytutor::ExecutionOutcome::Completed => String::new(),
        pytutor::ExecutionOutcome::TimedOut { limit_ms } => {
            format!("[timed out after {limit_ms} ms]")
        }
        pytutor::ExecutionOutcome::Faulted { fault } => match fault {
            pytutor::Fault::Syntax { message, line, .. } => {
                format!("[syntax error at line {line}: {message}]")
            }
            pytutor::Fault::Runtime { message, .. } => format!("[error: {message}]"),
            pytutor::Fault::OutputLimit { limit_bytes } => {
                format!("[output limit of {limit_bytes} bytes exceeded]")
            }
            pytutor::Fault::ImportDenied { module } => {
                format!("[import of '{module}' is not allowed here]")
            }
        },
    }
}
