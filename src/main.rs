use std::{
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use textpick::{command::CommandRegistry, config, Config, TextPick, TextPickBuilder};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Pick OCR'd words off an image into a transcript.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Image to load at start-up.
    image: Option<PathBuf>,
    /// Tesseract language hint, e.g. `eng+fra+deu`.
    #[arg(long)]
    lang: Option<String>,
    /// Viewport size as WIDTHxHEIGHT.
    #[arg(long)]
    viewport: Option<String>,
    /// Extension appended to saved transcripts.
    #[arg(long)]
    extension: Option<String>,
    /// JSON config file; environment variables and flags override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Read commands from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(lang) = cli.lang {
        config.lang = lang;
    }
    if let Some(viewport) = cli.viewport.as_deref() {
        config.viewport = config::parse_viewport(viewport)?;
    }
    if let Some(extension) = cli.extension {
        config.extension = extension;
    }
    let mut app = TextPickBuilder::new().config(config).build()?;
    let registry = CommandRegistry::standard();

    if let Some(image) = &cli.image {
        // A bad start-up image is reported like any other failed load.
        if let Err(err) = app.load(image) {
            eprintln!("error: {err}");
        }
    }

    match &cli.script {
        Some(script) => {
            let script = fs::read_to_string(script)
                .with_context(|| format!("Failed to read script {script:?}"))?;
            run(&registry, &mut app, script.lines().map(|it| Ok(it.to_owned())), false)
        }
        None => run(&registry, &mut app, io::stdin().lock().lines(), true),
    }
}

fn run(
    registry: &CommandRegistry,
    app: &mut TextPick,
    lines: impl Iterator<Item = io::Result<String>>,
    interactive: bool,
) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    if interactive {
        prompt(&mut stdout)?;
    }
    for line in lines {
        let line = line?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        match registry.dispatch(app, &line) {
            Ok(Some(reply)) => writeln!(stdout, "{reply}")?,
            Ok(None) => {}
            Err(err) => eprintln!("error: {err}"),
        }
        if interactive {
            prompt(&mut stdout)?;
        }
    }
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    write!(stdout, "> ")?;
    stdout.flush()
}
