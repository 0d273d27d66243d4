use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use json_get::{JsonGet, ExtractError};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: json-get [--lines] [--null <TEXT>] <KEY> [FILE]";

/// Environment variable holding the log filter, e.g. `JSON_GET_LOG=debug`.
const LOG_ENV: &str = "JSON_GET_LOG";

struct CliArgs {
    key: String,
    path: Option<PathBuf>,
    lines: bool,
    null_text: String,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut key = None;
    let mut path = None;
    let mut lines = false;
    let mut null_text = String::from("NULL");

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lines" => lines = true,
            "--null" => match iter.next() {
                Some(text) => null_text = text.clone(),
                None => bail!("--null needs a value\n{USAGE}"),
            },
            "-h" | "--help" => bail!("{USAGE}"),
            _ if key.is_none() => key = Some(arg.clone()),
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }

    match key {
        Some(key) => Ok(CliArgs {
            key,
            path,
            lines,
            null_text,
        }),
        None => bail!("missing KEY\n{USAGE}"),
    }
}

fn open_input(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn write_result(out: &mut impl Write, result: Option<&[u8]>, null_text: &str) -> io::Result<()> {
    match result {
        Some(bytes) => out.write_all(bytes)?,
        None => out.write_all(null_text.as_bytes())?,
    }
    out.write_all(b"\n")
}

/// One document per input. Malformed input is an error.
fn run_document(args: &CliArgs, function: &mut JsonGet) -> anyhow::Result<ExitCode> {
    let mut document = Vec::new();
    open_input(args.path.as_ref())?
        .read_to_end(&mut document)
        .context("cannot read input")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match function.call(args.key.as_bytes(), &document) {
        Ok(result) => {
            debug!(found = result.is_some(), "extracted");
            write_result(&mut out, result, &args.null_text)?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ ExtractError::Malformed(_)) => {
            eprintln!("json-get: {err}");
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}

/// One document per line, like a table with one JSON column.
fn run_lines(args: &CliArgs, function: &mut JsonGet) -> anyhow::Result<ExitCode> {
    let mut input = open_input(args.path.as_ref())?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut line = Vec::new();
    let mut row = 0u64;
    let mut malformed = 0u64;
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).context("cannot read input")? == 0 {
            break;
        }
        row += 1;
        let document = line.strip_suffix(b"\n").unwrap_or(&line);
        let document = document.strip_suffix(b"\r").unwrap_or(document);

        let result = match function.call(args.key.as_bytes(), document) {
            Ok(result) => result,
            Err(err) => {
                warn!(row, "skipping row: {err}");
                malformed += 1;
                None
            }
        };
        debug!(row, found = result.is_some(), "extracted");
        write_result(&mut out, result, &args.null_text)?;
    }
    out.flush()?;
    function.release();

    info!(rows = row, malformed, "done");
    if malformed > 0 {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn run() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;
    let mut function = JsonGet::init(JsonGet::ARG_COUNT)?;
    if args.lines {
        run_lines(&args, &mut function)
    } else {
        run_document(&args, &mut function)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("json-get: {err:#}");
            ExitCode::from(64)
        }
    }
}
