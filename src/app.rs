use std::error::Error;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, error::ErrorKind};
use tracing::info;

use crate::config::KFoldConfig;
use crate::constants::config::{CLI_SUM_TOLERANCE, DEFAULT_K, MIN_K};
use crate::constants::store::DEFAULT_FOLD_DIR;
use crate::data::{Example, Tweet, split_columns};
use crate::errors::FoldError;
use crate::kfold::GroupedKFold;
use crate::metrics::summarize_fold;
use crate::splits::SplitSpec;
use crate::store::FoldStore;

/// Label type of staged examples read by the CLI.
pub type ExampleLabel = i64;

#[derive(Debug, Parser)]
#[command(
    name = "gen_kfold",
    disable_help_subcommand = true,
    about = "Generate user-grouped k-fold splits",
    long_about = "Split labelled tweets into k train/valid/test folds that keep each user's tweets in one partition and balance labels across buckets.",
    after_help = "Folds are written to <kfold-dir>/<k>.json; an existing file is read back instead of regenerated."
)]
struct GenKFoldCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON-lines file of labelled examples ({\"point\": <tweet>, \"label\": <int>})"
    )]
    examples: PathBuf,
    #[arg(
        long = "kfold-dir",
        value_name = "PATH",
        default_value = DEFAULT_FOLD_DIR,
        help = "Directory with k-fold splits"
    )]
    kfold_dir: PathBuf,
    #[arg(
        long,
        default_value_t = DEFAULT_K,
        value_parser = parse_fold_count,
        help = "Number of folds"
    )]
    k: usize,
    #[arg(
        long = "split-spec",
        value_name = "TRAIN,VALID,TEST",
        value_parser = parse_split_spec_arg,
        default_value = "0.8,0.1,0.1",
        help = "Comma-separated split fractions that must sum to 1"
    )]
    split: SplitSpec,
}

/// Run the `gen_kfold` command with `args_iter` (program name excluded).
pub fn run_gen_kfold<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<GenKFoldCli, _>(std::iter::once("gen_kfold".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = KFoldConfig {
        k: cli.k,
        split: cli.split,
        fold_dir: cli.kfold_dir,
    };
    config.validate()?;

    let examples = read_examples(&cli.examples)?;
    info!(
        examples = examples.len(),
        path = %cli.examples.display(),
        "loaded labelled examples"
    );
    let (points, labels) = split_columns(examples);

    let splitter = GroupedKFold::new(config.k, Tweet::user_key)?;
    let store = FoldStore::new(&config.fold_dir);
    let folds = store.load_or_generate(&splitter, &points, &labels, &config.split)?;

    println!(
        "{} folds for {} examples in {}",
        folds.len(),
        points.len(),
        store.path_for(config.k).display()
    );
    for (idx, fold) in folds.iter().enumerate() {
        let summary = summarize_fold(idx + 1, fold, &labels)?;
        info!(fold = idx + 1, "{summary}");
        println!("{summary}");
    }
    Ok(())
}

/// Read one labelled example per line, skipping blank lines.
pub fn read_examples(path: &Path) -> Result<Vec<Example<Tweet, ExampleLabel>>, FoldError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut examples = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let example = serde_json::from_str(&line).map_err(|err| {
            FoldError::FoldStore(format!(
                "invalid example at {}:{}: {err}",
                path.display(),
                line_no + 1
            ))
        })?;
        examples.push(example);
    }
    Ok(examples)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

fn parse_fold_count(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --k value '{raw}' as a positive integer"))?;
    if parsed < MIN_K {
        return Err(format!("--k must be at least {MIN_K}"));
    }
    Ok(parsed)
}

fn parse_split_spec_arg(raw: &str) -> Result<SplitSpec, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err("--split-spec expects exactly 3 comma-separated values".to_string());
    }
    let mut values = [0.0f64; 3];
    for (slot, (name, part)) in values
        .iter_mut()
        .zip(["train", "valid", "test"].iter().zip(&parts))
    {
        *slot = part
            .parse::<f64>()
            .map_err(|_| format!("invalid {name} fraction '{part}': must be a float"))?;
    }
    let [train, valid, test] = values;
    SplitSpec::with_tolerance(train, valid, test, CLI_SUM_TOLERANCE)
        .map_err(|err| err.to_string())
}
