use adjiolib::{
    error::{AdjioError, Result},
    formats::{csv::Csv, report::ReportText},
    traits::{ReadFormat, WriteFormat},
};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "adjio", version, about = "Нормализация выписки корректировок в CSV")]
struct Cli {
    /// Входной файл (по умолчанию stdin)
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Выходной файл (по умолчанию stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn main() -> Result<()> {
    // диагностика уходит в stderr, CSV может идти в stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // reader
    let reader: Box<dyn io::Read> = match cli.input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin()),
    };
    let st = ReportText::read(BufReader::new(reader))?;

    // writer
    let mut writer: Box<dyn Write> = match cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    Csv::write(&mut writer, &st)?;

    writer.flush().map_err(AdjioError::from)
}
