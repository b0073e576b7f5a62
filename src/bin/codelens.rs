use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use codelens::histogram::dump;
use codelens::{prepare_batch, rle, CodeLengths, ExtractConfig, Histogram, PackedLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Concatenated 1280-byte little-endian histogram records
    Binary,
    /// Whitespace-separated packed words, 316 per histogram
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "codelens")]
#[command(about = "Extract DEFLATE dynamic header code lengths from block histograms")]
#[command(version)]
struct Args {
    /// Input histogram file (use - for stdin)
    #[arg(short, long, required_unless_present = "fixed")]
    input: Option<PathBuf>,

    /// Input format
    #[arg(short, long, value_enum, default_value = "binary")]
    format: InputFormat,

    /// Use the fixed Huffman code lengths instead of reading input
    #[arg(long, conflicts_with = "input")]
    fixed: bool,

    /// Bit position of the code length field in packed words
    #[arg(long, default_value = "15")]
    length_shift: u32,

    /// Also print the run-length coded sequence (code length alphabet 0-18)
    #[arg(long)]
    rle: bool,

    /// Reject code lengths above 15
    #[arg(long)]
    strict: bool,

    /// Number of threads (0 = auto, 1 = single-threaded)
    #[arg(short = 't', long, default_value = "1")]
    threads: usize,

    /// Show verbose statistics
    #[arg(short, long)]
    verbose: bool,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<u8, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = ExtractConfig {
        layout: PackedLayout::new(args.length_shift)?,
        num_threads: args.threads,
        validate: args.strict,
    };

    let start = std::time::Instant::now();

    let histograms = if args.fixed {
        vec![Histogram::fixed()]
    } else {
        let path = args.input.as_ref().ok_or("input required unless --fixed is given")?;
        read_histograms(path, args.format, config.layout)?
    };

    let results = prepare_batch(&histograms, &config)?;

    let mut out = BufWriter::new(io::stdout().lock());
    for (block_id, lengths) in results.iter().enumerate() {
        write_block(&mut out, block_id, lengths, args.rle)?;
    }
    out.flush()?;

    let elapsed = start.elapsed();

    if args.verbose {
        let total_lengths: usize = results.iter().map(CodeLengths::len).sum();
        let literal_only = histograms
            .iter()
            .filter(|histogram| histogram.distances.iter().all(|entry| !entry.is_used()))
            .count();

        eprintln!("Extraction complete:");
        eprintln!("  Blocks:           {}", results.len());
        eprintln!("  Code lengths:     {}", total_lengths);
        eprintln!("  Literal-only:     {}", literal_only);
        eprintln!("  Time:             {:.2?}", elapsed);
    }

    Ok(EXIT_SUCCESS)
}

fn read_histograms(
    path: &Path,
    format: InputFormat,
    layout: PackedLayout,
) -> Result<Vec<Histogram>, Box<dyn std::error::Error>> {
    let is_stdin = path.to_str() == Some("-");

    let mut input: Box<dyn Read> = if is_stdin {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(path)?))
    };

    let histograms = match format {
        InputFormat::Binary => dump::read_binary(&mut input, layout)?,
        InputFormat::Text => {
            let mut text = String::new();
            input.read_to_string(&mut text)?;
            dump::parse_text(&text, layout)?
        }
    };
    Ok(histograms)
}

fn write_block<W: Write>(
    out: &mut W,
    block_id: usize,
    lengths: &CodeLengths,
    with_rle: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let counts = lengths.counts();
    writeln!(
        out,
        "block {}: literals={} distances={}",
        block_id, counts.literals, counts.distances
    )?;

    let values: Vec<String> = lengths.as_slice().iter().map(|l| l.to_string()).collect();
    writeln!(out, "lengths: {}", values.join(" "))?;

    if with_rle {
        let tokens: Vec<String> = rle::encode(lengths.as_slice())?
            .iter()
            .map(|token| match token.extra_bits() {
                0 => token.symbol.to_string(),
                _ => format!("{}+{}", token.symbol, token.extra),
            })
            .collect();
        writeln!(out, "rle: {}", tokens.join(" "))?;
    }

    Ok(())
}
