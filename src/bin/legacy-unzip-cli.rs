//! legacy-unzip-cli - Command-line interface for the legacy zip decoders
//!
//! A command-line tool for decoding raw Shrink, Reduce and Implode streams
//! taken from zip entries.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use legacy_unzip::{
    crc32, CompressionMethod, Decompressor, EntryInfo, ExplodeConfig, ExplodeStatus,
};
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "legacy-unzip-cli")]
#[command(about = "A CLI tool for decoding Shrink, Reduce and Implode zip streams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a raw compressed stream
    Decode {
        /// Input file holding the compressed stream
        input: PathBuf,

        /// Output decoded file
        output: PathBuf,

        /// Compression method of the stream
        #[arg(short, long, value_enum)]
        method: CliMethod,

        /// Declared uncompressed size
        #[arg(short, long)]
        size: usize,

        /// General purpose bit flag of the entry (Implode only)
        #[arg(long, default_value_t = 0)]
        flags: u16,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Decode a stream and compare it against the original file
    Verify {
        /// Input file holding the compressed stream
        input: PathBuf,

        /// Uncompressed original
        expected: PathBuf,

        /// Compression method of the stream
        #[arg(short, long, value_enum)]
        method: CliMethod,

        /// General purpose bit flag of the entry (Implode only)
        #[arg(long, default_value_t = 0)]
        flags: u16,
    },

    /// Show stream parameters and the CRC-32 of the decoded data
    Info {
        /// Input file holding the compressed stream
        input: PathBuf,

        /// Compression method of the stream
        #[arg(short, long, value_enum)]
        method: CliMethod,

        /// Declared uncompressed size
        #[arg(short, long)]
        size: usize,

        /// General purpose bit flag of the entry (Implode only)
        #[arg(long, default_value_t = 0)]
        flags: u16,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliMethod {
    /// Method 1, Shrink (dynamic LZW)
    Shrink,
    /// Method 2, Reduce with factor 1
    Reduce1,
    /// Method 3, Reduce with factor 2
    Reduce2,
    /// Method 4, Reduce with factor 3
    Reduce3,
    /// Method 5, Reduce with factor 4
    Reduce4,
    /// Method 6, Implode
    Implode,
}

impl From<CliMethod> for CompressionMethod {
    fn from(method: CliMethod) -> Self {
        match method {
            CliMethod::Shrink => CompressionMethod::Shrunk,
            CliMethod::Reduce1 => CompressionMethod::Reduced1,
            CliMethod::Reduce2 => CompressionMethod::Reduced2,
            CliMethod::Reduce3 => CompressionMethod::Reduced3,
            CliMethod::Reduce4 => CompressionMethod::Reduced4,
            CliMethod::Implode => CompressionMethod::Imploded,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            method,
            size,
            flags,
            force,
        } => decode_file(
            &input,
            &output,
            method.into(),
            size,
            flags,
            force,
            cli.verbose,
            cli.quiet,
        ),
        Commands::Verify {
            input,
            expected,
            method,
            flags,
        } => verify_file(&input, &expected, method.into(), flags, cli.quiet),
        Commands::Info {
            input,
            method,
            size,
            flags,
        } => show_stream_info(&input, method.into(), size, flags, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn entry_for(method: CompressionMethod, flags: u16, data: &[u8], size: usize) -> EntryInfo {
    EntryInfo::new(method as u16, flags, data.len(), size)
}

#[allow(clippy::too_many_arguments)]
fn decode_file(
    input: &Path,
    output: &Path,
    method: CompressionMethod,
    size: usize,
    flags: u16,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    if verbose {
        println!("Decoding '{}' to '{}'", input.display(), output.display());
        println!("Method: {:?}, Size: {} bytes", method, size);
    }

    let start_time = Instant::now();

    let compressed_data = fs::read(input)?;
    let input_size = compressed_data.len();

    if verbose {
        println!("Compressed size: {} bytes", input_size);
    }

    // Show progress bar for large files
    let progress = if !quiet && input_size > 1024 * 1024 {
        let pb = ProgressBar::new(2);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Decoding...");
        Some(pb)
    } else {
        None
    };

    if let Some(ref pb) = progress {
        pb.inc(1);
    }

    let decompressor = Decompressor::new();
    let entry = entry_for(method, flags, &compressed_data, size);
    let decoded = decompressor
        .decompress_to_vec(&entry, &compressed_data)
        .map_err(|e| format!("Decoding failed: {}", e))?;

    if let Some(ref pb) = progress {
        pb.inc(1);
        pb.finish_with_message("Decoding complete");
    }

    fs::write(output, &decoded)?;

    let decode_time = start_time.elapsed();

    if !quiet {
        println!("✓ Decoding successful!");
        println!("  Input:  {} bytes", input_size);
        println!("  Output: {} bytes", decoded.len());
        println!("  CRC-32: {:08x}", crc32(&decoded));
        println!("  Time:   {:.2?}", decode_time);

        if decoded.len() < size {
            println!("  Note: stream ended before the declared size was reached");
        }
    }

    Ok(())
}

fn verify_file(
    input: &Path,
    expected: &Path,
    method: CompressionMethod,
    flags: u16,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let compressed_data = fs::read(input)?;
    let expected_data = fs::read(expected)?;

    let decompressor = Decompressor::new();
    let entry = entry_for(method, flags, &compressed_data, expected_data.len());
    let decoded = decompressor
        .decompress_to_vec(&entry, &compressed_data)
        .map_err(|e| format!("Decoding failed: {}", e))?;

    let expected_crc = crc32(&expected_data);
    let decoded_crc = crc32(&decoded);

    if decoded.len() != expected_data.len() || decoded_crc != expected_crc {
        return Err(format!(
            "Mismatch: decoded {} bytes (crc {:08x}), expected {} bytes (crc {:08x})",
            decoded.len(),
            decoded_crc,
            expected_data.len(),
            expected_crc
        )
        .into());
    }

    if !quiet {
        println!("✓ Verified {} bytes, CRC-32 {:08x}", decoded.len(), decoded_crc);
    }

    Ok(())
}

fn show_stream_info(
    input: &Path,
    method: CompressionMethod,
    size: usize,
    flags: u16,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let data = fs::read(input)?;

    println!("Stream Information:");
    println!("  File: {}", input.display());
    println!("  Compressed Size: {} bytes", data.len());
    println!("  Method: {:?} ({})", method, method as u16);

    match method {
        CompressionMethod::Imploded => {
            let config = ExplodeConfig::from_flags(flags);
            println!(
                "  Literals: {}",
                if config.coded_literals { "coded" } else { "raw" }
            );
            println!("  Window: {} bytes", config.window_size());
            println!("  Minimum Match: {}", config.min_match());
        }
        CompressionMethod::Shrunk => {
            println!("  Code Width: 9 to 13 bits");
        }
        _ => {
            if let Some(factor) = method.reduce_factor() {
                println!(
                    "  Reduction Factor: {} ({} length bits)",
                    factor as u8,
                    factor.length_bits()
                );
            }
        }
    }

    let decompressor = Decompressor::new();
    let mut output = vec![0u8; size];
    let decoded = match method {
        CompressionMethod::Imploded => decompressor
            .explode(flags, &data, &mut output, size)
            .map(|outcome| {
                if verbose {
                    println!("  Literals Decoded: {}", outcome.stats.literal_count);
                    println!("  Matches Decoded: {}", outcome.stats.match_count);
                    println!("  Longest Match: {}", outcome.stats.longest_match);
                }
                if outcome.status == ExplodeStatus::InputMismatch {
                    println!(
                        "  Note: input cursor ended at byte {} of {}",
                        outcome.consumed,
                        data.len()
                    );
                }
                outcome.written
            }),
        _ => decompressor.decompress(&entry_for(method, flags, &data, size), &data, &mut output),
    };

    match decoded {
        Ok(written) => {
            println!("  Decoded Size: {} bytes", written);
            println!("  CRC-32: {:08x}", crc32(&output[..written]));
            println!("  Status: ✓ Valid stream");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or corrupted stream");
            if verbose {
                println!("  Error: {} (legacy code {})", e, e.legacy_code());
            }
        }
    }

    Ok(())
}
