use clap::{Parser, Subcommand};
use nbnorm_cli::parsers::ProcessFlags;
use nbnorm_cli::resolve_options;
use nbnorm_core::normalize::NormalizationTerms;
use nbnorm_core::{verbose_println, CubeStatistics};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nbnorm")]
#[command(version, about = "Narrowband (Ha/OIII/SII) to color composite converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a three-plane narrowband cube into a color composite
    Process {
        /// Input FITS cube (3 planes: reference, OIII, SII)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Output domain: 0=linear, 1=non-linear
        #[arg(long, value_name = "N")]
        mode: Option<u8>,

        /// Lightness source: 0=off, 1=CIE-L from source, 2=reference, 3=SII, 4=OIII
        #[arg(long, value_name = "N")]
        lightness: Option<u8>,

        /// SCNR green suppression: 0=off, 1=on
        #[arg(long, value_name = "N")]
        scnr: Option<u8>,

        /// Blackpoint fraction between pooled min and median (0 to 1)
        #[arg(long, value_name = "FLOAT")]
        blackpoint: Option<f32>,

        /// SII boost factor
        #[arg(long, value_name = "FLOAT")]
        sii_boost: Option<f32>,

        /// OIII boost factor
        #[arg(long, value_name = "FLOAT")]
        oiii_boost: Option<f32>,

        /// Highlight recovery ceiling
        #[arg(long, value_name = "FLOAT")]
        hl_recover: Option<f32>,

        /// Highlight reduction factor
        #[arg(long, value_name = "FLOAT")]
        hl_reduction: Option<f32>,

        /// Brightness adjustment factor
        #[arg(long, value_name = "FLOAT")]
        brightness: Option<f32>,

        /// Save each channel independently (_r/_g/_b suffixes)
        #[arg(long)]
        save_channels: bool,

        /// Enable debug output showing intermediate statistics
        #[arg(long)]
        debug: bool,
    },

    /// Inspect pooled statistics and derived normalization terms
    Stats {
        /// Input FITS cube
        input: PathBuf,

        /// Blackpoint fraction used for the derived terms
        #[arg(long, value_name = "FLOAT", default_value = "1.0")]
        blackpoint: f32,

        /// Save the report to a JSON file
        #[arg(short, long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process {
            input,
            output,
            mode,
            lightness,
            scnr,
            blackpoint,
            sii_boost,
            oiii_boost,
            hl_recover,
            hl_reduction,
            brightness,
            save_channels,
            debug,
        } => cmd_process(
            input,
            output,
            ProcessFlags {
                mode,
                lightness,
                scnr,
                blackpoint,
                oiii_boost,
                sii_boost,
                hl_recover,
                hl_reduction,
                brightness,
                save_channels,
                debug,
            },
        ),

        Commands::Stats {
            input,
            blackpoint,
            save,
        } => cmd_stats(input, blackpoint, save),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_process(input: PathBuf, output: PathBuf, flags: ProcessFlags) -> Result<(), String> {
    nbnorm_core::config::log_config_usage();

    let defaults = &nbnorm_core::config::pipeline_config_handle().config.defaults;
    let options = resolve_options(&flags, defaults)?;
    nbnorm_core::config::set_verbose(options.debug);
    verbose_println!("[DEBUG] Resolved options: {:?}", options);

    println!("Converting {} to color composite...", input.display());

    println!("Decoding cube...");
    let cube = nbnorm_core::decoders::decode_image(&input)?;
    println!("  Cube: {}x{}, 3 planes", cube.width, cube.height);

    println!("Processing...");
    let composite = nbnorm_core::pipeline::process_cube(&cube, &options)?;

    if options.save_channels {
        println!("Exporting channels...");
        let written = nbnorm_core::exporters::export_channels(&composite, &output)?;
        for path in &written {
            println!("  Wrote {}", path.display());
        }
        println!("Done! {} channel files saved.", written.len());
    } else {
        println!("Exporting composite...");
        nbnorm_core::exporters::export_combined(&composite, &output)?;
        println!("Done! Composite saved to: {}", output.display());
    }

    Ok(())
}

/// JSON report emitted by the `stats` command
#[derive(serde::Serialize)]
struct StatsReport {
    statistics: CubeStatistics,
    blackpoint: f32,
    terms: Option<NormalizationTerms>,
}

fn cmd_stats(input: PathBuf, blackpoint: f32, save: Option<PathBuf>) -> Result<(), String> {
    nbnorm_core::config::log_config_usage();

    if !(0.0..=1.0).contains(&blackpoint) {
        return Err(format!("blackpoint {} must be in range [0.0, 1.0]", blackpoint));
    }

    println!("Analyzing {}...", input.display());
    let cube = nbnorm_core::decoders::decode_image(&input)?;
    println!("  Cube: {}x{}, 3 planes", cube.width, cube.height);

    let statistics = nbnorm_core::stats::compute_statistics(&cube);
    println!("\nPooled statistics:");
    println!("  min:    {:.6}", statistics.min);
    println!("  median: {:.6}", statistics.median);
    println!("  mean:   {:.6}", statistics.mean);
    println!("  adev:   {:.6}", statistics.mean_abs_deviation);

    let terms = match nbnorm_core::normalize::derive_terms(&statistics, blackpoint) {
        Ok(terms) => {
            println!("\nNormalization terms (blackpoint {}):", blackpoint);
            println!("  baseline m:     {:.6}", terms.baseline);
            println!("  noise floor e0: {:.6}", terms.noise_floor);
            println!("  ratio a0:       {:.6}", terms.ratio);
            Some(terms)
        }
        Err(e) => {
            eprintln!("\nWarning: {}", e);
            None
        }
    };

    if let Some(save_path) = save {
        let report = StatsReport {
            statistics,
            blackpoint,
            terms,
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("failed to serialize statistics: {}", e))?;
        std::fs::write(&save_path, json)
            .map_err(|e| format!("failed to write statistics file: {}", e))?;
        println!("\nStatistics saved to: {}", save_path.display());
    }

    Ok(())
}
