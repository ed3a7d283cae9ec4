// main.rs - CLI entry point

use std::path::Path;

use hybrid_reads::cli::{init_verbose, Config};
use hybrid_reads::output::RunSummary;
use hybrid_reads::pipeline::{self, RunSettings};
use hybrid_reads::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    init_verbose(args.verbose);
    let validation = validate_args(&args)?;

    println!("🚀 hybrid_reads v{}", VERSION);
    println!("📁 Input: {}", validation.input.display());
    println!("🏷️  Tag: {}", validation.tag);

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    let config = &validation.config;
    println!(
        "🔧 Filters: min length {}, max N {}, min quality {}",
        config.min_read_length, config.max_n_count, config.min_quality
    );
    println!(
        "🔧 Checks: indicative >= {}, mutual <= {}, alternating <= {}",
        config.min_indicative_snps, config.max_mutual_snps, config.max_alternating_artefacts
    );

    let settings = RunSettings {
        input: validation.input.clone(),
        output_dir: validation.output_dir.clone(),
        tag: validation.tag.clone(),
        config: validation.config.clone(),
        dry_run: args.dry_run,
        show_progress: !args.quiet,
    };
    let report = pipeline::run(&settings)?;

    let paths = match &report.outputs {
        Some(paths) => paths,
        None => {
            println!("✅ Dry run completed successfully");
            println!(
                "   {} read pairs, {} alleles, {} combinations",
                report.read_pairs,
                report.allele_names.len(),
                report.combinations
            );
            return Ok(());
        }
    };

    println!("\n📈 === CLASSIFICATION SUMMARY ===");
    for (category, count) in report.counters.rows() {
        println!("  {:<28} {}", category, count);
    }

    println!("\n💾 Results written to:");
    for path in paths.all() {
        println!("  {}", path.display());
    }

    if let Some(summary_path) = &args.summary_json {
        RunSummary::new(
            &validation.input,
            &validation.tag,
            &validation.config,
            paths,
            &report.counters,
        )
        .write_json(Path::new(summary_path))?;
        println!("📄 Summary saved to: {}", summary_path);
    }

    println!("\n✅ Completed in {:.2}s", report.elapsed_secs);
    Ok(())
}
