use llc_plot::plot::parse_cli;
use llc_plot::utils::parse_mhz;
use llc_plot::view;
use llc_plot::LlcSweep;
use tracing::info;
use tracing::metadata::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .try_init()
        .unwrap_or_else(|e| {
            eprintln!("failed to init logger: {}", e);
        });

    let clock_hz = parse_mhz(&args.core_mhz)?;
    info!(
        "read data from {}, core clock {} Hz",
        args.csvin.display(),
        clock_hz
    );
    let sweep = LlcSweep::from_csv(&args.csvin)?;
    if args.print {
        print!("{}", sweep.table(clock_hz));
    }
    if let Some(svgout) = &args.svgout {
        sweep.plot_llc(clock_hz, svgout)?;
    }
    if args.show {
        view::show(&sweep, clock_hz)?;
    }
    Ok(())
}
