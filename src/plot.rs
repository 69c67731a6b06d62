use super::{USAGE, VERSION};
use clap::{App, AppSettings, Arg, ErrorKind};
use std::ffi::OsString;
use std::path::PathBuf;

/// Values taken from the command line by the llc_plot binary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArgs {
    pub csvin: PathBuf,
    /// kept as given, parsed to Hz by `utils::parse_mhz`
    pub core_mhz: String,
    /// svg with both figures, only written when asked for
    pub svgout: Option<PathBuf>,
    pub show: bool,
    pub print: bool,
    pub verbose: bool,
}

/// Takes the CLI arguments that control the plotting of the LLC sweep.
/// Missing positionals print the usage line and exit with status 1.
pub fn parse_cli() -> PlotArgs {
    match parse_cli_from(std::env::args_os()) {
        Ok(args) => args,
        Err(e) if e.kind == ErrorKind::MissingRequiredArgument => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

pub fn parse_cli_from<I, T>(itr: I) -> Result<PlotArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arg_csvin = Arg::with_name("input_csvfile")
        .help("csv file with the sweep: sizeB,read_cold,read_hot,copy_Bpc_x1e6")
        .value_name("csv_path")
        .required(true)
        .index(1);
    let arg_mhz = Arg::with_name("core_mhz")
        .help("core clock in MHz, used to convert bytes/cycle to GB/s")
        .value_name("core_MHz")
        .required(true)
        .index(2);
    let arg_svgout = Arg::with_name("output_svgfile")
        .help("also write both figures to this svg file")
        .short("o")
        .long("svgfile")
        .takes_value(true);
    let arg_no_show = Arg::with_name("no_show")
        .help("do not open the chart windows")
        .short("n")
        .long("no-show")
        .takes_value(false);
    let arg_print = Arg::with_name("print")
        .help("print the parsed sweep with the GB/s column to stdout")
        .short("p")
        .long("print")
        .takes_value(false);
    let arg_verbose = Arg::with_name("verbose")
        .help("print debug information")
        .short("v")
        .long("verbose")
        .takes_value(false);
    let cli_args = App::new("llc_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot LLC latency (cold vs hot) and copy throughput")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(arg_csvin)
        .arg(arg_mhz)
        .arg(arg_svgout)
        .arg(arg_no_show)
        .arg(arg_print)
        .arg(arg_verbose)
        .get_matches_from_safe(itr)?;

    // both positionals are required, clap already rejected missing ones
    let csvin = PathBuf::from(cli_args.value_of_os("input_csvfile").unwrap_or_default());
    let core_mhz = String::from(cli_args.value_of("core_mhz").unwrap_or_default());
    let svgout = cli_args.value_of_os("output_svgfile").map(PathBuf::from);
    Ok(PlotArgs {
        csvin,
        core_mhz,
        svgout,
        show: !cli_args.is_present("no_show"),
        print: cli_args.is_present("print"),
        verbose: cli_args.is_present("verbose"),
    })
}
