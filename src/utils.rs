use std::error::Error;
use std::fmt;

/// bytes/cycle are stored as integers scaled by this factor
pub const BPC_SCALE: f64 = 1e6;

pub fn mhz_to_hz(mhz: f64) -> f64 {
    mhz * 1e6
}

/// Parse the core clock given on the CLI (MHz) and return it in Hz.
pub fn parse_mhz(s: &str) -> Result<f64, LlcErr> {
    match s.trim().parse::<f64>() {
        Ok(mhz) => Ok(mhz_to_hz(mhz)),
        Err(_) => Err(LlcErr::ParseClock {
            value: s.to_string(),
        }),
    }
}

/// scaled bytes/cycle -> bytes/cycle -> bytes/s -> GB/s
pub fn bpc_to_gbs(bpc_x1e6: f64, clock_hz: f64) -> f64 {
    let bpc = bpc_x1e6 / BPC_SCALE;
    (bpc * clock_hz) / 1e9
}

/// Returns None on an empty iterator.
/// NAN values never replace the current min or max.
pub fn min_and_max<'a, I, T>(s: I) -> Option<(T, T)>
where
    I: IntoIterator<Item = &'a T>,
    T: PartialOrd + Copy + 'a,
{
    let mut s_iter = s.into_iter();
    let (mut min, mut max) = match s_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in s_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// Byte count as a short label for the size axis, e.g. 4096 -> "4 KiB".
pub fn suitable_size_label(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut v = bytes;
    let mut unit = 0;
    while v >= 1024. && unit < UNITS.len() - 1 {
        v /= 1024.;
        unit += 1;
    }
    if (v - v.round()).abs() < 1e-6 {
        format!("{} {}", v.round(), UNITS[unit])
    } else {
        format!("{:.1} {}", v, UNITS[unit])
    }
}

/// Everything that can go wrong between the command line and the chart.
#[derive(Debug)]
pub enum LlcErr {
    Io(std::io::Error),
    MissingHeader,
    MissingField {
        line: usize,
        column: &'static str,
    },
    ParseField {
        line: usize,
        column: &'static str,
        value: String,
    },
    ZeroSize {
        line: usize,
    },
    ParseClock {
        value: String,
    },
}

impl Error for LlcErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LlcErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for LlcErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LlcErr::Io(e) => write!(f, "could not read the csv file: {}", e),
            LlcErr::MissingHeader => write!(f, "empty csv file, expected a header row"),
            LlcErr::MissingField { line, column } => {
                write!(f, "line {}: missing column {}", line, column)
            }
            LlcErr::ParseField {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: could not parse {} from {:?}",
                line, column, value
            ),
            LlcErr::ZeroSize { line } => {
                write!(f, "line {}: working set size must be > 0", line)
            }
            LlcErr::ParseClock { value } => {
                write!(f, "could not parse core clock (MHz) from {:?}", value)
            }
        }
    }
}

impl From<std::io::Error> for LlcErr {
    fn from(e: std::io::Error) -> Self {
        LlcErr::Io(e)
    }
}
