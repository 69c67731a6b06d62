use crate::utils::*;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
pub mod plot;
pub mod utils;
pub mod view;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
pub const USAGE: &str = "Usage: llc_plot <csv_path> <core_MHz>";
pub const SVG_SIZE: (u32, u32) = (1600, 800);
pub const WINDOW_SIZE: (u32, u32) = (800, 600);

const X_DESC: &str = "Working set size (bytes, log2)";
const FONT: &str = "sans-serif";
const MAX_X_LABELS: usize = 10;
const MAX_Y_LABELS: usize = 10;
const GRID_DOTS: usize = 80;
// 1 B to 1 MiB when there is nothing to plot
const EMPTY_XRANGE: Range<f64> = 0.0..20.0;
// log2(1.5)
const X_PAD: f64 = 0.584_962_500_721_156;

/// One LLC sweep, one vector per csv column, in input row order.
#[derive(Debug, Clone, PartialEq)]
pub struct LlcSweep {
    pub size: Vec<u64>,
    pub cold: Vec<f64>,
    pub hot: Vec<f64>,
    pub copy_bpc_x1e6: Vec<f64>,
}

impl LlcSweep {
    pub fn new(capacity: usize) -> LlcSweep {
        LlcSweep {
            size: Vec::with_capacity(capacity),
            cold: Vec::with_capacity(capacity),
            hot: Vec::with_capacity(capacity),
            copy_bpc_x1e6: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.size.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Read a sweep from the csv file at `fin`.
    /// The file is closed when this returns, whatever the outcome.
    pub fn from_csv<P>(fin: P) -> Result<LlcSweep, LlcErr>
    where
        P: AsRef<Path>,
    {
        let file = File::open(fin.as_ref())?;
        let sweep = LlcSweep::from_reader(BufReader::new(file))?;
        info!("read {} rows from {}", sweep.len(), fin.as_ref().display());
        Ok(sweep)
    }

    /// Skip the header, skip blank lines, and parse
    /// sizeB, read_cold, read_hot, copy_Bpc_x1e6 from every other line.
    /// The first malformed field stops the read; trailing extra fields are ignored.
    pub fn from_reader<R: BufRead>(buf: R) -> Result<LlcSweep, LlcErr> {
        let mut lines = buf.lines();
        match lines.next() {
            Some(header) => debug!("skipping header: {}", header?),
            None => return Err(LlcErr::MissingHeader),
        }
        let mut sweep = LlcSweep::new(32);
        for (i, l) in lines.enumerate() {
            // 1-based, counting the header
            let line = i + 2;
            let l = l?;
            if l.trim().is_empty() {
                debug!("skipping empty line {}", line);
                continue;
            }
            let mut l_split = l.split(',');
            let size: u64 = parse_field(l_split.next(), line, "sizeB")?;
            let cold: f64 = parse_field(l_split.next(), line, "read_cold")?;
            let hot: f64 = parse_field(l_split.next(), line, "read_hot")?;
            let copy: f64 = parse_field(l_split.next(), line, "copy_Bpc_x1e6")?;
            if size == 0 {
                return Err(LlcErr::ZeroSize { line });
            }
            sweep.size.push(size);
            sweep.cold.push(cold);
            sweep.hot.push(hot);
            sweep.copy_bpc_x1e6.push(copy);
        }
        Ok(sweep)
    }

    /// copy throughput in GB/s for each row, given the core clock in Hz
    pub fn throughput_gbs(&self, clock_hz: f64) -> Vec<f64> {
        self.copy_bpc_x1e6
            .iter()
            .map(|&b| bpc_to_gbs(b, clock_hz))
            .collect()
    }

    pub fn table(&self, clock_hz: f64) -> SweepTable<'_> {
        SweepTable {
            sweep: self,
            clock_hz,
        }
    }

    /// Writes both figures side by side into one svg:
    /// cold vs hot cycles per line on the left, copy throughput on the right.
    pub fn plot_llc<P>(&self, clock_hz: f64, fout: P) -> Result<(), Box<dyn Error>>
    where
        P: AsRef<Path>,
    {
        let root = SVGBackend::new(fout.as_ref(), SVG_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));
        self.draw(Figure::Latency, clock_hz, &panels[0])?;
        self.draw(Figure::Throughput, clock_hz, &panels[1])?;
        root.present()?;
        info!("plotted to {}", fout.as_ref().display());
        Ok(())
    }

    /// Renders one figure into an RGB buffer of `size`, 3 bytes per pixel, row major.
    pub fn render_rgb(
        &self,
        figure: Figure,
        clock_hz: f64,
        size: (u32, u32),
    ) -> Result<Vec<u8>, Box<dyn Error>> {
        let mut buf = vec![0u8; size.0 as usize * size.1 as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, size).into_drawing_area();
            root.fill(&WHITE)?;
            self.draw(figure, clock_hz, &root)?;
            root.present()?;
        }
        Ok(buf)
    }

    /// Draws `figure` on `area`. x is log2 of the working set size for both figures.
    pub fn draw<DB>(
        &self,
        figure: Figure,
        clock_hz: f64,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let sizes: Vec<f64> = self.size.iter().map(|&s| (s as f64).log2()).collect();
        // pad by a factor of 1.5 on each side of the size range
        let xrange = match min_and_max(&sizes) {
            Some((xmin, xmax)) => (xmin - X_PAD)..(xmax + X_PAD),
            None => EMPTY_XRANGE,
        };
        debug!("{} x range {:?}", figure.title(), xrange);

        match figure {
            Figure::Latency => {
                let mut chart = llc_chart(
                    area,
                    figure.title(),
                    "Cycles per cache line",
                    xrange,
                    y_top(self.cold.iter().chain(self.hot.iter())),
                )?;
                let cold: Vec<(f64, f64)> =
                    sizes.iter().copied().zip(self.cold.iter().copied()).collect();
                let hot: Vec<(f64, f64)> =
                    sizes.iter().copied().zip(self.hot.iter().copied()).collect();
                chart
                    .draw_series(LineSeries::new(cold.clone(), RED.stroke_width(2)))?
                    .label("Cold (cycles/line)")
                    .legend(|(x, y)| {
                        EmptyElement::at((x, y))
                            + PathElement::new(vec![(-10, 0), (10, 0)], RED.stroke_width(2))
                            + Circle::new((0, 0), 4, RED.filled())
                    });
                chart.draw_series(cold.iter().map(|&p| Circle::new(p, 4, RED.filled())))?;
                chart
                    .draw_series(LineSeries::new(hot.clone(), BLUE.stroke_width(2)))?
                    .label("Hot (cycles/line)")
                    .legend(|(x, y)| {
                        EmptyElement::at((x, y))
                            + PathElement::new(vec![(-10, 0), (10, 0)], BLUE.stroke_width(2))
                            + Cross::new((0, 0), 4, BLUE.stroke_width(2))
                    });
                chart.draw_series(
                    hot.iter()
                        .map(|&p| Cross::new(p, 4, BLUE.stroke_width(2))),
                )?;
                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .label_font((FONT, 18))
                    .draw()?;
            }
            Figure::Throughput => {
                let gbs = self.throughput_gbs(clock_hz);
                let mut chart = llc_chart(
                    area,
                    figure.title(),
                    "GB/s (copy inside LLC)",
                    xrange,
                    y_top(gbs.iter()),
                )?;
                let copy: Vec<(f64, f64)> =
                    sizes.iter().copied().zip(gbs.iter().copied()).collect();
                chart.draw_series(LineSeries::new(copy.clone(), RED.stroke_width(2)))?;
                chart.draw_series(copy.iter().map(|&p| Circle::new(p, 4, RED.filled())))?;
            }
        }
        Ok(())
    }
}

/// The two charts of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    Latency,
    Throughput,
}

impl Figure {
    pub const ALL: [Figure; 2] = [Figure::Latency, Figure::Throughput];

    pub fn title(&self) -> &'static str {
        match self {
            Figure::Latency => "LLC latency: cold vs hot",
            Figure::Throughput => "LLC streaming throughput",
        }
    }
}

/// x is log2 of the working set size, labelled back in bytes,
/// y is linear from 0, dotted grid on the labelled points of both axes.
fn llc_chart<'a, DB>(
    area: &'a DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    xrange: Range<f64>,
    ymax: f64,
) -> Result<ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>, Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(xrange.clone(), 0f64..ymax)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .set_all_tick_mark_size(2)
        .x_labels(MAX_X_LABELS)
        .y_labels(MAX_Y_LABELS)
        .label_style((FONT, 18))
        .x_desc(X_DESC)
        .y_desc(y_desc)
        .x_label_formatter(&|x: &f64| suitable_size_label(x.exp2()))
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;

    // the mesh has no dash style, draw the grid by hand on the same key points
    let (xs, ys) = {
        let coord = chart.as_coord_spec();
        (
            coord.x_spec().key_points(MAX_X_LABELS),
            coord.y_spec().key_points(MAX_Y_LABELS),
        )
    };
    for x in xs {
        chart.draw_series(dotted_line((x, 0.), (x, ymax)))?;
    }
    for y in ys {
        chart.draw_series(dotted_line((xrange.start, y), (xrange.end, y)))?;
    }
    Ok(chart)
}

/// Straight line from `a` to `b` as `GRID_DOTS` short dashes.
fn dotted_line(a: (f64, f64), b: (f64, f64)) -> Vec<PathElement<(f64, f64)>> {
    let at = |t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
    let step = 1. / (2 * GRID_DOTS) as f64;
    (0..GRID_DOTS)
        .map(|i| {
            let t = (2 * i) as f64 * step;
            PathElement::new(vec![at(t), at(t + step)], BLACK.mix(0.35).stroke_width(1))
        })
        .collect()
}

/// upper end of a y axis that starts at 0
fn y_top<'a, I>(v: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    match min_and_max(v.into_iter().filter(|y| y.is_finite())) {
        Some((_, max)) if max > 0. => max * 1.1,
        _ => 1.,
    }
}

fn parse_field<T: FromStr>(
    field: Option<&str>,
    line: usize,
    column: &'static str,
) -> Result<T, LlcErr> {
    let field = match field {
        Some(f) => unquote(f.trim()),
        None => return Err(LlcErr::MissingField { line, column }),
    };
    field.parse::<T>().map_err(|_| LlcErr::ParseField {
        line,
        column,
        value: field.to_string(),
    })
}

/// `"1024"` -> `1024`, anything else unchanged
fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// The parsed sweep with the derived throughput column, printable as csv.
pub struct SweepTable<'a> {
    sweep: &'a LlcSweep,
    clock_hz: f64,
}

impl fmt::Display for SweepTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sizeB,read_cold,read_hot,copy_Bpc_x1e6,copy_GBps")?;
        let gbs = self.sweep.throughput_gbs(self.clock_hz);
        for i in 0..self.sweep.len() {
            writeln!(
                f,
                "{},{},{},{},{}",
                self.sweep.size[i],
                self.sweep.cold[i],
                self.sweep.hot[i],
                self.sweep.copy_bpc_x1e6[i],
                gbs[i]
            )?;
        }
        Ok(())
    }
}
