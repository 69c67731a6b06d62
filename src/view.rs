use crate::{Figure, LlcSweep, WINDOW_SIZE};
use minifb::{Key, Window, WindowOptions};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, warn};

const FRAME: Duration = Duration::from_millis(30);

/// packs plotters' RGB bytes into the 0RGB words minifb draws
pub fn rgb_to_0rgb(rgb: &[u8]) -> Vec<u32> {
    rgb.chunks_exact(3)
        .map(|px| ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | (px[2] as u32))
        .collect()
}

/// Opens one window per figure and blocks until all of them are closed
/// (or Esc is pressed in each).
/// Nothing is written to disk. When no window can be opened, e.g. without a
/// display, this warns and returns Ok: the figures are simply not shown.
pub fn show(sweep: &LlcSweep, clock_hz: f64) -> Result<(), Box<dyn Error>> {
    let (width, height) = (WINDOW_SIZE.0 as usize, WINDOW_SIZE.1 as usize);
    let mut windows: Vec<(Window, Vec<u32>)> = Vec::with_capacity(Figure::ALL.len());
    for figure in Figure::ALL {
        let frame = rgb_to_0rgb(&sweep.render_rgb(figure, clock_hz, WINDOW_SIZE)?);
        match Window::new(figure.title(), width, height, WindowOptions::default()) {
            Ok(window) => windows.push((window, frame)),
            Err(e) => {
                warn!("could not open a window for {:?}: {}", figure.title(), e);
                return Ok(());
            }
        }
    }

    info!("showing {} figures, close the windows to exit", windows.len());
    loop {
        windows.retain(|(w, _)| w.is_open() && !w.is_key_down(Key::Escape));
        if windows.is_empty() {
            break;
        }
        for (window, frame) in windows.iter_mut() {
            window.update_with_buffer(frame, width, height)?;
        }
        std::thread::sleep(FRAME);
    }
    debug!("all windows closed");
    Ok(())
}
