use plotters::prelude::IntoFont;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn llc_plot(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_llc_plot"))
        .args(args)
        .output()
        .expect("could not run llc_plot")
}

/// csv in the temp dir, unique per test and process
fn write_csv(name: &str, content: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("llc_plot_{}_{}.csv", name, std::process::id()));
    fs::write(&p, content).unwrap();
    p
}

// svg text layout goes through the system fonts
fn font_available() -> bool {
    match ("sans-serif", 12).into_font().box_size("0") {
        Ok(_) => true,
        Err(e) => {
            println!("skipping, no sans-serif font: {:?}", e);
            false
        }
    }
}

#[test]
fn no_arguments_prints_usage() {
    let out = llc_plot(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn one_argument_prints_usage() {
    let out = llc_plot(&["run.csv"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn valid_run_exits_0_and_writes_nothing() {
    let csvin = write_csv(
        "ok",
        "sizeB,read_cold,read_hot,copy\n4096,10.5,2.3,1500000\n\n8192,12,2.4,2000000\n",
    );
    let out = llc_plot(&["--no-show", "--print", csvin.to_str().unwrap(), "2000"]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        rows,
        vec![
            "sizeB,read_cold,read_hot,copy_Bpc_x1e6,copy_GBps",
            "4096,10.5,2.3,1500000,3",
            "8192,12,2.4,2000000,4",
        ]
    );
    assert!(!csvin.with_extension("svg").exists());
    fs::remove_file(&csvin).unwrap();
}

#[test]
fn header_only_csv_exits_0() {
    let csvin = write_csv("empty", "sizeB,read_cold,read_hot,copy\n");
    let out = llc_plot(&["-n", "-p", csvin.to_str().unwrap(), "2000"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim_end(),
        "sizeB,read_cold,read_hot,copy_Bpc_x1e6,copy_GBps"
    );
    fs::remove_file(&csvin).unwrap();
}

#[test]
fn negative_clock_is_accepted() {
    let csvin = write_csv("negclock", "sizeB,a,b,c\n1024,40,3,1000000\n");
    let out = llc_plot(&["-n", "-p", csvin.to_str().unwrap(), "-5"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("1024,40,3,1000000,-0.005"));
    fs::remove_file(&csvin).unwrap();
}

#[test]
fn svg_written_only_with_o() {
    if !font_available() {
        return;
    }
    let csvin = write_csv("svgpath", "sizeB,a,b,c\n1024,40,3,1000000\n2048,50,3,1200000\n");
    let mut svgout = std::env::temp_dir();
    svgout.push(format!("llc_plot_custom_{}.svg", std::process::id()));
    let out = llc_plot(&[
        "-n",
        "-o",
        svgout.to_str().unwrap(),
        csvin.to_str().unwrap(),
        "50",
    ]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let svg = fs::read_to_string(&svgout).unwrap();
    assert!(svg.contains("LLC latency: cold vs hot"));
    assert!(svg.contains("LLC streaming throughput"));
    assert!(!csvin.with_extension("svg").exists());
    fs::remove_file(&csvin).unwrap();
    fs::remove_file(&svgout).unwrap();
}

#[test]
fn non_numeric_field_fails_without_chart() {
    let csvin = write_csv("bad", "sizeB,a,b,c\n1024,40,3,1000000\n2048,fast,3,1000000\n");
    let mut svgout = std::env::temp_dir();
    svgout.push(format!("llc_plot_bad_{}.svg", std::process::id()));
    let out = llc_plot(&[
        "-n",
        "-p",
        "-o",
        svgout.to_str().unwrap(),
        csvin.to_str().unwrap(),
        "50",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("read_cold"));
    // nothing printed, nothing plotted
    assert!(out.stdout.is_empty());
    assert!(!svgout.exists());
    fs::remove_file(&csvin).unwrap();
}

#[test]
fn non_numeric_clock_fails() {
    let csvin = write_csv("clock", "sizeB,a,b,c\n1024,40,3,1000000\n");
    let out = llc_plot(&["--no-show", csvin.to_str().unwrap(), "ghz"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ghz"));
    fs::remove_file(&csvin).unwrap();
}

#[test]
fn missing_file_fails() {
    let out = llc_plot(&["--no-show", "/nonexistent/llc_run.csv", "50"]);
    assert!(!out.status.success());
}
