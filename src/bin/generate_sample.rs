//! Writes a synthetic TMA export (8 × 12 cores) for trying the charts by hand.
//!
//! Usage: `generate_sample [OUTPUT]` (default `data/sampleData.csv`).
//! Columns are `Core`, `Sample` (tissue group) and one measurement,
//! `Positive Area Percentage`, so every chart runs with its defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROWS: &str = "ABCDEFGH";
const COLS: u32 = 12;

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Write the slide as CSV to `out`; returns the number of cores written.
fn write_sample<W: std::io::Write>(out: W, seed: u64) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Core", "Sample", "Positive Area Percentage"])?;

    let mut cores = 0;
    for (r, row) in ROWS.chars().enumerate() {
        // Upper half of the slide is tumour tissue.
        let (group, mean) = if r < 4 { ("Tumor", 35.0) } else { ("Normal", 12.0) };
        for col in 1..=COLS {
            let area = gauss(&mut rng, mean, 8.0).clamp(0.0, 100.0);
            // A few lost cores, as on a real slide.
            let value = if rng.gen_bool(0.05) { String::new() } else { format!("{area:.2}") };
            writer.write_record([format!("{row}{col}"), group.to_string(), value])?;
            cores += 1;
        }
    }
    writer.flush()?;
    Ok(cores)
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/sampleData.csv"));
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let file = std::fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    let cores = write_sample(file, 42)?;

    log::info!("Wrote {cores} cores to {}", output.display());
    println!("Wrote {cores} cores to {}", output.display());
    Ok(())
}
