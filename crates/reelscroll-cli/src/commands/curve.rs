use anyhow::{bail, Result};

use reelscroll_core::damp;

/// Most rows a single curve prints
const MAX_ROWS: f64 = 10_000.0;

/// Print `damp(raw)` for raw positions from 0 to `max`
pub fn run(max: f64, zone: f64, step: Option<f64>) -> Result<()> {
    let rows = samples(max, zone, step)?;

    println!("Damping curve (max {}, zone {}):\n", max, zone);
    println!("  {:>10}  {:>10}  {:>8}", "raw", "target", "ratio");
    for (raw, target) in rows {
        let ratio = if raw > 0.0 { target / raw } else { 1.0 };
        println!("  {:>10.2}  {:>10.2}  {:>8.3}", raw, target, ratio);
    }

    Ok(())
}

fn samples(max: f64, zone: f64, step: Option<f64>) -> Result<Vec<(f64, f64)>> {
    if !(max.is_finite() && max > 0.0) {
        bail!("--max must be a positive number");
    }
    let step = step.unwrap_or(max / 20.0);
    if !(step.is_finite() && step > 0.0) {
        bail!("--step must be a positive number");
    }

    let count = (max / step).floor();
    if count > MAX_ROWS {
        bail!(
            "--step {} would print {} rows, use a step of at least {}",
            step,
            count,
            max / MAX_ROWS
        );
    }
    let count = count as usize;
    let mut rows: Vec<(f64, f64)> = (0..=count)
        .map(|i| {
            let raw = i as f64 * step;
            (raw, damp(raw, max, zone))
        })
        .collect();
    if rows.last().map_or(true, |(raw, _)| *raw < max) {
        rows.push((max, damp(max, max, zone)));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_cover_both_ends() {
        let rows = samples(1000.0, 150.0, Some(300.0)).unwrap();
        let raws: Vec<f64> = rows.iter().map(|(raw, _)| *raw).collect();
        assert_eq!(raws, vec![0.0, 300.0, 600.0, 900.0, 1000.0]);
        assert_eq!(rows[0].1, 0.0);
        assert_eq!(rows[4].1, 1000.0);
        assert_eq!(rows[1].1, 300.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(samples(0.0, 150.0, None).is_err());
        assert!(samples(100.0, 150.0, Some(0.0)).is_err());
    }

    #[test]
    fn test_rejects_step_that_floods_output() {
        assert!(samples(1e9, 150.0, Some(1e-3)).is_err());
        assert!(samples(1e300, 150.0, None).is_ok());
        assert_eq!(samples(10_000.0, 150.0, Some(1.0)).unwrap().len(), 10_001);
    }
}
