//! Text-based quick-look rendering
//!
//! Dependency-free histogram output for terminal environments. Useful for
//! eyeballing a simulated cell before exporting a full plot.

use crate::error::{Error, Result};

/// Render a horizontal-bar histogram of `values` as a string.
pub fn render_histogram(values: &[f64], bins: usize, width: usize) -> Result<String> {
    if values.is_empty() {
        return Err(Error::EmptyData("ヒストグラムにはデータが必要です".into()));
    }
    if bins == 0 {
        return Err(Error::InvalidValue(
            "ビン数は1以上である必要があります".into(),
        ));
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // all values identical: single degenerate bin
    if (max - min).abs() < f64::EPSILON {
        return Ok(format!(
            "[{:>10.3}, {:>10.3}] | {} ({})\n",
            min,
            max,
            "█".repeat(width),
            values.len()
        ));
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = (((value - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let max_count = *counts.iter().max().unwrap_or(&1);
    let mut out = String::new();
    for (i, &count) in counts.iter().enumerate() {
        let bar_len = if max_count > 0 {
            (count as f64 / max_count as f64 * width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "[{:>10.3}, {:>10.3}] | {:<bar_width$} ({})\n",
            min + i as f64 * bin_width,
            min + (i + 1) as f64 * bin_width,
            "█".repeat(bar_len),
            count,
            bar_width = width
        ));
    }

    Ok(out)
}
