//! Plottersを使用した可視化機能の実装
//!
//! セル（グループ×条件）ごとに分布の形（バイオリン）、四分位の箱、
//! 個々の観測値（ジッター付き散布）を重ねて描画します。

use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use crate::dataset::SimDataset;
use crate::error::{Error, Result};
use crate::stats::descriptive::quantile_sorted;

/// プロットの出力形式
#[derive(Debug, Clone, Copy)]
pub enum OutputType {
    /// PNG画像
    PNG,
    /// SVG形式
    SVG,
}

/// プロットの設定
#[derive(Debug, Clone)]
pub struct PlotSettings {
    /// タイトル
    pub title: String,
    /// X軸のラベル
    pub x_label: String,
    /// Y軸のラベル
    pub y_label: String,
    /// グラフの幅（ピクセル）
    pub width: u32,
    /// グラフの高さ（ピクセル）
    pub height: u32,
    /// 出力形式
    pub output_type: OutputType,
    /// グリッドの表示
    pub show_grid: bool,
    /// ジッター用乱数のシード（出力画像を決定的にするため専用）
    pub jitter_seed: u64,
    /// 色のパレット
    pub color_palette: Vec<(u8, u8, u8)>,
}

impl Default for PlotSettings {
    fn default() -> Self {
        PlotSettings {
            title: "Simulated data".to_string(),
            x_label: "cell".to_string(),
            y_label: "value".to_string(),
            // 300DPIで8×8インチ相当
            width: 2400,
            height: 2400,
            output_type: OutputType::PNG,
            show_grid: true,
            jitter_seed: 42,
            color_palette: vec![
                (0, 123, 255),  // 青
                (255, 99, 71),  // 赤
                (46, 204, 113), // 緑
                (255, 193, 7),  // 黄
                (142, 68, 173), // 紫
                (52, 152, 219), // 水色
                (243, 156, 18), // オレンジ
                (211, 84, 0),   // 茶色
            ],
        }
    }
}

/// データセットをセルごとの分布図として出力
///
/// # 例
///
/// ```no_run
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use simrs::design::DesignSpec;
/// use simrs::sim::{sim_design, SimOptions};
/// use simrs::vis::{plot_cells, PlotSettings};
///
/// let spec = DesignSpec::one_sample(50, 2.0, 1.0);
/// let mut rng = StdRng::seed_from_u64(17);
/// let data = sim_design(&spec, &SimOptions::default(), &mut rng).unwrap();
/// plot_cells(&data, "one_sample.png", &PlotSettings::default()).unwrap();
/// ```
pub fn plot_cells<P: AsRef<Path>>(
    data: &SimDataset,
    path: P,
    settings: &PlotSettings,
) -> Result<()> {
    let cells = collect_cells(data)?;

    match settings.output_type {
        OutputType::PNG => {
            let root = BitMapBackend::new(path.as_ref(), (settings.width, settings.height))
                .into_drawing_area();
            render_cells(&root, &cells, settings)?;
            root.present()?;
        }
        OutputType::SVG => {
            let root = SVGBackend::new(path.as_ref(), (settings.width, settings.height))
                .into_drawing_area();
            render_cells(&root, &cells, settings)?;
            root.present()?;
        }
    }

    Ok(())
}

/// セル（グループ×条件）ごとに値を集める
fn collect_cells(data: &SimDataset) -> Result<Vec<(String, Vec<f64>)>> {
    if data.is_empty() {
        return Err(Error::EmptyData("プロットするデータがありません".into()));
    }

    let groups: Vec<Option<String>> = if data.has_group() {
        data.group_levels().into_iter().map(Some).collect()
    } else {
        vec![None]
    };
    let conditions: Vec<Option<String>> = if data.has_condition() {
        data.condition_levels().into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    let mut cells = Vec::new();
    for group in &groups {
        for condition in &conditions {
            let values = data.cell_values(group.as_deref(), condition.as_deref());
            if values.is_empty() {
                continue;
            }
            let label = match (group, condition) {
                (Some(g), Some(c)) => format!("{}:{}", g, c),
                (Some(g), None) => g.clone(),
                (None, Some(c)) => c.clone(),
                (None, None) => "all".to_string(),
            };
            cells.push((label, values));
        }
    }

    Ok(cells)
}

fn render_cells<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    cells: &[(String, Vec<f64>)],
    settings: &PlotSettings,
) -> Result<()>
where
    DB::ErrorType: std::error::Error + Send + Sync + 'static,
{
    root.fill(&WHITE)?;

    // 全セルを通したY軸の範囲（5%の余白を付ける）
    let mut y_lo = f64::INFINITY;
    let mut y_hi = f64::NEG_INFINITY;
    for (_, values) in cells {
        for &v in values {
            y_lo = y_lo.min(v);
            y_hi = y_hi.max(v);
        }
    }
    let pad = if y_hi > y_lo { (y_hi - y_lo) * 0.05 } else { 1.0 };
    let y_lo = y_lo - pad;
    let y_hi = y_hi + pad;

    let labels: Vec<&str> = cells.iter().map(|(l, _)| l.as_str()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&settings.title, ("sans-serif", 40).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..cells.len() as f64, y_lo..y_hi)?;

    if settings.show_grid {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(cells.len())
            .x_label_formatter(&|v| {
                let i = (v.floor() as usize).min(labels.len() - 1);
                labels[i].to_string()
            })
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc(&settings.x_label)
            .y_desc(&settings.y_label)
            .draw()?;
    }

    let mut jitter_rng = StdRng::seed_from_u64(settings.jitter_seed);

    for (i, (_, values)) in cells.iter().enumerate() {
        let rgb = settings.color_palette[i % settings.color_palette.len()];
        let color = RGBColor(rgb.0, rgb.1, rgb.2);
        let cx = i as f64 + 0.5;

        // バイオリン（カーネル密度の輪郭）
        if let Some(curve) = kde_curve(values, y_lo, y_hi, 64) {
            let max_d = curve.iter().map(|&(_, d)| d).fold(f64::MIN, f64::max);
            if max_d > 0.0 {
                let mut poly: Vec<(f64, f64)> = curve
                    .iter()
                    .map(|&(y, d)| (cx + d / max_d * 0.38, y))
                    .collect();
                poly.extend(curve.iter().rev().map(|&(y, d)| (cx - d / max_d * 0.38, y)));
                chart.draw_series(std::iter::once(Polygon::new(
                    poly,
                    color.mix(0.25).filled(),
                )))?;
            }
        }

        // 箱ひげ（四分位と1.5×IQRのひげ）
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let whisker_lo = sorted
            .iter()
            .cloned()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_hi = sorted
            .iter()
            .rev()
            .cloned()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(cx - 0.12, q1), (cx + 0.12, q3)],
            color.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(cx - 0.12, median), (cx + 0.12, median)],
            color.stroke_width(3),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(cx, whisker_lo), (cx, q1)],
            color.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(cx, q3), (cx, whisker_hi)],
            color.stroke_width(2),
        )))?;

        // 個々の観測値（ジッター付き）
        let points: Vec<Circle<(f64, f64), i32>> = values
            .iter()
            .map(|&v| {
                let x = cx + jitter_rng.gen_range(-0.28..0.28);
                Circle::new((x, v), 5, color.mix(0.8).filled())
            })
            .collect();
        chart.draw_series(points)?;
    }

    Ok(())
}

/// ガウスカーネル密度推定（Silvermanのバンド幅）
fn kde_curve(values: &[f64], y_lo: f64, y_hi: f64, points: usize) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean = values.iter().sum::<f64>() / n as f64;
    let sd = (values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();
    let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);

    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };
    if spread <= 0.0 {
        return None;
    }
    let h = 0.9 * spread * (n as f64).powf(-0.2);

    Some(
        (0..=points)
            .map(|k| {
                let y = y_lo + (y_hi - y_lo) * k as f64 / points as f64;
                let d = values
                    .iter()
                    .map(|&x| {
                        let u = (y - x) / h;
                        (-0.5 * u * u).exp()
                    })
                    .sum::<f64>()
                    / (n as f64 * h);
                (y, d)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Observation;

    #[test]
    fn test_collect_cells_order() {
        let mut data = SimDataset::new(true, true);
        for (id, g, c, v) in [
            ("s01", "a", "pre", 1.0),
            ("s01", "a", "post", 2.0),
            ("s02", "b", "pre", 3.0),
            ("s02", "b", "post", 4.0),
        ] {
            data.push_row(Observation {
                id: id.to_string(),
                group: Some(g.to_string()),
                condition: Some(c.to_string()),
                value: v,
            })
            .unwrap();
        }

        let cells = collect_cells(&data).unwrap();
        let labels: Vec<&str> = cells.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["a:pre", "a:post", "b:pre", "b:post"]);
    }

    #[test]
    fn test_kde_curve_mass() {
        let values = vec![1.0, 2.0, 2.5, 3.0, 4.0, 2.2, 1.8];
        let curve = kde_curve(&values, -2.0, 7.0, 128).unwrap();

        // 台形則で密度の総和がおよそ1になる
        let step = 9.0 / 128.0;
        let mass: f64 = curve.windows(2).map(|w| (w[0].1 + w[1].1) * 0.5 * step).sum();
        assert!((mass - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_kde_constant_data_skipped() {
        let values = vec![2.0, 2.0, 2.0];
        assert!(kde_curve(&values, 0.0, 4.0, 32).is_none());
    }
}
