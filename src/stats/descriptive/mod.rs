// 記述統計モジュール

use crate::dataset::SimDataset;
use crate::error::{Error, Result};
use crate::stats::{CellSummary, DescriptiveStats};

/// 記述統計量を計算する内部実装
pub(crate) fn describe_impl(data: &[f64]) -> Result<DescriptiveStats> {
    if data.is_empty() {
        return Err(Error::EmptyData(
            "記述統計量の計算には少なくとも1つのデータが必要です".into(),
        ));
    }

    let count = data.len();

    // 平均値の計算
    let mean = data.iter().sum::<f64>() / count as f64;

    // 標準偏差の計算（不偏推定量）
    let variance = if count > 1 {
        data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
    } else {
        0.0
    };
    let std = variance.sqrt();

    // データをソートして分位数を計算
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Ok(DescriptiveStats {
        count,
        mean,
        std,
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// ソート済みデータの分位数（線形補間）
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// ピアソン相関係数を計算する内部実装
pub(crate) fn correlation_impl(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(Error::InsufficientData(
            "相関係数の計算には少なくとも2つのデータが必要です".into(),
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(Error::ComputationError(
            "分散が0のため相関係数を計算できません".into(),
        ));
    }

    Ok(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// 共分散（不偏推定量）を計算する内部実装
pub(crate) fn covariance_impl(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(Error::InsufficientData(
            "共分散の計算には少なくとも2つのデータが必要です".into(),
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let cov = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .sum::<f64>();

    Ok(cov / (n - 1.0))
}

/// セルごと（グループ×条件）の要約統計量を計算する内部実装
pub(crate) fn cell_summary_impl(data: &SimDataset) -> Result<Vec<CellSummary>> {
    if data.is_empty() {
        return Err(Error::EmptyData("要約するデータがありません".into()));
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

    let mut out = Vec::with_capacity(groups.len() * conditions.len());
    for group in &groups {
        for condition in &conditions {
            let values = data.cell_values(group.as_deref(), condition.as_deref());
            if values.is_empty() {
                continue;
            }
            let stats = describe_impl(&values)?;
            out.push(CellSummary {
                group: group.clone(),
                condition: condition.clone(),
                count: stats.count,
                mean: stats.mean,
                std: stats.std,
            });
        }
    }

    Ok(out)
}
