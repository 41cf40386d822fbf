// パラメータ回復の確認モジュール
//
// 生成されたデータセットの経験的な平均・標準偏差を設定値と突き合わせ、
// 明示的な許容誤差で判定します。目視による確認ではなく、閾値を持つ
// 検査として実装されています。

use serde::{Deserialize, Serialize};

use crate::dataset::SimDataset;
use crate::design::DesignSpec;
use crate::error::{Error, Result};
use crate::stats::descriptive;

/// 回復判定の許容誤差
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RecoveryTolerance {
    /// 確率的一致: |m̂−μ| ≤ k·σ/√n かつ |ŝ−σ| ≤ k·σ/√(2n)
    Stochastic { k: f64 },
    /// 経験的（厳密）一致: 絶対誤差の上限
    Exact { abs: f64 },
}

impl RecoveryTolerance {
    /// 確率的生成の既定値（k=4: セルあたりの誤判定率はおよそ1e-4）
    pub fn stochastic() -> Self {
        RecoveryTolerance::Stochastic { k: 4.0 }
    }

    /// 経験的一致の既定値（浮動小数点誤差のみ許容）
    pub fn exact() -> Self {
        RecoveryTolerance::Exact { abs: 1e-6 }
    }

    /// (平均の許容誤差, 標準偏差の許容誤差)
    fn bounds(&self, sd: f64, n: usize) -> (f64, f64) {
        match *self {
            RecoveryTolerance::Stochastic { k } => {
                let n_f = n as f64;
                (k * sd / n_f.sqrt(), k * sd / (2.0 * n_f).sqrt())
            }
            RecoveryTolerance::Exact { abs } => (abs, abs),
        }
    }
}

/// 1セル分の回復結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellRecovery {
    pub group: Option<String>,
    pub condition: Option<String>,
    pub n: usize,
    pub expected_mean: f64,
    pub observed_mean: f64,
    pub expected_sd: f64,
    pub observed_sd: f64,
    pub mean_within: bool,
    pub sd_within: bool,
}

/// 全セルの回復結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub cells: Vec<CellRecovery>,
}

impl RecoveryReport {
    /// すべてのセルが許容誤差内か
    pub fn all_within_tolerance(&self) -> bool {
        self.cells.iter().all(|c| c.mean_within && c.sd_within)
    }

    /// 設定値と観測値を並べたテキスト表を描画
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<12} {:<12} {:>5} {:>12} {:>12} {:>10} {:>10}  {}\n",
            "グループ", "条件", "n", "平均(設定)", "平均(観測)", "SD(設定)", "SD(観測)", "判定"
        ));
        for cell in &self.cells {
            out.push_str(&format!(
                "{:<12} {:<12} {:>5} {:>12.4} {:>12.4} {:>10.4} {:>10.4}  {}\n",
                cell.group.as_deref().unwrap_or("-"),
                cell.condition.as_deref().unwrap_or("-"),
                cell.n,
                cell.expected_mean,
                cell.observed_mean,
                cell.expected_sd,
                cell.observed_sd,
                if cell.mean_within && cell.sd_within {
                    "OK"
                } else {
                    "NG"
                }
            ));
        }
        out
    }
}

/// パラメータ回復の検査を実行する内部実装
pub(crate) fn check_recovery_impl(
    spec: &DesignSpec,
    data: &SimDataset,
    tolerance: &RecoveryTolerance,
) -> Result<RecoveryReport> {
    let mut cells = Vec::new();

    for cell in spec.cells() {
        let values = data.cell_values(cell.group, cell.condition);
        if values.len() != cell.n {
            return Err(Error::DimensionMismatch(format!(
                "セル ({}, {}) の行数が仕様と一致しません: 期待値 {}, 実際 {}",
                cell.group.unwrap_or("-"),
                cell.condition.unwrap_or("-"),
                cell.n,
                values.len()
            )));
        }
        if values.len() < 2 {
            return Err(Error::InsufficientData(
                "回復の検査には各セルに少なくとも2つのデータが必要です".into(),
            ));
        }

        let stats = descriptive::describe_impl(&values)?;
        let (mean_tol, sd_tol) = tolerance.bounds(cell.spec.sd, cell.n);

        cells.push(CellRecovery {
            group: cell.group.map(|s| s.to_string()),
            condition: cell.condition.map(|s| s.to_string()),
            n: cell.n,
            expected_mean: cell.spec.mean,
            observed_mean: stats.mean,
            expected_sd: cell.spec.sd,
            observed_sd: stats.std,
            mean_within: (stats.mean - cell.spec.mean).abs() <= mean_tol,
            sd_within: (stats.std - cell.spec.sd).abs() <= sd_tol,
        });
    }

    Ok(RecoveryReport { cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Observation;

    fn dataset_from(values: &[f64]) -> SimDataset {
        let mut data = SimDataset::new(false, false);
        for (i, &v) in values.iter().enumerate() {
            data.push_row(Observation {
                id: format!("s{:02}", i + 1),
                group: None,
                condition: None,
                value: v,
            })
            .unwrap();
        }
        data
    }

    #[test]
    fn test_exact_tolerance_pass() {
        // 平均3, 不偏SD √2.5 のデータに同じ設定 → 厳密一致
        let data = dataset_from(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let spec = DesignSpec::one_sample(5, 3.0, 2.5_f64.sqrt());
        let report =
            check_recovery_impl(&spec, &data, &RecoveryTolerance::exact()).unwrap();
        assert!(report.all_within_tolerance());
    }

    #[test]
    fn test_exact_tolerance_fail() {
        let data = dataset_from(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let spec = DesignSpec::one_sample(5, 3.5, 2.5_f64.sqrt());
        let report =
            check_recovery_impl(&spec, &data, &RecoveryTolerance::exact()).unwrap();
        assert!(!report.all_within_tolerance());
        assert!(!report.cells[0].mean_within);
        assert!(report.cells[0].sd_within);
    }

    #[test]
    fn test_row_count_mismatch_detected() {
        let data = dataset_from(&[1.0, 2.0, 3.0]);
        let spec = DesignSpec::one_sample(5, 2.0, 1.0);
        assert!(check_recovery_impl(&spec, &data, &RecoveryTolerance::exact()).is_err());
    }

    #[test]
    fn test_render_contains_cells() {
        let data = dataset_from(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let spec = DesignSpec::one_sample(5, 3.0, 2.5_f64.sqrt());
        let report =
            check_recovery_impl(&spec, &data, &RecoveryTolerance::exact()).unwrap();
        let table = report.render();
        assert!(table.contains("OK"));
        assert!(table.contains("3.0000"));
    }
}
