// 実験デザイン仕様モジュール
//
// シミュレーションの対象となる実験デザイン（被験者間・被験者内要因、
// セルごとの目標モーメント、条件間相関）を宣言的に記述します。

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 実験要因: 名前と順序付きの水準ラベル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    /// 要因名（例: "group", "condition"）
    pub name: String,
    /// 水準ラベル（宣言順を保持）
    pub levels: Vec<String>,
}

impl Factor {
    pub fn new(name: &str, levels: &[&str]) -> Self {
        Factor {
            name: name.to_string(),
            levels: levels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 1つのデザインセルの目標モーメント
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    /// 目標平均
    pub mean: f64,
    /// 目標標準偏差
    pub sd: f64,
}

impl CellSpec {
    pub fn new(mean: f64, sd: f64) -> Self {
        CellSpec { mean, sd }
    }
}

/// 1グループ分の設定
///
/// 被験者内条件がC個ある場合、`cells`は条件の宣言順にC件、
/// `correlations`は条件ペアの上三角（行優先）でC·(C−1)/2件を持ちます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// グループのサンプルサイズ（被験者数）
    pub n: usize,
    /// 条件ごとの目標モーメント
    pub cells: Vec<CellSpec>,
    /// 被験者内条件間の相関係数（上三角・行優先）
    pub correlations: Vec<f64>,
}

impl GroupSpec {
    pub fn new(n: usize, cells: Vec<CellSpec>, correlations: Vec<f64>) -> Self {
        GroupSpec {
            n,
            cells,
            correlations,
        }
    }
}

/// デザイン内の1セルへの参照（グループ×条件）
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    /// 被験者間グループのラベル（被験者間要因が無い場合はNone）
    pub group: Option<&'a str>,
    /// 被験者内条件のラベル（被験者内要因が無い場合はNone）
    pub condition: Option<&'a str>,
    /// セルのサンプルサイズ
    pub n: usize,
    /// 目標モーメント
    pub spec: CellSpec,
}

/// 実験デザイン仕様
///
/// # 例
/// ```rust
/// use simrs::design::DesignSpec;
///
/// // 1標本デザイン: n=50, 平均2, 標準偏差1
/// let spec = DesignSpec::one_sample(50, 2.0, 1.0);
/// assert!(spec.validate().is_ok());
/// assert_eq!(spec.total_rows(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// 被験者間要因（任意）
    pub between: Option<Factor>,
    /// 被験者内要因（任意）
    pub within: Option<Factor>,
    /// グループごとの設定（被験者間要因が無い場合は1件）
    pub groups: Vec<GroupSpec>,
    /// 被験者IDの接頭辞
    pub id_prefix: String,
}

impl DesignSpec {
    /// 任意の構成でデザイン仕様を作成
    pub fn new(between: Option<Factor>, within: Option<Factor>, groups: Vec<GroupSpec>) -> Self {
        DesignSpec {
            between,
            within,
            groups,
            id_prefix: "s".to_string(),
        }
    }

    /// 1標本デザイン
    pub fn one_sample(n: usize, mean: f64, sd: f64) -> Self {
        DesignSpec::new(
            None,
            None,
            vec![GroupSpec::new(n, vec![CellSpec::new(mean, sd)], vec![])],
        )
    }

    /// 被験者間デザイン: (ラベル, n, 平均, 標準偏差) のリスト
    pub fn between(factor_name: &str, groups: &[(&str, usize, f64, f64)]) -> Self {
        let labels: Vec<&str> = groups.iter().map(|g| g.0).collect();
        let specs = groups
            .iter()
            .map(|&(_, n, mean, sd)| GroupSpec::new(n, vec![CellSpec::new(mean, sd)], vec![]))
            .collect();
        DesignSpec::new(Some(Factor::new(factor_name, &labels)), None, specs)
    }

    /// 被験者内デザイン: 全員がすべての条件で測定される
    ///
    /// `conditions`は (ラベル, 平均, 標準偏差)、`correlations`は
    /// 条件ペアの上三角（行優先）でC·(C−1)/2件。
    pub fn within(
        factor_name: &str,
        n: usize,
        conditions: &[(&str, f64, f64)],
        correlations: &[f64],
    ) -> Self {
        let labels: Vec<&str> = conditions.iter().map(|c| c.0).collect();
        let cells = conditions
            .iter()
            .map(|&(_, mean, sd)| CellSpec::new(mean, sd))
            .collect();
        DesignSpec::new(
            None,
            Some(Factor::new(factor_name, &labels)),
            vec![GroupSpec::new(n, cells, correlations.to_vec())],
        )
    }

    /// 混合デザイン: 被験者間×被験者内
    pub fn mixed(between: Factor, within: Factor, groups: Vec<GroupSpec>) -> Self {
        DesignSpec::new(Some(between), Some(within), groups)
    }

    /// 被験者IDの接頭辞を変更
    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    /// 被験者内条件の数（被験者内要因が無い場合は1）
    pub fn n_conditions(&self) -> usize {
        self.within.as_ref().map_or(1, |f| f.levels.len())
    }

    /// グループ数
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// グループのラベル（被験者間要因が無い場合はNone）
    pub fn group_label(&self, index: usize) -> Option<&str> {
        self.between
            .as_ref()
            .and_then(|f| f.levels.get(index))
            .map(|s| s.as_str())
    }

    /// 条件のラベル（被験者内要因が無い場合はNone）
    pub fn condition_label(&self, index: usize) -> Option<&str> {
        self.within
            .as_ref()
            .and_then(|f| f.levels.get(index))
            .map(|s| s.as_str())
    }

    /// 全被験者数
    pub fn total_subjects(&self) -> usize {
        self.groups.iter().map(|g| g.n).sum()
    }

    /// 生成されるデータセットの行数: Σg (n_g × C)
    pub fn total_rows(&self) -> usize {
        self.total_subjects() * self.n_conditions()
    }

    /// デザインセルを宣言順（グループ→条件）に列挙
    pub fn cells(&self) -> Vec<CellRef<'_>> {
        let c = self.n_conditions();
        let mut out = Vec::with_capacity(self.groups.len() * c);
        for (g, group) in self.groups.iter().enumerate() {
            for j in 0..c {
                out.push(CellRef {
                    group: self.group_label(g),
                    condition: self.condition_label(j),
                    n: group.n,
                    spec: group.cells[j],
                });
            }
        }
        out
    }

    /// デザイン仕様の妥当性を検証
    ///
    /// データ生成の前に必ず呼ばれ、不正な構成は生成器の不透明な失敗
    /// ではなく記述的な設定エラーとして報告されます。
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(Error::InvalidDesign(
                "グループが定義されていません".into(),
            ));
        }

        if let Some(factor) = &self.between {
            validate_factor(factor)?;
            if factor.levels.len() != self.groups.len() {
                return Err(Error::InvalidDesign(format!(
                    "被験者間要因の水準数 {} とグループ数 {} が一致しません",
                    factor.levels.len(),
                    self.groups.len()
                )));
            }
        } else if self.groups.len() != 1 {
            return Err(Error::InvalidDesign(format!(
                "被験者間要因が無い場合、グループは1件である必要があります: 実際 {}",
                self.groups.len()
            )));
        }

        if let Some(factor) = &self.within {
            validate_factor(factor)?;
        }

        let c = self.n_conditions();
        let n_corr = c * (c - 1) / 2;

        for (g, group) in self.groups.iter().enumerate() {
            let label = self
                .group_label(g)
                .map_or_else(|| format!("グループ {}", g), |s| s.to_string());

            if group.n == 0 {
                return Err(Error::InvalidDesign(format!(
                    "サンプルサイズは正の整数である必要があります ({})",
                    label
                )));
            }

            if group.cells.len() != c {
                return Err(Error::InvalidDesign(format!(
                    "セル数が一致しません: 期待値 {}, 実際 {} ({})",
                    c,
                    group.cells.len(),
                    label
                )));
            }

            for (j, cell) in group.cells.iter().enumerate() {
                if !cell.mean.is_finite() {
                    return Err(Error::InvalidDesign(format!(
                        "平均は有限値である必要があります (セル {}, {})",
                        j, label
                    )));
                }
                if !cell.sd.is_finite() || cell.sd <= 0.0 {
                    return Err(Error::InvalidDesign(format!(
                        "標準偏差は正の有限値である必要があります (セル {}, {})",
                        j, label
                    )));
                }
            }

            if group.correlations.len() != n_corr {
                return Err(Error::InvalidDesign(format!(
                    "相関係数の個数が一致しません: 期待値 {}, 実際 {} ({})",
                    n_corr,
                    group.correlations.len(),
                    label
                )));
            }

            for &r in &group.correlations {
                if !r.is_finite() || !(-1.0..=1.0).contains(&r) {
                    return Err(Error::InvalidDesign(format!(
                        "相関係数は-1から1の範囲である必要があります: 実際 {} ({})",
                        r, label
                    )));
                }
            }
        }

        Ok(())
    }

    /// JSON文字列からデザイン仕様を読み込む
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: DesignSpec = serde_json::from_str(json)?;
        Ok(spec)
    }

    /// デザイン仕様をJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn validate_factor(factor: &Factor) -> Result<()> {
    if factor.levels.is_empty() {
        return Err(Error::InvalidDesign(format!(
            "要因 '{}' に水準がありません",
            factor.name
        )));
    }
    for (i, level) in factor.levels.iter().enumerate() {
        if level.is_empty() {
            return Err(Error::InvalidDesign(format!(
                "要因 '{}' の水準 {} が空文字列です",
                factor.name, i
            )));
        }
        if factor.levels[..i].contains(level) {
            return Err(Error::InvalidDesign(format!(
                "要因 '{}' の水準ラベルが重複しています: {}",
                factor.name, level
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_sample_shape() {
        let spec = DesignSpec::one_sample(50, 2.0, 1.0);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.n_conditions(), 1);
        assert_eq!(spec.total_rows(), 50);
        assert_eq!(spec.cells().len(), 1);
    }

    #[test]
    fn test_between_shape() {
        let spec = DesignSpec::between(
            "group",
            &[("placebo", 50, 100.0, 15.0), ("drug", 40, 105.0, 15.0)],
        );
        assert!(spec.validate().is_ok());
        assert_eq!(spec.total_subjects(), 90);
        assert_eq!(spec.total_rows(), 90);
        assert_eq!(spec.group_label(1), Some("drug"));
    }

    #[test]
    fn test_within_correlation_count() {
        // 3条件 → 相関は3件必要
        let spec = DesignSpec::within(
            "time",
            20,
            &[("pre", 10.0, 2.0), ("post", 12.0, 2.0), ("followup", 11.0, 2.0)],
            &[0.5, 0.4, 0.6],
        );
        assert!(spec.validate().is_ok());
        assert_eq!(spec.total_rows(), 60);

        // 件数不足は設定エラー
        let bad = DesignSpec::within(
            "time",
            20,
            &[("pre", 10.0, 2.0), ("post", 12.0, 2.0), ("followup", 11.0, 2.0)],
            &[0.5, 0.4],
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_zero_sample_size_rejected() {
        let spec = DesignSpec::one_sample(0, 2.0, 1.0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_invalid_moments_rejected() {
        let spec = DesignSpec::one_sample(10, 2.0, 0.0);
        assert!(spec.validate().is_err());

        let spec = DesignSpec::one_sample(10, f64::NAN, 1.0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_correlation_range() {
        let spec = DesignSpec::within("cond", 10, &[("a", 0.0, 1.0), ("b", 0.0, 1.0)], &[1.5]);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let spec = DesignSpec::between("group", &[("a", 10, 0.0, 1.0), ("a", 10, 0.0, 1.0)]);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let spec = DesignSpec::between(
            "group",
            &[("placebo", 50, 100.0, 15.0), ("drug", 40, 105.0, 15.0)],
        );
        let json = spec.to_json_string().unwrap();
        let restored = DesignSpec::from_json_str(&json).unwrap();
        assert_eq!(spec, restored);
    }
}
