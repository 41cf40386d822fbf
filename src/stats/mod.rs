// simrs 統計モジュール
//
// このモジュールは、シミュレーションデータの分析に必要な統計機能を
// 提供します。記述統計、仮説検定（t検定・分散分析）、パラメータ回復
// の検査が実装されています。

pub mod descriptive;
pub mod inference;
pub mod recovery;

use serde::{Deserialize, Serialize};

use crate::dataset::SimDataset;
use crate::design::DesignSpec;
use crate::error::Result;

pub use recovery::{CellRecovery, RecoveryReport, RecoveryTolerance};

/// 記述統計量の結果を保持する構造体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// データの件数
    pub count: usize,
    /// 平均値
    pub mean: f64,
    /// 標準偏差（不偏推定量）
    pub std: f64,
    /// 最小値
    pub min: f64,
    /// 25%分位点
    pub q1: f64,
    /// 中央値（50%分位点）
    pub median: f64,
    /// 75%分位点
    pub q3: f64,
    /// 最大値
    pub max: f64,
}

/// セルごと（グループ×条件）の要約統計量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSummary {
    pub group: Option<String>,
    pub condition: Option<String>,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

/// 検定の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tail {
    /// 両側検定
    TwoSided,
    /// 下側検定（対立仮説: 平均が小さい）
    Less,
    /// 上側検定（対立仮説: 平均が大きい）
    Greater,
}

/// t検定の設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestConfig {
    /// 検定の方向
    pub tail: Tail,
    /// 有意水準
    pub alpha: f64,
    /// 信頼区間の信頼水準
    pub conf_level: f64,
}

impl Default for TTestConfig {
    fn default() -> Self {
        TTestConfig {
            tail: Tail::TwoSided,
            alpha: 0.05,
            conf_level: 0.95,
        }
    }
}

/// t検定の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTestResult {
    /// t統計量
    pub statistic: f64,
    /// 自由度（Welch検定では非整数になる）
    pub df: f64,
    /// p値
    pub pvalue: f64,
    /// 有意水準で有意か
    pub significant: bool,
    /// 点推定値（1標本では平均、2標本では平均差）
    pub estimate: f64,
    /// 信頼区間の下限
    pub conf_low: f64,
    /// 信頼区間の上限
    pub conf_high: f64,
    /// 信頼水準
    pub conf_level: f64,
    /// 効果量（Cohenのd）
    pub cohen_d: f64,
}

/// 一元配置分散分析（ANOVA）の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnovaResult {
    /// F統計量
    pub f_statistic: f64,
    /// p値
    pub p_value: f64,
    /// グループ間平方和
    pub ss_between: f64,
    /// グループ内平方和
    pub ss_within: f64,
    /// 総平方和
    pub ss_total: f64,
    /// グループ間自由度
    pub df_between: usize,
    /// グループ内自由度
    pub df_within: usize,
    /// 総自由度
    pub df_total: usize,
    /// グループ間平均平方
    pub ms_between: f64,
    /// グループ内平均平方
    pub ms_within: f64,
    /// 効果量（η²）
    pub eta_squared: f64,
    /// 有意水準で有意か
    pub significant: bool,
}

/// データの基本統計量を計算
///
/// # 例
/// ```rust
/// use simrs::stats;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let stats = stats::describe(&data).unwrap();
/// assert_eq!(stats.count, 5);
/// assert!((stats.mean - 3.0).abs() < 1e-12);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> Result<DescriptiveStats> {
    descriptive::describe_impl(data.as_ref())
}

/// 2つの数値配列間のピアソン相関係数を計算
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    descriptive::correlation_impl(x.as_ref(), y.as_ref())
}

/// 2つの数値配列間の共分散（不偏推定量）を計算
pub fn covariance<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<f64> {
    descriptive::covariance_impl(x.as_ref(), y.as_ref())
}

/// セルごと（グループ×条件）の要約統計量を計算
pub fn cell_summary(data: &SimDataset) -> Result<Vec<CellSummary>> {
    descriptive::cell_summary_impl(data)
}

/// 1標本t検定を実行
///
/// 標本平均が指定した帰無仮説の平均と異なるかを検定します。
///
/// # 例
/// ```rust
/// use simrs::stats::{self, TTestConfig};
///
/// let sample = vec![2.1, 2.9, 3.4, 2.6, 3.1];
/// let result = stats::ttest_one_sample(&sample, 2.0, &TTestConfig::default()).unwrap();
/// assert!(result.pvalue > 0.0 && result.pvalue <= 1.0);
/// ```
pub fn ttest_one_sample<T: AsRef<[f64]>>(
    sample: T,
    mu: f64,
    config: &TTestConfig,
) -> Result<TTestResult> {
    inference::one_sample_ttest_impl(sample.as_ref(), mu, config)
}

/// 2標本（対応なし）t検定を実行
///
/// `equal_var` がtrueなら等分散を仮定したStudentのt検定、falseなら
/// Welchのt検定になります。
pub fn ttest_independent<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    sample1: T,
    sample2: U,
    equal_var: bool,
    config: &TTestConfig,
) -> Result<TTestResult> {
    inference::independent_ttest_impl(sample1.as_ref(), sample2.as_ref(), equal_var, config)
}

/// 対応ありt検定を実行
///
/// 同じ被験者の2条件の測定値の差を検定します。2つの標本は同じ長さで
/// 同じ被験者順に並んでいる必要があります。
pub fn ttest_paired<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    sample1: T,
    sample2: U,
    config: &TTestConfig,
) -> Result<TTestResult> {
    inference::paired_ttest_impl(sample1.as_ref(), sample2.as_ref(), config)
}

/// 一元配置分散分析（ANOVA）を実行
///
/// グループは宣言順のまま処理されるため、結果は入力順序に対して
/// 決定的です。
pub fn anova(groups: &[(String, Vec<f64>)], alpha: f64) -> Result<AnovaResult> {
    inference::anova_impl(groups, alpha)
}

/// 生成データのパラメータ回復を検査
///
/// デザイン仕様のセルごとに経験的な平均・標準偏差を計算し、設定値
/// との差が許容誤差内かを判定します。
pub fn check_recovery(
    spec: &DesignSpec,
    data: &SimDataset,
    tolerance: &RecoveryTolerance,
) -> Result<RecoveryReport> {
    recovery::check_recovery_impl(spec, data, tolerance)
}
