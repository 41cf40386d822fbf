// レポート生成モジュール
//
// 生成 → 要約 → 回復検査 → 検定 → 出力の5段階を1つのパイプラインに
// 集約します。各シナリオ（1標本、被験者間、被験者内、混合、既存データ
// からの再生成）は設定だけが異なる同じ流れとして実行されます。

use log::{debug, info, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::dataset::SimDataset;
use crate::design::DesignSpec;
use crate::error::{Error, Result};
use crate::io;
use crate::sim::{sim_design, SimOptions};
use crate::stats::{
    self, AnovaResult, CellSummary, RecoveryReport, RecoveryTolerance, TTestConfig, TTestResult,
};

/// シナリオで実行する検定の種類
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TestPlan {
    /// 1標本t検定（帰無仮説の平均を指定）
    OneSampleT { mu: f64 },
    /// 2標本（対応なし）t検定
    IndependentT { equal_var: bool },
    /// 対応ありt検定（最初の2条件を使用）
    PairedT,
    /// 一元配置分散分析（各セルを1グループとして扱う）
    OneWayAnova,
}

/// シナリオの設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// シナリオ名（レポートの見出しに使われる）
    pub name: String,
    /// デザイン仕様
    pub design: DesignSpec,
    /// 生成オプション
    pub options: SimOptions,
    /// 実行する検定
    pub test: TestPlan,
    /// 検定の設定
    pub test_config: TTestConfig,
    /// パラメータ回復の許容誤差
    pub tolerance: RecoveryTolerance,
    /// データセットのCSV出力先（任意）
    pub csv_path: Option<PathBuf>,
    /// プロットの出力先（任意、visualizationフィーチャが必要）
    pub plot_path: Option<PathBuf>,
}

impl ScenarioConfig {
    pub fn new(name: &str, design: DesignSpec, test: TestPlan) -> Self {
        ScenarioConfig {
            name: name.to_string(),
            design,
            options: SimOptions::default(),
            test,
            test_config: TTestConfig::default(),
            tolerance: RecoveryTolerance::stochastic(),
            csv_path: None,
            plot_path: None,
        }
    }

    pub fn with_options(mut self, options: SimOptions) -> Self {
        // 経験的一致なら回復検査も厳密判定に切り替える
        if options.empirical {
            self.tolerance = RecoveryTolerance::exact();
        }
        self.options = options;
        self
    }

    pub fn with_test_config(mut self, test_config: TTestConfig) -> Self {
        self.test_config = test_config;
        self
    }

    pub fn with_tolerance(mut self, tolerance: RecoveryTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_csv_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    pub fn with_plot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.plot_path = Some(path.into());
        self
    }
}

/// 実行された検定の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TestOutcome {
    TTest(TTestResult),
    Anova(AnovaResult),
}

/// シナリオの実行結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub dataset: SimDataset,
    pub summaries: Vec<CellSummary>,
    pub recovery: RecoveryReport,
    pub outcome: TestOutcome,
    pub csv_path: Option<PathBuf>,
    pub plot_path: Option<PathBuf>,
}

impl ScenarioReport {
    /// 検定結果を1行の文として要約
    pub fn conclusion(&self) -> String {
        match &self.outcome {
            TestOutcome::TTest(t) => format!(
                "t({:.1}) = {:.3}, p = {:.4}, d = {:.3}, {:.0}%CI [{:.3}, {:.3}]: {}",
                t.df,
                t.statistic,
                t.pvalue,
                t.cohen_d,
                t.conf_level * 100.0,
                t.conf_low,
                t.conf_high,
                if t.significant { "有意" } else { "有意でない" }
            ),
            TestOutcome::Anova(a) => format!(
                "F({}, {}) = {:.3}, p = {:.4}, η² = {:.3}: {}",
                a.df_between,
                a.df_within,
                a.f_statistic,
                a.p_value,
                a.eta_squared,
                if a.significant { "有意" } else { "有意でない" }
            ),
        }
    }

    /// 人が読むテキストレポートを描画
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== {} ===\n\n", self.name));

        out.push_str("セルごとの要約:\n");
        out.push_str(&format!(
            "{:<12} {:<12} {:>5} {:>12} {:>10}\n",
            "グループ", "条件", "n", "平均", "SD"
        ));
        for s in &self.summaries {
            out.push_str(&format!(
                "{:<12} {:<12} {:>5} {:>12.4} {:>10.4}\n",
                s.group.as_deref().unwrap_or("-"),
                s.condition.as_deref().unwrap_or("-"),
                s.count,
                s.mean,
                s.std
            ));
        }
        out.push('\n');

        out.push_str("パラメータ回復:\n");
        out.push_str(&self.recovery.render());
        out.push('\n');

        out.push_str("検定結果: ");
        out.push_str(&self.conclusion());
        out.push('\n');

        if let Some(path) = &self.csv_path {
            out.push_str(&format!("データセット: {}\n", path.display()));
        }
        if let Some(path) = &self.plot_path {
            out.push_str(&format!("プロット: {}\n", path.display()));
        }

        out
    }

    /// レポートをJSON文字列に変換
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// シナリオを実行してレポートを返す
///
/// 5段階のパイプライン: 仕様の検証とデータ生成、セルごとの要約、
/// パラメータ回復の検査、仮説検定、CSV・プロットの出力。
pub fn run_scenario(config: &ScenarioConfig, rng: &mut StdRng) -> Result<ScenarioReport> {
    info!("シナリオ '{}' を開始します", config.name);

    // 1. 検証と生成
    let dataset = sim_design(&config.design, &config.options, rng)?;
    debug!("生成: {} 行", dataset.len());

    // 2. セルごとの要約
    let summaries = stats::cell_summary(&dataset)?;

    // 3. パラメータ回復の検査
    let recovery = stats::check_recovery(&config.design, &dataset, &config.tolerance)?;
    if !recovery.all_within_tolerance() {
        warn!(
            "シナリオ '{}': 回復が許容誤差を超えるセルがあります",
            config.name
        );
    }

    // 4. 仮説検定
    let outcome = run_test(config, &dataset)?;

    // 5. 出力
    if let Some(path) = &config.csv_path {
        io::write_csv(&dataset, path)?;
    }
    let plot_path = render_plot(config, &dataset)?;

    info!("シナリオ '{}' が完了しました", config.name);

    Ok(ScenarioReport {
        name: config.name.clone(),
        dataset,
        summaries,
        recovery,
        outcome,
        csv_path: config.csv_path.clone(),
        plot_path,
    })
}

fn run_test(config: &ScenarioConfig, dataset: &SimDataset) -> Result<TestOutcome> {
    match config.test {
        TestPlan::OneSampleT { mu } => Ok(TestOutcome::TTest(stats::ttest_one_sample(
            dataset.values(),
            mu,
            &config.test_config,
        )?)),
        TestPlan::IndependentT { equal_var } => {
            let groups = dataset.group_levels();
            if groups.len() != 2 {
                return Err(Error::InvalidInput(format!(
                    "対応なしt検定には2つのグループが必要です: 実際 {}",
                    groups.len()
                )));
            }
            let sample1: Vec<f64> = group_values(dataset, &groups[0]);
            let sample2: Vec<f64> = group_values(dataset, &groups[1]);
            Ok(TestOutcome::TTest(stats::ttest_independent(
                &sample1,
                &sample2,
                equal_var,
                &config.test_config,
            )?))
        }
        TestPlan::PairedT => {
            if dataset.has_group() {
                return Err(Error::InvalidInput(
                    "対応ありt検定は被験者間要因の無いデザインでのみ実行できます".into(),
                ));
            }
            let conditions = dataset.condition_levels();
            if conditions.len() < 2 {
                return Err(Error::InvalidInput(format!(
                    "対応ありt検定には少なくとも2つの条件が必要です: 実際 {}",
                    conditions.len()
                )));
            }
            let wide = dataset.to_wide(None)?;
            let sample1: Vec<f64> = wide.iter().map(|(_, v)| v[0]).collect();
            let sample2: Vec<f64> = wide.iter().map(|(_, v)| v[1]).collect();
            Ok(TestOutcome::TTest(stats::ttest_paired(
                &sample1,
                &sample2,
                &config.test_config,
            )?))
        }
        TestPlan::OneWayAnova => {
            // 各セル（グループ×条件）をそのままANOVAのグループとして扱う
            let summaries = stats::cell_summary(dataset)?;
            let groups: Vec<(String, Vec<f64>)> = summaries
                .iter()
                .map(|s| {
                    let label = match (&s.group, &s.condition) {
                        (Some(g), Some(c)) => format!("{}:{}", g, c),
                        (Some(g), None) => g.clone(),
                        (None, Some(c)) => c.clone(),
                        (None, None) => "all".to_string(),
                    };
                    let values =
                        dataset.cell_values(s.group.as_deref(), s.condition.as_deref());
                    (label, values)
                })
                .collect();
            Ok(TestOutcome::Anova(stats::anova(
                &groups,
                config.test_config.alpha,
            )?))
        }
    }
}

fn group_values(dataset: &SimDataset, group: &str) -> Vec<f64> {
    dataset
        .rows()
        .iter()
        .filter(|r| r.group.as_deref() == Some(group))
        .map(|r| r.value)
        .collect()
}

#[cfg(feature = "visualization")]
fn render_plot(config: &ScenarioConfig, dataset: &SimDataset) -> Result<Option<PathBuf>> {
    match &config.plot_path {
        Some(path) => {
            let settings = crate::vis::PlotSettings {
                title: config.name.clone(),
                ..crate::vis::PlotSettings::default()
            };
            crate::vis::plot_cells(dataset, path, &settings)?;
            Ok(Some(path.clone()))
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "visualization"))]
fn render_plot(config: &ScenarioConfig, _dataset: &SimDataset) -> Result<Option<PathBuf>> {
    if let Some(path) = &config.plot_path {
        warn!(
            "visualizationフィーチャが無効のためプロット出力をスキップします: {}",
            path.display()
        );
    }
    Ok(None)
}
