// 推測統計・仮説検定モジュール

mod distributions;

use crate::error::{Error, Result};
use crate::stats::{AnovaResult, TTestConfig, TTestResult, Tail};

fn mean_and_var(sample: &[f64]) -> (f64, f64) {
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let var = sample.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

fn validate_config(config: &TTestConfig) -> Result<()> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(Error::InvalidValue(format!(
            "有意水準は0から1の間である必要があります: {}",
            config.alpha
        )));
    }
    if !(config.conf_level > 0.0 && config.conf_level < 1.0) {
        return Err(Error::InvalidValue(format!(
            "信頼水準は0から1の間である必要があります: {}",
            config.conf_level
        )));
    }
    Ok(())
}

fn p_value(t: f64, df: f64, tail: Tail) -> f64 {
    match tail {
        Tail::TwoSided => 2.0 * (1.0 - distributions::t_cdf(t.abs(), df)),
        Tail::Less => distributions::t_cdf(t, df),
        Tail::Greater => 1.0 - distributions::t_cdf(t, df),
    }
}

// 片側検定の信頼区間は検定しない側が開区間になる
fn confidence_interval(estimate: f64, se: f64, df: f64, config: &TTestConfig) -> (f64, f64) {
    match config.tail {
        Tail::TwoSided => {
            let q = distributions::t_quantile(1.0 - (1.0 - config.conf_level) / 2.0, df);
            (estimate - q * se, estimate + q * se)
        }
        Tail::Greater => {
            let q = distributions::t_quantile(config.conf_level, df);
            (estimate - q * se, f64::INFINITY)
        }
        Tail::Less => {
            let q = distributions::t_quantile(config.conf_level, df);
            (f64::NEG_INFINITY, estimate + q * se)
        }
    }
}

fn build_result(
    t: f64,
    df: f64,
    estimate: f64,
    se: f64,
    cohen_d: f64,
    config: &TTestConfig,
) -> TTestResult {
    let pvalue = p_value(t, df, config.tail);
    let (conf_low, conf_high) = confidence_interval(estimate, se, df, config);
    TTestResult {
        statistic: t,
        df,
        pvalue,
        significant: pvalue < config.alpha,
        estimate,
        conf_low,
        conf_high,
        conf_level: config.conf_level,
        cohen_d,
    }
}

/// 1標本t検定の内部実装
pub(crate) fn one_sample_ttest_impl(
    sample: &[f64],
    mu: f64,
    config: &TTestConfig,
) -> Result<TTestResult> {
    validate_config(config)?;
    if sample.is_empty() {
        return Err(Error::EmptyData("t検定にはデータが必要です".into()));
    }
    if sample.len() < 2 {
        return Err(Error::InsufficientData(
            "t検定には少なくとも2つのデータポイントが必要です".into(),
        ));
    }
    if !mu.is_finite() {
        return Err(Error::InvalidValue(format!(
            "帰無仮説の平均が有限ではありません: {}",
            mu
        )));
    }

    let n = sample.len() as f64;
    let (mean, var) = mean_and_var(sample);
    if var <= 0.0 {
        return Err(Error::ComputationError(
            "分散が0のためt検定を実行できません".into(),
        ));
    }

    let sd = var.sqrt();
    let se = sd / n.sqrt();
    let t = (mean - mu) / se;

    Ok(build_result(t, n - 1.0, mean, se, (mean - mu) / sd, config))
}

/// 2標本（対応なし）t検定の内部実装
pub(crate) fn independent_ttest_impl(
    sample1: &[f64],
    sample2: &[f64],
    equal_var: bool,
    config: &TTestConfig,
) -> Result<TTestResult> {
    validate_config(config)?;
    if sample1.is_empty() || sample2.is_empty() {
        return Err(Error::EmptyData("t検定にはデータが必要です".into()));
    }
    if sample1.len() < 2 || sample2.len() < 2 {
        return Err(Error::InsufficientData(
            "t検定には各グループに少なくとも2つのデータポイントが必要です".into(),
        ));
    }

    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;
    let (m1, v1) = mean_and_var(sample1);
    let (m2, v2) = mean_and_var(sample2);

    let (t, df, se) = if equal_var {
        // 等分散を仮定（Studentのt検定）
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0);
        let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
        if se == 0.0 {
            return Err(Error::ComputationError(
                "分散が0のためt検定を実行できません".into(),
            ));
        }
        ((m1 - m2) / se, n1 + n2 - 2.0, se)
    } else {
        // Welchのt検定（Welch-Satterthwaiteの近似自由度）
        let se2 = v1 / n1 + v2 / n2;
        let se = se2.sqrt();
        if se == 0.0 {
            return Err(Error::ComputationError(
                "分散が0のためt検定を実行できません".into(),
            ));
        }
        let df = se2.powi(2)
            / ((v1 / n1).powi(2) / (n1 - 1.0) + (v2 / n2).powi(2) / (n2 - 1.0));
        ((m1 - m2) / se, df, se)
    };

    let pooled_sd = (((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0)).sqrt();
    let cohen_d = (m1 - m2) / pooled_sd;

    Ok(build_result(t, df, m1 - m2, se, cohen_d, config))
}

/// 対応ありt検定の内部実装
///
/// ペアごとの差に対する1標本t検定（帰無仮説: 差の平均 = 0）。
pub(crate) fn paired_ttest_impl(
    sample1: &[f64],
    sample2: &[f64],
    config: &TTestConfig,
) -> Result<TTestResult> {
    if sample1.len() != sample2.len() {
        return Err(Error::LengthMismatch {
            expected: sample1.len(),
            actual: sample2.len(),
        });
    }

    let diffs: Vec<f64> = sample1.iter().zip(sample2).map(|(a, b)| a - b).collect();
    one_sample_ttest_impl(&diffs, 0.0, config)
}

/// 一元配置分散分析（ANOVA）の内部実装
pub(crate) fn anova_impl(groups: &[(String, Vec<f64>)], alpha: f64) -> Result<AnovaResult> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidValue(format!(
            "有意水準は0から1の間である必要があります: {}",
            alpha
        )));
    }
    if groups.len() < 2 {
        return Err(Error::InsufficientData(
            "分散分析には少なくとも2つのグループが必要です".into(),
        ));
    }

    let mut total_n = 0;
    let mut global_sum = 0.0;
    for (label, values) in groups {
        if values.is_empty() {
            return Err(Error::EmptyData(format!(
                "空のグループがあります: {}",
                label
            )));
        }
        total_n += values.len();
        global_sum += values.iter().sum::<f64>();
    }

    if total_n <= groups.len() {
        return Err(Error::InsufficientData(
            "分散分析にはグループ数より多くのデータが必要です".into(),
        ));
    }

    let global_mean = global_sum / total_n as f64;

    // グループ間平方和（SSB）とグループ内平方和（SSW）
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (_, values) in groups {
        let group_n = values.len() as f64;
        let group_mean = values.iter().sum::<f64>() / group_n;
        ss_between += group_n * (group_mean - global_mean).powi(2);
        ss_within += values.iter().map(|&v| (v - group_mean).powi(2)).sum::<f64>();
    }
    let ss_total = ss_between + ss_within;

    let df_between = groups.len() - 1;
    let df_within = total_n - groups.len();
    let df_total = total_n - 1;

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    if ms_within <= 0.0 {
        return Err(Error::ComputationError(
            "グループ内分散が0のため分散分析を実行できません".into(),
        ));
    }

    let f_statistic = ms_between / ms_within;
    let p_value = 1.0 - distributions::f_cdf(f_statistic, df_between as f64, df_within as f64);

    Ok(AnovaResult {
        f_statistic,
        p_value,
        ss_between,
        ss_within,
        ss_total,
        df_between,
        df_within,
        df_total,
        ms_between,
        ms_within,
        eta_squared: ss_between / ss_total,
        significant: p_value < alpha,
    })
}
