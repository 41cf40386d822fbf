// データ生成モジュール
//
// デザイン仕様から多変量正規データを生成します。乱数生成器は常に
// 明示的に渡され、グローバルな状態は持ちません。同じシードと仕様から
// は常に同一のデータセットが再現されます。

mod mvnorm;

use log::{debug, info};
use rand::rngs::StdRng;

use crate::dataset::{Observation, SimDataset};
use crate::design::{CellSpec, DesignSpec, Factor, GroupSpec};
use crate::error::{Error, Result};
use crate::stats::descriptive;

/// データ生成のオプション
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimOptions {
    /// 経験的（厳密）一致モード
    ///
    /// trueの場合、生成されたサンプルのセルごとの平均・標準偏差と
    /// グループ内の条件間相関が設定値に厳密に一致します。falseの場合
    /// は期待値として設定値を目標とする確率的な生成になります。
    pub empirical: bool,
}

impl SimOptions {
    pub fn empirical() -> Self {
        SimOptions { empirical: true }
    }
}

/// デザイン仕様からデータセットを生成
///
/// 生成前に仕様の妥当性検証が行われ、不正な構成は記述的な設定エラー
/// になります。行は被験者→条件の順に並び、行数は仕様の
/// `total_rows()` に一致します。
///
/// # 例
/// ```rust
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use simrs::design::DesignSpec;
/// use simrs::sim::{sim_design, SimOptions};
///
/// let spec = DesignSpec::one_sample(50, 2.0, 1.0);
/// let mut rng = StdRng::seed_from_u64(17);
/// let data = sim_design(&spec, &SimOptions::default(), &mut rng).unwrap();
/// assert_eq!(data.len(), 50);
/// ```
pub fn sim_design(
    spec: &DesignSpec,
    options: &SimOptions,
    rng: &mut StdRng,
) -> Result<SimDataset> {
    spec.validate()?;

    let c = spec.n_conditions();
    let mut data = SimDataset::new(spec.between.is_some(), spec.within.is_some());

    // IDの桁数は全被験者数に合わせてゼロ詰め
    let width = spec.total_subjects().to_string().len().max(2);
    let mut subject = 0usize;

    for (g, group) in spec.groups.iter().enumerate() {
        let r = mvnorm::corr_matrix_from_upper(c, &group.correlations);
        let target_l = mvnorm::cholesky(&r).map_err(|_| {
            Error::InvalidDesign(format!(
                "相関行列が正定値ではありません (グループ {})",
                spec.group_label(g).unwrap_or("0")
            ))
        })?;

        if options.empirical && group.n <= c {
            return Err(Error::InsufficientData(format!(
                "経験的一致にはサンプルサイズが条件数より大きい必要があります: n={}, 条件数={}",
                group.n, c
            )));
        }

        let z = mvnorm::draw_standard_normal(rng, group.n, c);
        let scores = if options.empirical {
            mvnorm::empirical_transform(z, &target_l)?
        } else {
            z.iter().map(|row| mvnorm::mat_vec(&target_l, row)).collect()
        };

        for row in &scores {
            subject += 1;
            let id = format!("{}{:0width$}", spec.id_prefix, subject, width = width);
            for (j, cell) in group.cells.iter().enumerate() {
                data.push_row(Observation {
                    id: id.clone(),
                    group: spec.group_label(g).map(|s| s.to_string()),
                    condition: spec.condition_label(j).map(|s| s.to_string()),
                    value: cell.mean + cell.sd * row[j],
                })?;
            }
        }

        debug!(
            "グループ {} を生成しました: n={}, 条件数={}",
            spec.group_label(g).unwrap_or("-"),
            group.n,
            c
        );
    }

    info!("デザインから {} 行を生成しました", data.len());
    Ok(data)
}

/// 既存データセットと同じ構造・モーメントを持つデータを生成
///
/// 入力データからセルごとの平均・標準偏差とグループ内の条件間相関を
/// 推定し、その値を目標とするデザイン仕様を組み立てて `sim_design`
/// に委譲します。`n_per_group` は出力の各グループの被験者数です。
pub fn sim_from_data(
    data: &SimDataset,
    n_per_group: usize,
    options: &SimOptions,
    rng: &mut StdRng,
) -> Result<SimDataset> {
    if data.is_empty() {
        return Err(Error::EmptyData(
            "既存データからの生成には元データが必要です".into(),
        ));
    }
    if n_per_group == 0 {
        return Err(Error::InvalidDesign(
            "サンプルサイズは正の整数である必要があります".into(),
        ));
    }

    let spec = estimate_design(data, n_per_group)?;
    debug!(
        "既存データからデザインを推定しました: グループ数={}, 条件数={}",
        spec.n_groups(),
        spec.n_conditions()
    );
    sim_design(&spec, options, rng)
}

/// 既存データセットからデザイン仕様を推定
pub fn estimate_design(data: &SimDataset, n_per_group: usize) -> Result<DesignSpec> {
    let group_levels = data.group_levels();
    let condition_levels = data.condition_levels();

    let between = if data.has_group() {
        let refs: Vec<&str> = group_levels.iter().map(|s| s.as_str()).collect();
        Some(Factor::new("group", &refs))
    } else {
        None
    };
    let within = if data.has_condition() {
        let refs: Vec<&str> = condition_levels.iter().map(|s| s.as_str()).collect();
        Some(Factor::new("condition", &refs))
    } else {
        None
    };

    let group_iter: Vec<Option<&str>> = if data.has_group() {
        group_levels.iter().map(|s| Some(s.as_str())).collect()
    } else {
        vec![None]
    };
    let cond_iter: Vec<Option<&str>> = if data.has_condition() {
        condition_levels.iter().map(|s| Some(s.as_str())).collect()
    } else {
        vec![None]
    };

    let mut groups = Vec::with_capacity(group_iter.len());
    for group in &group_iter {
        let mut cells = Vec::with_capacity(cond_iter.len());
        for condition in &cond_iter {
            let values = data.cell_values(*group, *condition);
            if values.len() < 2 {
                return Err(Error::InsufficientData(format!(
                    "セル ({}, {}) のデータが不足しています: {}件",
                    group.unwrap_or("-"),
                    condition.unwrap_or("-"),
                    values.len()
                )));
            }
            let stats = descriptive::describe_impl(&values)?;
            cells.push(CellSpec::new(stats.mean, stats.std));
        }

        // 条件間相関を横持ちデータから推定
        let c = cond_iter.len();
        let mut correlations = Vec::with_capacity(c * (c - 1) / 2);
        if c > 1 {
            let wide = data.to_wide(*group)?;
            for i in 0..c {
                for j in (i + 1)..c {
                    let xs: Vec<f64> = wide.iter().map(|(_, v)| v[i]).collect();
                    let ys: Vec<f64> = wide.iter().map(|(_, v)| v[j]).collect();
                    correlations.push(descriptive::correlation_impl(&xs, &ys)?);
                }
            }
        }

        groups.push(GroupSpec::new(n_per_group, cells, correlations));
    }

    Ok(DesignSpec::new(between, within, groups))
}
