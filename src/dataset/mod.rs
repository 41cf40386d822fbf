// シミュレーションデータセットモジュール
//
// 生成されたデータを縦持ち（1行 = 被験者×条件の1観測）で保持します。

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 1観測 = (被験者ID, グループ, 条件, 測定値)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 被験者ID
    pub id: String,
    /// 被験者間グループのラベル（無い場合はNone）
    pub group: Option<String>,
    /// 被験者内条件のラベル（無い場合はNone）
    pub condition: Option<String>,
    /// 測定値
    pub value: f64,
}

/// 縦持ちのシミュレーションデータセット
///
/// 行数の不変条件: Σg (グループgの被験者数 × 条件数)。
/// 列構成はグループ列・条件列の有無で2〜4列になります。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimDataset {
    rows: Vec<Observation>,
    has_group: bool,
    has_condition: bool,
}

impl SimDataset {
    /// 空のデータセットを作成
    pub fn new(has_group: bool, has_condition: bool) -> Self {
        SimDataset {
            rows: Vec::new(),
            has_group,
            has_condition,
        }
    }

    /// 行を追加（列構成と一致しない行はエラー）
    pub fn push_row(&mut self, row: Observation) -> Result<()> {
        if row.group.is_some() != self.has_group {
            return Err(Error::InvalidInput(
                "グループ列の有無が一致しません".into(),
            ));
        }
        if row.condition.is_some() != self.has_condition {
            return Err(Error::InvalidInput("条件列の有無が一致しません".into()));
        }
        if !row.value.is_finite() {
            return Err(Error::InvalidValue(format!(
                "測定値が有限ではありません: {}",
                row.value
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// グループ列を持つか
    pub fn has_group(&self) -> bool {
        self.has_group
    }

    /// 条件列を持つか
    pub fn has_condition(&self) -> bool {
        self.has_condition
    }

    /// 全行への参照
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// グループ水準を出現順に列挙
    pub fn group_levels(&self) -> Vec<String> {
        let mut levels: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(g) = &row.group {
                if !levels.contains(g) {
                    levels.push(g.clone());
                }
            }
        }
        levels
    }

    /// 条件水準を出現順に列挙
    pub fn condition_levels(&self) -> Vec<String> {
        let mut levels: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(c) = &row.condition {
                if !levels.contains(c) {
                    levels.push(c.clone());
                }
            }
        }
        levels
    }

    /// 被験者IDを出現順に列挙
    pub fn subject_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.id) {
                ids.push(row.id.clone());
            }
        }
        ids
    }

    /// 指定セル（グループ×条件）の測定値を行順に取得
    pub fn cell_values(&self, group: Option<&str>, condition: Option<&str>) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.group.as_deref() == group && r.condition.as_deref() == condition)
            .map(|r| r.value)
            .collect()
    }

    /// 全測定値を行順に取得
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value).collect()
    }

    /// 指定グループを横持ちに変換
    ///
    /// 戻り値は (被験者ID, 条件順の測定値ベクトル) のリスト。条件順は
    /// `condition_levels()` の出現順に従い、欠測がある被験者はエラーに
    /// なります（同一被験者の反復測定が前提のため）。
    pub fn to_wide(&self, group: Option<&str>) -> Result<Vec<(String, Vec<f64>)>> {
        let conditions = self.condition_levels();
        if conditions.is_empty() {
            return Err(Error::InvalidInput(
                "条件列が無いデータは横持ちに変換できません".into(),
            ));
        }

        let mut order: Vec<String> = Vec::new();
        let mut wide: Vec<(String, Vec<Option<f64>>)> = Vec::new();

        for row in self.rows.iter().filter(|r| r.group.as_deref() == group) {
            let cond_idx = conditions
                .iter()
                .position(|c| Some(c.as_str()) == row.condition.as_deref())
                .ok_or_else(|| Error::InvalidInput("不明な条件ラベルです".into()))?;

            let subj_idx = match order.iter().position(|id| id == &row.id) {
                Some(i) => i,
                None => {
                    order.push(row.id.clone());
                    wide.push((row.id.clone(), vec![None; conditions.len()]));
                    wide.len() - 1
                }
            };
            wide[subj_idx].1[cond_idx] = Some(row.value);
        }

        wide.into_iter()
            .map(|(id, values)| {
                let filled: Result<Vec<f64>> = values
                    .into_iter()
                    .map(|v| {
                        v.ok_or_else(|| {
                            Error::InsufficientData(format!(
                                "被験者 {} に欠けている条件があります",
                                id
                            ))
                        })
                    })
                    .collect();
                Ok((id, filled?))
            })
            .collect()
    }
}
