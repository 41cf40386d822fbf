use csv::{ReaderBuilder, Writer};
use log::debug;
use std::fs::File;
use std::path::Path;

use crate::dataset::{Observation, SimDataset};
use crate::error::{Error, Result};

/// データセットをCSVファイルに書き出す
///
/// 列構成は `id[,group][,condition],value` で、ヘッダー行を含みます。
/// 値はそのまま読み戻せる精度で出力されます。
pub fn write_csv<P: AsRef<Path>>(data: &SimDataset, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let mut wtr = Writer::from_writer(file);

    // ヘッダー行
    let mut header = vec!["id"];
    if data.has_group() {
        header.push("group");
    }
    if data.has_condition() {
        header.push("condition");
    }
    header.push("value");
    wtr.write_record(&header).map_err(Error::Csv)?;

    // データ行
    for row in data.rows() {
        let mut record = vec![row.id.clone()];
        if let Some(group) = &row.group {
            record.push(group.clone());
        }
        if let Some(condition) = &row.condition {
            record.push(condition.clone());
        }
        record.push(format!("{}", row.value));
        wtr.write_record(&record).map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    debug!(
        "{} 行をCSVに書き出しました: {}",
        data.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// CSVファイルからデータセットを読み込む
///
/// ヘッダー行から列を判別します。`id` と `value` は必須、`group` と
/// `condition` は任意です。
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<SimDataset> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;

    // CSVリーダーを設定
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(Error::Csv)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let id_idx = headers
        .iter()
        .position(|h| h == "id")
        .ok_or_else(|| Error::ColumnNotFound("id".into()))?;
    let value_idx = headers
        .iter()
        .position(|h| h == "value")
        .ok_or_else(|| Error::ColumnNotFound("value".into()))?;
    let group_idx = headers.iter().position(|h| h == "group");
    let condition_idx = headers.iter().position(|h| h == "condition");

    let mut data = SimDataset::new(group_idx.is_some(), condition_idx.is_some());

    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(Error::Csv)?;

        let raw_value = field(&record, value_idx, line)?;
        let value: f64 = raw_value.parse().map_err(|_| {
            Error::Format(format!(
                "行 {} の値を数値として解釈できません: {}",
                line + 2,
                raw_value
            ))
        })?;

        data.push_row(Observation {
            id: field(&record, id_idx, line)?.to_string(),
            group: match group_idx {
                Some(idx) => Some(field(&record, idx, line)?.to_string()),
                None => None,
            },
            condition: match condition_idx {
                Some(idx) => Some(field(&record, idx, line)?.to_string()),
                None => None,
            },
            value,
        })?;
    }

    debug!(
        "{} 行をCSVから読み込みました: {}",
        data.len(),
        path.as_ref().display()
    );
    Ok(data)
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, line: usize) -> Result<&'a str> {
    record
        .get(idx)
        .ok_or_else(|| Error::Format(format!("行 {} の列数が不足しています", line + 2)))
}
