use thiserror::Error;

/// エラー型の定義
#[derive(Error, Debug)]
pub enum Error {
    #[error("無効なデザイン設定です: {0}")]
    InvalidDesign(String),

    #[error("無効な入力です: {0}")]
    InvalidInput(String),

    #[error("無効な値です: {0}")]
    InvalidValue(String),

    #[error("データがありません: {0}")]
    EmptyData(String),

    #[error("データ不足エラー: {0}")]
    InsufficientData(String),

    #[error("次元不一致エラー: {0}")]
    DimensionMismatch(String),

    #[error("長さが一致しません: 期待値 {expected}, 実際 {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("列が見つかりません: {0}")]
    ColumnNotFound(String),

    #[error("計算エラー: {0}")]
    ComputationError(String),

    #[error("データ形式エラー: {0}")]
    Format(String),

    #[error("入出力エラー")]
    Io(#[source] std::io::Error),

    #[error("CSVエラー")]
    Csv(#[source] csv::Error),

    #[error("JSONエラー")]
    Json(#[source] serde_json::Error),

    #[error("可視化エラー: {0}")]
    Visualization(String),
}

/// Resultの型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

// Plottersエラーの変換
#[cfg(feature = "plotters")]
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for Error
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Visualization(format!("プロット描画エラー: {}", err))
    }
}
