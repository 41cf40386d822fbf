// 多変量正規サンプリングの数値カーネル
//
// 小規模な密行列演算のみを扱います（条件数Cは高々数個）。

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};

/// 上三角（行優先）の相関係数ベクトルからC×Cの相関行列を組み立てる
pub(crate) fn corr_matrix_from_upper(c: usize, upper: &[f64]) -> Vec<Vec<f64>> {
    let mut m = vec![vec![0.0; c]; c];
    let mut k = 0;
    for i in 0..c {
        m[i][i] = 1.0;
        for j in (i + 1)..c {
            m[i][j] = upper[k];
            m[j][i] = upper[k];
            k += 1;
        }
    }
    m
}

/// コレスキー分解（下三角行列Lを返す）
pub(crate) fn cholesky(matrix: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                // 対角要素が非正なら正定値ではない
                if sum <= 1e-12 {
                    return Err(Error::ComputationError(
                        "行列が正定値ではありません".into(),
                    ));
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Ok(l)
}

/// 前進代入: L y = b を解く（Lは下三角）
pub(crate) fn forward_substitute(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i][k] * y[k];
        }
        y[i] = sum / l[i][i];
    }
    y
}

/// 下三角行列とベクトルの積 L·b
pub(crate) fn mat_vec(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    l.iter()
        .map(|row| row.iter().zip(b).map(|(a, x)| a * x).sum())
        .collect()
}

/// n×c の標準正規乱数行列を生成
pub(crate) fn draw_standard_normal(rng: &mut StdRng, n: usize, c: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..c).map(|_| rng.sample(StandardNormal)).collect())
        .collect()
}

/// 各列の平均を0に中心化
pub(crate) fn center_columns(data: &mut [Vec<f64>]) {
    if data.is_empty() {
        return;
    }
    let n = data.len() as f64;
    let c = data[0].len();
    for j in 0..c {
        let mean = data.iter().map(|row| row[j]).sum::<f64>() / n;
        for row in data.iter_mut() {
            row[j] -= mean;
        }
    }
}

/// 中心化済みデータの不偏標本共分散行列（c×c）
pub(crate) fn sample_covariance(data: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = data.len();
    let c = if n > 0 { data[0].len() } else { 0 };
    let mut s = vec![vec![0.0; c]; c];
    for row in data {
        for i in 0..c {
            for j in 0..c {
                s[i][j] += row[i] * row[j];
            }
        }
    }
    let denom = (n.saturating_sub(1)).max(1) as f64;
    for row in s.iter_mut() {
        for v in row.iter_mut() {
            *v /= denom;
        }
    }
    s
}

/// 経験的（厳密）一致への変換
///
/// 標本共分散のコレスキー因子で白色化したのち、目標相関行列の
/// コレスキー因子で色付けします。結果の列は標本平均が厳密に0、
/// 不偏標本共分散が厳密に目標相関行列になります。
pub(crate) fn empirical_transform(
    mut z: Vec<Vec<f64>>,
    target_l: &[Vec<f64>],
) -> Result<Vec<Vec<f64>>> {
    center_columns(&mut z);
    let s = sample_covariance(&z);
    let ls = cholesky(&s).map_err(|_| {
        Error::ComputationError("標本共分散行列のコレスキー分解に失敗しました".into())
    })?;

    Ok(z.iter()
        .map(|row| mat_vec(target_l, &forward_substitute(&ls, row)))
        .collect())
}
