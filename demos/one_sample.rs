// simrs 1標本デザインのサンプル
// 既知の平均・標準偏差からデータを生成し、回復の確認とt検定を行う

use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::error::Result;
use simrs::report::{run_scenario, ScenarioConfig, TestPlan};
use simrs::sim::SimOptions;
use simrs::DesignSpec;

fn main() -> Result<()> {
    println!("simrs 1標本デザインのサンプル\n");

    std::fs::create_dir_all("output")?;

    // n=50, μ=2, σ=1（確率的生成）
    let config = ScenarioConfig::new(
        "one sample (stochastic)",
        DesignSpec::one_sample(50, 2.0, 1.0),
        TestPlan::OneSampleT { mu: 0.0 },
    )
    .with_csv_path("output/one_sample.csv");

    let mut rng = StdRng::seed_from_u64(17);
    let report = run_scenario(&config, &mut rng)?;
    println!("{}", report.render());

    // 経験的一致: 標本平均・標本SDが設定値に厳密に一致する
    let config = ScenarioConfig::new(
        "one sample (empirical)",
        DesignSpec::one_sample(50, 2.0, 1.0),
        TestPlan::OneSampleT { mu: 0.0 },
    )
    .with_options(SimOptions::empirical());

    let report = run_scenario(&config, &mut rng)?;
    println!("{}", report.render());

    Ok(())
}
