// simrs 被験者内デザインのサンプル
// 全員が3条件で測定される反復測定データを生成し、最初の2条件を
// 対応ありt検定で比較する

use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::error::Result;
use simrs::report::{run_scenario, ScenarioConfig, TestPlan};
use simrs::sim::SimOptions;
use simrs::DesignSpec;

fn main() -> Result<()> {
    println!("simrs 被験者内デザインのサンプル\n");

    std::fs::create_dir_all("output")?;

    // 3条件の反復測定: 相関は (pre,post)=0.5, (pre,followup)=0.4, (post,followup)=0.6
    let design = DesignSpec::within(
        "time",
        30,
        &[("pre", 10.0, 2.0), ("post", 12.0, 2.0), ("followup", 11.0, 2.0)],
        &[0.5, 0.4, 0.6],
    );

    let config = ScenarioConfig::new("within conditions", design, TestPlan::PairedT)
        .with_options(SimOptions::empirical())
        .with_csv_path("output/within_conditions.csv");

    let mut rng = StdRng::seed_from_u64(7);
    let report = run_scenario(&config, &mut rng)?;
    println!("{}", report.render());

    Ok(())
}
