// simrs 被験者間デザインのサンプル
// 2グループ（placebo: n=50, drug: n=40）を生成して対応なしt検定を行う

use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::error::Result;
use simrs::report::{run_scenario, ScenarioConfig, TestPlan};
use simrs::DesignSpec;

fn main() -> Result<()> {
    println!("simrs 被験者間デザインのサンプル\n");

    std::fs::create_dir_all("output")?;

    let design = DesignSpec::between(
        "group",
        &[("placebo", 50, 100.0, 15.0), ("drug", 40, 108.0, 15.0)],
    );

    let config = ScenarioConfig::new(
        "between groups",
        design,
        TestPlan::IndependentT { equal_var: false },
    )
    .with_csv_path("output/between_groups.csv");

    let mut rng = StdRng::seed_from_u64(42);
    let report = run_scenario(&config, &mut rng)?;

    println!("{}", report.render());
    println!(
        "行数: {} (placebo: {}, drug: {})",
        report.dataset.len(),
        report.dataset.cell_values(Some("placebo"), None).len(),
        report.dataset.cell_values(Some("drug"), None).len()
    );

    Ok(())
}
