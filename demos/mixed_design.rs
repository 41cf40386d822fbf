// simrs 混合デザインのサンプル
// 被験者間（control/treatment）×被験者内（pre/post）の2×2デザインを
// 生成し、セルをグループとした分散分析とプロット出力を行う

use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::error::Result;
use simrs::report::{run_scenario, ScenarioConfig, TestPlan};
use simrs::vis::{plot_cells, OutputType, PlotSettings};
use simrs::{CellSpec, DesignSpec, Factor, GroupSpec};

fn main() -> Result<()> {
    println!("simrs 混合デザインのサンプル\n");

    std::fs::create_dir_all("output")?;

    let design = DesignSpec::mixed(
        Factor::new("group", &["control", "treatment"]),
        Factor::new("phase", &["pre", "post"]),
        vec![
            GroupSpec::new(
                30,
                vec![CellSpec::new(10.0, 2.0), CellSpec::new(10.5, 2.0)],
                vec![0.5],
            ),
            GroupSpec::new(
                30,
                vec![CellSpec::new(10.0, 2.0), CellSpec::new(13.0, 2.0)],
                vec![0.5],
            ),
        ],
    );

    let config = ScenarioConfig::new("mixed design", design, TestPlan::OneWayAnova)
        .with_csv_path("output/mixed_design.csv")
        .with_plot_path("output/mixed_design.png");

    let mut rng = StdRng::seed_from_u64(99);
    let report = run_scenario(&config, &mut rng)?;
    println!("{}", report.render());

    // SVG版も出力
    let settings = PlotSettings {
        title: "mixed design".to_string(),
        output_type: OutputType::SVG,
        ..PlotSettings::default()
    };
    plot_cells(&report.dataset, "output/mixed_design.svg", &settings)?;
    println!("SVGプロット: output/mixed_design.svg");

    Ok(())
}
