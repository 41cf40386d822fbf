use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::report::{run_scenario, ScenarioConfig, TestOutcome, TestPlan};
use simrs::sim::SimOptions;
use simrs::{CellSpec, DesignSpec, Factor, GroupSpec};

// パイプライン（生成→要約→回復→検定→出力）のエンドツーエンドテスト

#[test]
fn test_one_sample_scenario_empirical() {
    // 経験的一致なら検定統計量も決定的: t = 2/(1/√50) = √50·2
    let config = ScenarioConfig::new(
        "one sample",
        DesignSpec::one_sample(50, 2.0, 1.0),
        TestPlan::OneSampleT { mu: 0.0 },
    )
    .with_options(SimOptions::empirical());

    let mut rng = StdRng::seed_from_u64(17);
    let report = run_scenario(&config, &mut rng).unwrap();

    assert_eq!(report.dataset.len(), 50);
    assert!(report.recovery.all_within_tolerance());

    match &report.outcome {
        TestOutcome::TTest(t) => {
            assert!((t.statistic - 2.0 * 50.0_f64.sqrt()).abs() < 1e-6);
            assert!(t.significant);
        }
        TestOutcome::Anova(_) => panic!("t検定の結果であるべき"),
    }
}

#[test]
fn test_between_scenario_shape() {
    let config = ScenarioConfig::new(
        "between groups",
        DesignSpec::between(
            "group",
            &[("placebo", 50, 100.0, 15.0), ("drug", 40, 105.0, 15.0)],
        ),
        TestPlan::IndependentT { equal_var: false },
    );

    let mut rng = StdRng::seed_from_u64(17);
    let report = run_scenario(&config, &mut rng).unwrap();

    assert_eq!(report.dataset.len(), 90);
    assert_eq!(report.summaries.len(), 2);
    assert!(matches!(report.outcome, TestOutcome::TTest(_)));
    assert!(report.conclusion().starts_with("t("));
}

#[test]
fn test_within_scenario_paired_empirical() {
    // 差の平均は厳密に-2、差のSDは厳密に2 → t = -2/(2/√20) = -√20
    let config = ScenarioConfig::new(
        "within conditions",
        DesignSpec::within(
            "phase",
            20,
            &[("pre", 10.0, 2.0), ("post", 12.0, 2.0)],
            &[0.5],
        ),
        TestPlan::PairedT,
    )
    .with_options(SimOptions::empirical());

    let mut rng = StdRng::seed_from_u64(23);
    let report = run_scenario(&config, &mut rng).unwrap();

    match &report.outcome {
        TestOutcome::TTest(t) => {
            assert!((t.statistic + 20.0_f64.sqrt()).abs() < 1e-6);
            assert!((t.df - 19.0).abs() < 1e-12);
            assert!(t.significant);
        }
        TestOutcome::Anova(_) => panic!("t検定の結果であるべき"),
    }
}

#[test]
fn test_mixed_scenario_anova() {
    let config = ScenarioConfig::new(
        "mixed design",
        DesignSpec::mixed(
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
        ),
        TestPlan::OneWayAnova,
    );

    let mut rng = StdRng::seed_from_u64(31);
    let report = run_scenario(&config, &mut rng).unwrap();

    match &report.outcome {
        TestOutcome::Anova(a) => {
            // 4セル、各30件
            assert_eq!(a.df_between, 3);
            assert_eq!(a.df_within, 116);
        }
        TestOutcome::TTest(_) => panic!("分散分析の結果であるべき"),
    }
}

#[test]
fn test_scenario_csv_export() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("scenario.csv");

    let config = ScenarioConfig::new(
        "with export",
        DesignSpec::one_sample(20, 0.0, 1.0),
        TestPlan::OneSampleT { mu: 0.0 },
    )
    .with_csv_path(&csv_path);

    let mut rng = StdRng::seed_from_u64(2);
    let report = run_scenario(&config, &mut rng).unwrap();

    assert!(csv_path.exists());
    let restored = simrs::io::read_csv(&csv_path).unwrap();
    assert_eq!(restored, report.dataset);
}

#[test]
fn test_render_and_json() {
    let config = ScenarioConfig::new(
        "render test",
        DesignSpec::one_sample(10, 1.0, 0.5),
        TestPlan::OneSampleT { mu: 1.0 },
    );

    let mut rng = StdRng::seed_from_u64(13);
    let report = run_scenario(&config, &mut rng).unwrap();

    let text = report.render();
    assert!(text.contains("render test"));
    assert!(text.contains("セルごとの要約"));
    assert!(text.contains("パラメータ回復"));
    assert!(text.contains("検定結果"));

    let json = report.to_json_string().unwrap();
    assert!(json.contains("\"name\""));
    assert!(json.contains("\"kind\""));
}

#[test]
fn test_test_plan_mismatch_is_error() {
    // 1グループのデザインで対応なしt検定は実行できない
    let config = ScenarioConfig::new(
        "bad plan",
        DesignSpec::one_sample(10, 0.0, 1.0),
        TestPlan::IndependentT { equal_var: true },
    );
    let mut rng = StdRng::seed_from_u64(3);
    assert!(run_scenario(&config, &mut rng).is_err());

    // 条件の無いデザインで対応ありt検定は実行できない
    let config = ScenarioConfig::new(
        "bad plan 2",
        DesignSpec::one_sample(10, 0.0, 1.0),
        TestPlan::PairedT,
    );
    let mut rng = StdRng::seed_from_u64(3);
    assert!(run_scenario(&config, &mut rng).is_err());
}
