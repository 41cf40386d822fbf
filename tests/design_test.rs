use simrs::{CellSpec, DesignSpec, Factor, GroupSpec};

// デザイン仕様の検証ルールのテスト
#[test]
fn test_valid_shapes() {
    // 1標本
    assert!(DesignSpec::one_sample(50, 2.0, 1.0).validate().is_ok());

    // 被験者間
    let between = DesignSpec::between(
        "group",
        &[("placebo", 50, 100.0, 15.0), ("drug", 40, 105.0, 15.0)],
    );
    assert!(between.validate().is_ok());

    // 被験者内（3条件 → 相関3件）
    let within = DesignSpec::within(
        "time",
        20,
        &[("pre", 10.0, 2.0), ("post", 12.0, 2.0), ("followup", 11.0, 2.0)],
        &[0.5, 0.4, 0.6],
    );
    assert!(within.validate().is_ok());

    // 混合（2×2）
    let mixed = DesignSpec::mixed(
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
    assert!(mixed.validate().is_ok());
    assert_eq!(mixed.total_rows(), 120);
}

#[test]
fn test_sample_size_must_be_positive() {
    // サンプルサイズ0は空の結果ではなく設定エラーになる
    let spec = DesignSpec::one_sample(0, 2.0, 1.0);
    assert!(spec.validate().is_err());

    let spec = DesignSpec::between("group", &[("a", 10, 0.0, 1.0), ("b", 0, 0.0, 1.0)]);
    assert!(spec.validate().is_err());
}

#[test]
fn test_correlation_count_must_match() {
    // C=3 → C·(C−1)/2 = 3件の相関が必要
    let too_few = DesignSpec::within(
        "cond",
        10,
        &[("a", 0.0, 1.0), ("b", 0.0, 1.0), ("c", 0.0, 1.0)],
        &[0.5, 0.5],
    );
    assert!(too_few.validate().is_err());

    let too_many = DesignSpec::within(
        "cond",
        10,
        &[("a", 0.0, 1.0), ("b", 0.0, 1.0)],
        &[0.5, 0.5],
    );
    assert!(too_many.validate().is_err());
}

#[test]
fn test_group_count_must_match_levels() {
    let spec = DesignSpec::new(
        Some(Factor::new("group", &["a", "b", "c"])),
        None,
        vec![
            GroupSpec::new(10, vec![CellSpec::new(0.0, 1.0)], vec![]),
            GroupSpec::new(10, vec![CellSpec::new(0.0, 1.0)], vec![]),
        ],
    );
    assert!(spec.validate().is_err());
}

#[test]
fn test_cells_enumeration_order() {
    let mixed = DesignSpec::mixed(
        Factor::new("group", &["g1", "g2"]),
        Factor::new("cond", &["c1", "c2"]),
        vec![
            GroupSpec::new(
                5,
                vec![CellSpec::new(1.0, 1.0), CellSpec::new(2.0, 1.0)],
                vec![0.3],
            ),
            GroupSpec::new(
                5,
                vec![CellSpec::new(3.0, 1.0), CellSpec::new(4.0, 1.0)],
                vec![0.3],
            ),
        ],
    );

    let cells = mixed.cells();
    assert_eq!(cells.len(), 4);
    // グループ→条件の宣言順
    assert_eq!(cells[0].group, Some("g1"));
    assert_eq!(cells[0].condition, Some("c1"));
    assert_eq!(cells[1].condition, Some("c2"));
    assert_eq!(cells[2].group, Some("g2"));
    assert_eq!(cells[3].spec.mean, 4.0);
}

#[test]
fn test_json_round_trip() {
    let spec = DesignSpec::within(
        "time",
        20,
        &[("pre", 10.0, 2.0), ("post", 12.0, 2.0)],
        &[0.5],
    )
    .with_id_prefix("subj");

    let json = spec.to_json_string().unwrap();
    let restored = DesignSpec::from_json_str(&json).unwrap();
    assert_eq!(spec, restored);

    // 壊れたJSONはエラー
    assert!(DesignSpec::from_json_str("{not json").is_err());
}
