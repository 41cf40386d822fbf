use rand::rngs::StdRng;
use rand::SeedableRng;
use simrs::io::{read_csv, write_csv};
use simrs::sim::{sim_design, SimOptions};
use simrs::{CellSpec, DesignSpec, Factor, GroupSpec};

// CSVファイル操作のテスト（一時ディレクトリを利用）

#[test]
fn test_csv_round_trip_full_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.csv");

    let spec = DesignSpec::mixed(
        Factor::new("group", &["control", "treatment"]),
        Factor::new("phase", &["pre", "post"]),
        vec![
            GroupSpec::new(
                10,
                vec![CellSpec::new(10.0, 2.0), CellSpec::new(11.0, 2.0)],
                vec![0.5],
            ),
            GroupSpec::new(
                10,
                vec![CellSpec::new(10.0, 2.0), CellSpec::new(13.0, 2.0)],
                vec![0.5],
            ),
        ],
    );
    let mut rng = StdRng::seed_from_u64(4);
    let data = sim_design(&spec, &SimOptions::default(), &mut rng).unwrap();

    write_csv(&data, &path).unwrap();
    let restored = read_csv(&path).unwrap();

    // 行数・列構成・値まで完全に一致する
    assert_eq!(data, restored);
}

#[test]
fn test_csv_round_trip_minimal_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one_sample.csv");

    let spec = DesignSpec::one_sample(25, 2.0, 1.0);
    let mut rng = StdRng::seed_from_u64(17);
    let data = sim_design(&spec, &SimOptions::default(), &mut rng).unwrap();

    write_csv(&data, &path).unwrap();

    // ヘッダーは id,value の2列のみ
    let contents = std::fs::read_to_string(&path).unwrap();
    let header = contents.lines().next().unwrap();
    assert_eq!(header, "id,value");

    let restored = read_csv(&path).unwrap();
    assert_eq!(data, restored);
    assert!(!restored.has_group());
    assert!(!restored.has_condition());
}

#[test]
fn test_read_csv_with_external_header_order() {
    // 列の並びが異なっていてもヘッダー名で解決される
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("external.csv");
    std::fs::write(
        &path,
        "condition,value,id\npre,1.5,s01\npost,2.5,s01\npre,0.5,s02\npost,1.0,s02\n",
    )
    .unwrap();

    let data = read_csv(&path).unwrap();
    assert_eq!(data.len(), 4);
    assert!(data.has_condition());
    assert!(!data.has_group());
    assert_eq!(data.condition_levels(), vec!["pre", "post"]);
    assert_eq!(data.cell_values(None, Some("post")), vec![2.5, 1.0]);
}

#[test]
fn test_read_csv_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    std::fs::write(&path, "id,score\ns01,1.5\n").unwrap();

    // value列が無いのでエラー
    assert!(read_csv(&path).is_err());
}

#[test]
fn test_read_csv_unparsable_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbled.csv");
    std::fs::write(&path, "id,value\ns01,abc\n").unwrap();

    assert!(read_csv(&path).is_err());
}

#[test]
fn test_read_csv_missing_file() {
    assert!(read_csv("no_such_directory/no_such_file.csv").is_err());
}
