use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use mirna_net::config::{CentralityMeasure, Config, MergePolicy, PredictionLayout};
use mirna_net::{run, NetError};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).expect("create input");
    write!(f, "{content}").expect("write input");
    path
}

fn config(dir: &Path, de: &str, predictions: &str) -> Config {
    Config {
        de_path: write(dir, "de.csv", de),
        predictions_path: write(dir, "predictions.csv", predictions),
        output_dir: dir.join("out"),
        ..Config::default()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

fn data_lines(path: &Path) -> Vec<String> {
    read(path).lines().skip(1).map(str::to_string).collect()
}

#[test]
fn scenario_threshold_keeps_single_edge() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA,log2FoldChange\nmiR-21,1.4\n",
        "miRNA,target,score\nmiR-21,GENE1,0.9\nmiR-21,GENE2,0.4\nmiR-33,GENE1,0.8\n",
    );
    cfg.filter.min_score = Some(0.5);

    let report = run(&cfg).unwrap();
    let net = &report.networks[0];
    assert_eq!(net.metrics.summary.node_count, 2);
    assert_eq!(net.metrics.summary.edge_count, 1);
    assert_eq!(net.metrics.summary.density, 1.0);

    let out = dir.path().join("out");
    assert_eq!(
        read(&out.join("edges.csv")),
        "source,target,score,tool_count\nmiR-21,GENE1,0.9,1\n"
    );
    let nodes = data_lines(&out.join("nodes.csv"));
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].starts_with("miR-21,miRNA,up,1,1.0,0.0,0,0,,#"));
    assert_eq!(nodes[1], "GENE1,gene,,1,1.0,0.0,0,1,1,#BDBDBD");
    assert_eq!(
        data_lines(&out.join("summary.csv")),
        vec!["all,2,1,1,1,1.0,1,betweenness"]
    );
}

#[test]
fn scenario_duplicates_merge_into_one_edge() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA\nmiR-21\n",
        "miRNA,target,score,tool\nmiR-21,GENE1,0.6,miRDB\nmiR-21,GENE1,0.9,TargetScan\n",
    );
    run(&cfg).unwrap();
    assert_eq!(
        data_lines(&dir.path().join("out/edges.csv")),
        vec!["miR-21,GENE1,1.5,2"]
    );

    cfg.filter.merge_policy = MergePolicy::Max;
    run(&cfg).unwrap();
    assert_eq!(
        data_lines(&dir.path().join("out/edges.csv")),
        vec!["miR-21,GENE1,0.9,2"]
    );
}

#[test]
fn scenario_unreferenced_target_is_absent() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "miRNA\nmiR-21\n",
        "miRNA,target,score\nmiR-21,GENE1,0.9\nmiR-33,GENE9,0.8\n",
    );
    run(&cfg).unwrap();
    let nodes = read(&dir.path().join("out/nodes.csv"));
    assert!(!nodes.contains("GENE9"));
    assert!(!nodes.contains("miR-33"));
}

#[test]
fn no_match_yields_empty_valid_tables() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "miRNA\nmiR-1\n",
        "miRNA,target,score\nmiR-2,GENE1,0.9\n",
    );
    let report = run(&cfg).unwrap();
    assert!(report.networks[0].edges.is_empty());

    let out = dir.path().join("out");
    assert!(data_lines(&out.join("edges.csv")).is_empty());
    assert!(data_lines(&out.join("nodes.csv")).is_empty());
    assert_eq!(
        data_lines(&out.join("summary.csv")),
        vec!["all,0,0,0,0,NaN,0,betweenness"]
    );
}

#[test]
fn empty_prediction_table_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "miRNA\nmiR-1\n", "miRNA,target,score\n");
    let report = run(&cfg).unwrap();
    assert_eq!(report.networks[0].metrics.summary.node_count, 0);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA,log2FoldChange\nmiR-b,1\nmiR-a,-1\nmiR-c,2\n",
        "miRNA,target,score,tool\n\
         miR-c,Z,0.1,t1\nmiR-a,Y,0.3,t1\nmiR-b,Y,0.7,t2\nmiR-a,X,0.2,t1\n\
         miR-b,X,0.4,t1\nmiR-c,Y,0.6,t3\nmiR-a,X,0.5,t2\n",
    );
    cfg.metrics.centrality = CentralityMeasure::Eigenvector;

    let first = run(&cfg).unwrap();
    let snapshot: Vec<String> = first.written.iter().map(|p| read(p)).collect();
    let second = run(&cfg).unwrap();
    let again: Vec<String> = second.written.iter().map(|p| read(p)).collect();
    assert_eq!(first.written, second.written);
    assert_eq!(snapshot, again);
}

#[test]
fn nodes_and_edges_reference_the_same_ids_and_degrees_match() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "miRNA\nmiR-1\nmiR-2\nmiR-3\n",
        "miRNA,target,score\nmiR-1,A,1\nmiR-1,B,1\nmiR-2,A,1\nmiR-3,C,1\nmiR-3,A,1\n",
    );
    run(&cfg).unwrap();
    let out = dir.path().join("out");

    let mut edge_ids = BTreeSet::new();
    let edges: Vec<(String, String)> = data_lines(&out.join("edges.csv"))
        .iter()
        .map(|l| {
            let f: Vec<&str> = l.split(',').collect();
            (f[0].to_string(), f[1].to_string())
        })
        .collect();
    for (s, t) in &edges {
        edge_ids.insert(s.clone());
        edge_ids.insert(t.clone());
    }

    let mut node_ids = BTreeSet::new();
    for line in data_lines(&out.join("nodes.csv")) {
        let f: Vec<&str> = line.split(',').collect();
        let (id, side, degree) = (f[0], f[1], f[3].parse::<usize>().unwrap());
        let direct = edges
            .iter()
            .filter(|(s, t)| if side == "miRNA" { s == id } else { t == id })
            .count();
        assert_eq!(degree, direct, "{id}");
        node_ids.insert(id.to_string());
    }
    assert_eq!(node_ids, edge_ids);
}

#[test]
fn wide_lists_reproduce_shared_target_rings() {
    let dir = tempfile::tempdir().unwrap();
    let de = write(
        dir.path(),
        "de.csv",
        "miRNA,log2FoldChange\nmiR-1,1\nmiR-2,1\nmiR-3,1\nmiR-4,1\n",
    );
    let lists = write(
        dir.path(),
        "lists.csv",
        "miR-1,miR-2,miR-3,miR-4\nG4,G4,G4,G4\nG3,G3,G3,\nG2,G2,,\nONLY1,,,\n",
    );
    let mut cfg = Config {
        de_path: de,
        predictions_path: lists,
        output_dir: dir.path().join("out"),
        ..Config::default()
    };
    cfg.prediction_schema.layout = PredictionLayout::Wide;
    cfg.filter.min_shared = 2;

    let report = run(&cfg).unwrap();
    let targets: Vec<(String, &str)> = report.networks[0]
        .metrics
        .nodes
        .iter()
        .filter(|n| n.side == mirna_net::data::model::Side::Target)
        .map(|n| (n.id.clone(), n.category))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("G2".to_string(), "2"),
            ("G3".to_string(), "3"),
            ("G4".to_string(), "4+"),
        ]
    );
}

#[test]
fn split_regulation_writes_up_and_down_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA,log2FoldChange\nmiR-u,1.0\nmiR-d,-1.0\n",
        "miRNA,target,score\nmiR-u,A,1\nmiR-d,B,1\n",
    );
    cfg.split_regulation = true;

    let report = run(&cfg).unwrap();
    let labels: Vec<&str> = report.networks.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["up", "down"]);

    let out = dir.path().join("out");
    assert_eq!(data_lines(&out.join("up_edges.csv")), vec!["miR-u,A,1.0,1"]);
    assert_eq!(data_lines(&out.join("down_edges.csv")), vec!["miR-d,B,1.0,1"]);
    assert_eq!(data_lines(&out.join("summary.csv")).len(), 2);
}

#[test]
fn split_run_leaves_no_tables_behind_for_a_later_single_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA,log2FoldChange\nmiR-u,1.0\nmiR-d,-1.0\n",
        "miRNA,target,score\nmiR-u,A,1\nmiR-d,B,1\n",
    );
    cfg.split_regulation = true;
    run(&cfg).unwrap();
    let out = dir.path().join("out");
    assert!(out.join("up_edges.csv").exists());

    let notes = write(&out, "notes.txt", "kept");
    cfg.split_regulation = false;
    let report = run(&cfg).unwrap();

    let mut names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["edges.csv", "nodes.csv", "notes.txt", "summary.csv"]);
    assert_eq!(report.written.len(), 3);
    assert_eq!(read(&notes), "kept");
}

#[test]
fn unknown_regulation_edges_are_left_out_of_split_networks() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "miRNA,log2FoldChange\nmiR-u,1.0\nmiR-x,\n",
        "miRNA,target,score\nmiR-u,A,1\nmiR-x,B,1\n",
    );
    cfg.split_regulation = true;
    let report = run(&cfg).unwrap();
    let edges: usize = report.networks.iter().map(|n| n.edges.len()).sum();
    assert_eq!(edges, 1);
    assert!(!read(&dir.path().join("out/up_nodes.csv")).contains("miR-x"));
}

#[test]
fn rows_without_a_tool_are_counted_once() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "miRNA\nmiR-21\n",
        "miRNA,target,score,tool\nmiR-21,GENE1,0.9,TargetScan\nmiR-21,GENE2,0.5,\n",
    );
    run(&cfg).unwrap();
    assert_eq!(
        data_lines(&dir.path().join("out/edges.csv")),
        vec!["miR-21,GENE1,0.9,1", "miR-21,GENE2,0.5,1"]
    );
}

#[test]
fn infinite_score_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "miRNA\nmiR-21\n", "miRNA,target,score\nmiR-21,A,inf\n");
    let err = run(&cfg).unwrap_err();
    assert!(matches!(err, NetError::InvalidValue { row: 1, ref column, .. } if column == "score"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_column_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), "miRNA\nmiR-21\n", "miRNA,gene,score\nmiR-21,A,1\n");
    let err = run(&cfg).unwrap_err();
    assert!(matches!(err, NetError::MissingColumn { ref column, .. } if column == "target"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_file_fails_with_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "miRNA\nmiR-21\n", "miRNA,target,score\n");
    cfg.predictions_path = dir.path().join("absent.csv");
    assert!(matches!(run(&cfg).unwrap_err(), NetError::MissingInput { .. }));
}

#[test]
fn mirna_listed_as_target_is_an_invariant_violation() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(
        dir.path(),
        "miRNA\nmiR-21\nmiR-155\n",
        "miRNA,target,score\nmiR-21,PTEN,1\nmiR-21,miR-155,1\n",
    );
    let err = run(&cfg).unwrap_err();
    assert!(matches!(err, NetError::InvariantViolation { row: 2, .. }));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn tab_output_uses_tsv_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path(), "miRNA\nmiR-21\n", "miRNA,target,score\nmiR-21,A,1\n");
    cfg.output_delimiter = '\t';
    run(&cfg).unwrap();
    assert_eq!(
        read(&dir.path().join("out/edges.tsv")),
        "source\ttarget\tscore\ttool_count\nmiR-21\tA\t1.0\t1\n"
    );
}
