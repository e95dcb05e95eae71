use relgraph::{AnalyticsError, Catalog, EngineConfig, GraphAnalytics, GraphDescription, PageRankConfig, Table};

fn small_catalog() -> Catalog {
    let catalog = Catalog::new();
    catalog
        .create_table("vertex", Table::new().with_column("id", vec![1i64, 2, 3]).unwrap())
        .unwrap();
    catalog
        .create_table(
            "edge",
            Table::new()
                .with_column("src", vec![1i64, 2])
                .unwrap()
                .with_column("dest", vec![2i64, 3])
                .unwrap()
                .with_column("weight", vec![1.5, 2.5])
                .unwrap(),
        )
        .unwrap();
    catalog
}

#[test]
fn test_results_survive_save_and_load() {
    let catalog = small_catalog();
    let graph = GraphDescription::new("vertex", "id", "edge", "").unwrap();
    {
        let analytics = GraphAnalytics::new(&catalog);
        analytics.run_sssp_into(&graph, 1, "paths").unwrap();
        analytics
            .run_pagerank_into(&graph, &PageRankConfig::default(), "ranks")
            .unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("catalog.json");
    catalog.save(&file).unwrap();

    let reloaded = Catalog::load(&file).unwrap();
    assert_eq!(
        reloaded.table_names(),
        vec!["vertex", "edge", "paths", "paths_summary", "ranks", "ranks_summary"]
    );
    let before = catalog.get("ranks").unwrap();
    let after = reloaded.get("ranks").unwrap();
    let before = before.column("pagerank").unwrap().as_floats().unwrap();
    let after = after.column("pagerank").unwrap().as_floats().unwrap();
    for (a, b) in before.iter().zip(after) {
        assert!((a.unwrap() - b.unwrap()).abs() < 1e-12);
    }

    let path = GraphAnalytics::new(&reloaded).get_path("paths", 3).unwrap();
    assert_eq!(path.path, vec![1, 2, 3]);
    assert_eq!(path.cost, 4.0);
}

#[test]
fn test_dropping_result_frees_the_name() {
    let catalog = small_catalog();
    let graph = GraphDescription::new("vertex", "id", "edge", "").unwrap();
    let analytics = GraphAnalytics::new(&catalog);

    analytics.run_sssp_into(&graph, 1, "paths").unwrap();
    // A leftover summary still blocks the name
    catalog.drop_table("paths").unwrap();
    assert!(matches!(
        analytics.run_sssp_into(&graph, 1, "paths"),
        Err(AnalyticsError::TableExists(name)) if name == "paths_summary"
    ));

    catalog.drop_table("paths_summary").unwrap();
    analytics.run_sssp_into(&graph, 2, "paths").unwrap();
    assert!(analytics.get_path("paths", 1).unwrap().path.is_empty());
}

#[test]
fn test_engine_config_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("engine.yaml");
    std::fs::write(&file, "partitions: 3\nthreads: 2\n").unwrap();

    let config = EngineConfig::from_yaml_file(&file).unwrap();
    assert_eq!(config.partitions, 3);
    assert_eq!(config.threads, Some(2));

    let catalog = small_catalog();
    let graph = GraphDescription::new("vertex", "id", "edge", "").unwrap();
    let output = GraphAnalytics::with_config(&catalog, config)
        .run_sssp(&graph, 1)
        .unwrap();
    assert_eq!(output.result.num_rows(), 3);
}

#[test]
fn test_malformed_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ not json").unwrap();

    assert!(matches!(Catalog::load(&file), Err(AnalyticsError::Serialization(_))));
    assert!(matches!(
        Catalog::load(dir.path().join("absent.json")),
        Err(AnalyticsError::Io(_))
    ));
}
