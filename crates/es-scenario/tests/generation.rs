use es_core::seasonality::SeasonalityMode;
use es_scenario::{
    ScenarioError, Substitutions, SweepGrid, TemplateSource, generate_scenarios, read_checkpoint,
    write_checkpoint,
};

const TEMPLATE: &str = "<scenario popSize=\"@pop_size@\">\n\
    <eir>@eir@</eir>\n\
    <seed>@seed@</seed>\n\
    <seasonality>@seasonality1@ @seasonality2@ @seasonality3@ @seasonality4@ \
@seasonality5@ @seasonality6@ @seasonality7@ @seasonality8@ @seasonality9@ \
@seasonality10@ @seasonality11@ @seasonality12@</seasonality>\n\
</scenario>\n";

fn fixed() -> Substitutions {
    let mut subs = Substitutions::new();
    subs.set("pop_size", 2000);
    subs
}

fn grid(modes: Vec<SeasonalityMode>) -> SweepGrid {
    SweepGrid {
        templates: vec![TemplateSource {
            name: "R0000GA".to_string(),
            text: TEMPLATE.to_string(),
        }],
        eirs: vec![1.0, 10.0],
        seeds: 2,
        modes,
    }
}

#[test]
fn generates_one_file_per_grid_point_with_dense_ids() {
    let dir = tempfile::tempdir().unwrap();
    let specs =
        generate_scenarios(&grid(vec![SeasonalityMode::Perennial]), &fixed(), dir.path()).unwrap();

    assert_eq!(specs.len(), 4);
    for (i, spec) in specs.iter().enumerate() {
        assert_eq!(spec.id as usize, i);
        assert!(dir.path().join(spec.input_file_name()).exists());
    }
}

#[test]
fn perennial_inputs_have_no_leftover_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let specs =
        generate_scenarios(&grid(vec![SeasonalityMode::Perennial]), &fixed(), dir.path()).unwrap();

    for spec in &specs {
        let content = std::fs::read_to_string(dir.path().join(spec.input_file_name())).unwrap();
        assert!(
            !content.contains('@'),
            "scenario {} still contains a token: {content}",
            spec.id
        );
        assert!(content.contains(&format!("<eir>{}</eir>", spec.eir)));
        assert!(content.contains(&format!("<seed>{}</seed>", spec.seed)));
        // perennial: twelve unit multipliers
        assert!(content.contains("<seasonality>1 1 1 1 1 1 1 1 1 1 1 1</seasonality>"));
    }
}

#[test]
fn seasonal_inputs_substitute_the_monthly_profile() {
    let dir = tempfile::tempdir().unwrap();
    let specs =
        generate_scenarios(&grid(vec![SeasonalityMode::Seasonal]), &fixed(), dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join(specs[0].input_file_name())).unwrap();
    assert!(!content.contains('@'));
    // the peak month renders as exactly 1
    assert!(content.contains(" 1 ") || content.contains(">1 ") || content.contains(" 1<"));
}

#[test]
fn template_missing_a_declared_token_fails_generation() {
    let dir = tempfile::tempdir().unwrap();
    let mut g = grid(vec![SeasonalityMode::Perennial]);
    g.templates[0].text = "<eir>@eir@</eir>".to_string();

    let err = generate_scenarios(&g, &Substitutions::new(), dir.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::Template { .. }), "{err}");
}

#[test]
fn template_with_undeclared_token_fails_generation() {
    let dir = tempfile::tempdir().unwrap();
    let mut g = grid(vec![SeasonalityMode::Perennial]);
    g.templates[0].text.push_str("<extra>@undeclared@</extra>");

    let err = generate_scenarios(&g, &fixed(), dir.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::Template { .. }), "{err}");
}

#[test]
fn checkpoint_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let mut g = grid(SeasonalityMode::ALL.to_vec());
    g.eirs = vec![0.25, 1.0, 16.5, 1000.0];
    let specs = generate_scenarios(&g, &fixed(), dir.path()).unwrap();

    let path = dir.path().join("scenarios.csv");
    write_checkpoint(&path, &specs).unwrap();
    let loaded = read_checkpoint(&path).unwrap();

    assert_eq!(specs, loaded);
}

#[test]
fn checkpoint_with_non_dense_ids_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let specs =
        generate_scenarios(&grid(vec![SeasonalityMode::Perennial]), &fixed(), dir.path()).unwrap();

    let path = dir.path().join("scenarios.csv");
    let mut holey = specs.clone();
    holey.remove(1);
    write_checkpoint(&path, &holey).unwrap();

    let err = read_checkpoint(&path).unwrap_err();
    assert!(matches!(err, ScenarioError::CorruptCheckpoint { .. }), "{err}");
}
