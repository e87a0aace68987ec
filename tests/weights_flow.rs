//! End-to-end flow through the library: config on disk, dataset on disk,
//! ranking, customized sliders persisted and restored, precomputed re-weighting.

use std::fs;
use std::path::Path;

use placerank::config::{self, config_base_dir, Config};
use placerank::dataset;
use placerank::formulas::FormulaRegistry;
use placerank::scoring::{recalculate_rankings, Entity, ScoringEngine, WeightScope};
use placerank::weights::{
    apply_preset, load_weight_store, save_weight_store, CustomWeights, SliderSet, WeightStore,
};

const LOCALITIES: &str = r#"{
  "localities": [
    {"id": "kowdiar", "name": "Kowdiar", "data": {
      "technopark_time": 25, "city_centre_time": 8, "secretariat_time": 10, "airport_time": 20, "ksrtc_stand_time": 12,
      "hospital_count": 12, "school_count": 14, "supermarket_count": 30, "bank_count": 35, "lifestyle_count": 45,
      "police_count": 6, "fire_station_count": 2,
      "park_count": 8, "noise_score": 6, "flood_safety_score": 8,
      "job_proximity_score": 7, "commercial_count": 30, "real_estate_agency_count": 12,
      "land_price": 25
    }},
    {"id": "kazhakkoottam", "name": "Kazhakkoottam", "data": {
      "technopark_time": 3, "city_centre_time": 35, "secretariat_time": 38, "airport_time": 25, "ksrtc_stand_time": 30,
      "hospital_count": 6, "school_count": 10, "supermarket_count": 18, "bank_count": 20, "lifestyle_count": 40,
      "police_count": 3, "fire_station_count": 1,
      "park_count": 3, "noise_score": 4, "flood_safety_score": 6,
      "job_proximity_score": 10, "commercial_count": 25, "real_estate_agency_count": 15,
      "land_price": 12
    }},
    {"id": "vizhinjam", "name": "Vizhinjam", "data": {
      "technopark_time": 45, "city_centre_time": 30, "secretariat_time": 32, "airport_time": 28,
      "hospital_count": 2, "school_count": 5
    }}
  ]
}"#;

fn write_fixture(dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    config::write_config(&config_path, &Config::default()).unwrap();
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(dir.join("data/localities.json"), LOCALITIES).unwrap();
    config_path
}

#[test]
fn ranks_configured_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_fixture(dir.path());

    let config = config::load_config(Some(config_path.clone())).unwrap();
    assert!(config.validate().is_ok());
    let engine = ScoringEngine::new(config.schema()).unwrap();

    let data_path = config
        .dataset_path("localities", &config_base_dir(&config_path))
        .unwrap();
    let entities = dataset::load_entities(&data_path).unwrap();
    assert_eq!(entities.len(), 3);

    let ranked = engine.rank(&entities, "localities", None).unwrap();
    let order: Vec<&str> = ranked.iter().map(|r| r.entity.id.as_str()).collect();
    assert_eq!(order[2], "vizhinjam");
    assert!(ranked[2].breakdown.incomplete());
    assert!(!ranked[0].breakdown.incomplete());
    assert!(ranked.iter().all(|r| (0.0..=10.0).contains(&r.score)));

    // inputs untouched
    assert!(entities.iter().all(|e| e.data.len() > 1));
}

#[test]
fn default_sliders_score_like_schema_weights() {
    let config = Config::default();
    let engine = ScoringEngine::new(config.schema()).unwrap();

    for (id, domain) in &config.domains {
        let sliders = SliderSet::for_domain(domain);
        assert!(sliders.is_balanced(), "{}: {:?}", id, sliders);
        let from_sliders = CustomWeights::from_sliders(&sliders, domain.weight_scope);

        // Spread values across each metric's range; the second entity lacks one metric.
        let full = domain.metrics().enumerate().fold(Entity::new("full", "Full"), |e, (i, m)| {
            let t = (i % 4) as f64 / 4.0 + 0.1;
            e.with_metric(&m.id, m.min + t * (m.max - m.min))
        });
        let partial = domain
            .metrics()
            .skip(1)
            .fold(Entity::new("partial", "Partial"), |e, m| e.with_metric(&m.id, m.max));

        for entity in [&full, &partial] {
            let schema = engine.score_entity(entity, id, None).unwrap().overall;
            let slider = engine
                .score_entity(entity, id, Some(&from_sliders))
                .unwrap()
                .overall;
            assert!(
                (schema - slider).abs() < 1e-9,
                "{}/{}: schema {} vs sliders {}",
                id,
                entity.id,
                schema,
                slider
            );
        }
    }
}

#[test]
fn professionals_preset_favours_job_hubs() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_fixture(dir.path());
    let config = config::load_config(Some(config_path)).unwrap();
    let engine = ScoringEngine::new(config.schema()).unwrap();
    let entities = dataset::load_entities(&dir.path().join("data/localities.json")).unwrap();

    let domain = engine.domain("localities").unwrap();
    let mut sliders = SliderSet::for_domain(domain);
    let defaults = CustomWeights::from_sliders(&sliders, WeightScope::Category);
    apply_preset(&mut sliders, "localities", config.presets_for("localities"), "professionals").unwrap();
    let professionals = CustomWeights::from_sliders(&sliders, WeightScope::Category);

    let score_of = |weights: &CustomWeights, id: &str| {
        engine
            .rank(&entities, "localities", Some(weights))
            .unwrap()
            .into_iter()
            .find(|r| r.entity.id == id)
            .unwrap()
            .score
    };

    // Economy goes 15 -> 25 and Kazhakkoottam has the best job proximity.
    assert!(score_of(&professionals, "kazhakkoottam") > score_of(&defaults, "kazhakkoottam"));
}

#[test]
fn saved_sliders_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("state").join("weights.json");
    let domain_config = Config::default();
    let domain = &domain_config.domains["localities"];

    let mut sliders = SliderSet::for_domain(domain);
    sliders.auto_adjust("safety", 40).unwrap();
    assert!(sliders.is_balanced());

    let mut store = WeightStore::new();
    store.save("localities", &sliders).unwrap();
    save_weight_store(&store_path, &store).unwrap();

    let loaded = load_weight_store(&store_path).unwrap();
    let restored = loaded
        .restore("localities", &SliderSet::for_domain(domain))
        .unwrap()
        .unwrap();
    assert_eq!(restored, sliders);
    assert_eq!(restored.get("safety"), Some(40));

    let mut loaded = loaded;
    assert!(loaded.reset("localities"));
    save_weight_store(&store_path, &loaded).unwrap();
    assert!(load_weight_store(&store_path).unwrap().get("localities").is_none());
}

#[test]
fn dining_domain_scores_derived_metrics() {
    let config = Config::default();
    let engine = ScoringEngine::new(config.schema()).unwrap();
    let domain = engine.domain("restaurants").unwrap();
    let registry = FormulaRegistry::for_domain("restaurants", domain).unwrap();

    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    fs::write(
        file.path(),
        r#"[
            {"id": "a", "name": "Villa Maya", "data": {"rating": 4.7, "reviews": 1800, "price_level": 4, "convenience": 6}},
            {"id": "b", "name": "Zam Zam", "data": {"rating": 4.1, "reviews": 900, "price_level": 1, "convenience": 9}}
        ]"#,
    )
    .unwrap();
    let entities = registry.derive_all(&dataset::load_entities(file.path()).unwrap());
    assert!(entities.iter().all(|e| e.metric("sentiment").is_some()));
    assert!(entities.iter().all(|e| e.metric("vibe").is_some()));

    // Value only: the cheap place wins.
    let value_only = CustomWeights::metrics()
        .with("value", 100.0)
        .with("sentiment", 0.0)
        .with("popularity", 0.0)
        .with("rating", 0.0)
        .with("convenience", 0.0)
        .with("vibe", 0.0);
    let ranked = engine.rank(&entities, "restaurants", Some(&value_only)).unwrap();
    assert_eq!(ranked[0].entity.id, "b");

    // Sentiment on top of the schema defaults: the higher rating wins.
    let sentiment_heavy = CustomWeights::metrics().with("sentiment", 100.0);
    let ranked = engine.rank(&entities, "restaurants", Some(&sentiment_heavy)).unwrap();
    assert_eq!(ranked[0].entity.id, "a");
}

#[test]
fn recalc_reorders_precomputed_file() {
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    fs::write(
        file.path(),
        r#"{"all_rankings": [
            {"name": "Kowdiar", "overall_score": 7.0, "rank": 1, "breakdown": {"accessibility": 9.0, "economy": 4.0}},
            {"name": "Kazhakkoottam", "overall_score": 6.0, "rank": 2, "breakdown": {"accessibility": 5.0, "economy": 10.0}}
        ]}"#,
    )
    .unwrap();
    let entries = dataset::load_rankings(file.path()).unwrap();

    let economy_heavy = CustomWeights::categories()
        .with("accessibility", 0.2)
        .with("economy", 0.8);
    let recalculated = recalculate_rankings(&entries, &economy_heavy);

    assert_eq!(recalculated[0].name, "Kazhakkoottam");
    assert_eq!(recalculated[0].rank, Some(1));
    assert!((recalculated[0].overall_score - 9.0).abs() < 1e-9);
    assert_eq!(entries[0].name, "Kowdiar");
}
