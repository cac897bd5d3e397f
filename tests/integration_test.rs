use southern_pine_sim::{
    config::SpeciesLibrary,
    error::SimError,
    growth::{HdModel, HeightDiameterModel},
    models::Species,
    stand::Stand,
};

fn planted_loblolly(tpa: u32) -> Stand {
    Stand::initialize_planted(tpa, 70.0, "LP", &SpeciesLibrary::builtin()).unwrap()
}

#[test]
fn test_fifty_year_projection_shape() {
    let mut stand = planted_loblolly(500);
    stand.grow(50).unwrap();

    let history = stand.metrics_history();
    assert_eq!(history.len(), 11);
    assert_eq!(history[0].age, 0);
    assert_eq!(history[10].age, 50);

    // Stem count only ever falls; diameter only ever climbs.
    for pair in history.windows(2) {
        assert!(pair[1].tpa <= pair[0].tpa);
        assert!(pair[1].mean_dbh > pair[0].mean_dbh);
        assert!(pair[1].top_height >= pair[0].top_height);
    }

    let last = history[10];
    assert!(last.tpa > 100.0, "tpa collapsed to {}", last.tpa);
    assert!(last.tpa < 500.0, "no mortality over 50 years");
    assert!(last.qmd > 8.0, "qmd stalled at {}", last.qmd);
}

#[test]
fn test_age_twenty_five_benchmarks() {
    // A loblolly plantation at 500 TPA on a site-70 tract should land in
    // the published neighborhood at age 25.
    let mut stand = planted_loblolly(500);
    stand.grow(25).unwrap();
    let m = stand.get_metrics();

    assert!(
        (100.0..=185.0).contains(&m.basal_area),
        "basal area {} sq ft",
        m.basal_area
    );
    assert!((7.0..=13.0).contains(&m.qmd), "qmd {} in", m.qmd);
    assert!(
        (55.0..=85.0).contains(&m.top_height),
        "top height {} ft",
        m.top_height
    );
    assert!(
        (1500.0..=7000.0).contains(&m.volume),
        "volume {} cu ft",
        m.volume
    );
}

#[test]
fn test_better_site_grows_bigger_trees() {
    let library = SpeciesLibrary::builtin();
    let mut poor = Stand::initialize_planted(400, 55.0, "LP", &library).unwrap();
    let mut good = Stand::initialize_planted(400, 85.0, "LP", &library).unwrap();
    poor.grow(25).unwrap();
    good.grow(25).unwrap();

    assert!(good.get_metrics().qmd > poor.get_metrics().qmd);
    assert!(good.get_metrics().top_height > poor.get_metrics().top_height);
}

#[test]
fn test_denser_planting_smaller_diameters() {
    let library = SpeciesLibrary::builtin();
    let mut sparse = Stand::initialize_planted(300, 70.0, "LP", &library).unwrap();
    let mut dense = Stand::initialize_planted(900, 70.0, "LP", &library).unwrap();
    sparse.grow(30).unwrap();
    dense.grow(30).unwrap();

    assert!(sparse.get_metrics().qmd > dense.get_metrics().qmd);
    // Density costs diameter, not stocking: the dense stand still carries
    // more stems at 30.
    assert!(dense.get_metrics().tpa > sparse.get_metrics().tpa);
}

#[test]
fn test_loblolly_outgrows_longleaf() {
    let library = SpeciesLibrary::builtin();
    let mut loblolly = Stand::initialize_planted(500, 70.0, "LP", &library).unwrap();
    let mut longleaf = Stand::initialize_planted(500, 70.0, "LL", &library).unwrap();
    loblolly.grow(30).unwrap();
    longleaf.grow(30).unwrap();

    assert!(loblolly.get_metrics().qmd > longleaf.get_metrics().qmd);
    assert!(loblolly.get_metrics().top_height > longleaf.get_metrics().top_height);
}

#[test]
fn test_dead_trees_stay_on_the_tree_list() {
    let mut stand = planted_loblolly(500);
    stand.grow(30).unwrap();

    assert_eq!(stand.trees().len(), 500);
    let dead = stand.trees().iter().filter(|t| !t.is_live()).count();
    assert!(dead > 0);
    assert_eq!(stand.live_count(), 500 - dead);

    // Dead stems are frozen, live stems have grown past planting size.
    for tree in stand.trees() {
        if tree.is_live() {
            assert!(tree.dbh > 0.6);
            assert_eq!(tree.age, 30);
        }
    }
}

#[test]
fn test_grown_trees_track_the_height_curve() {
    let mut stand = planted_loblolly(400);
    stand.grow(25).unwrap();

    let model = HeightDiameterModel::new(stand.species(), stand.config());
    for tree in stand.trees().iter().filter(|t| t.is_live()) {
        let on_curve = model.predict_height(tree.dbh, HdModel::CurtisArney);
        let deviation = (tree.height - on_curve).abs() / on_curve;
        assert!(
            deviation < 0.25,
            "dbh {:.1} height {:.1} vs curve {:.1}",
            tree.dbh,
            tree.height,
            on_curve
        );
    }
}

#[test]
fn test_annual_cycle_projection() {
    let mut stand = planted_loblolly(300).with_time_step(1).unwrap();
    stand.grow(10).unwrap();
    assert_eq!(stand.age(), 10);
    assert_eq!(stand.metrics_history().len(), 11);
    assert!(stand.get_metrics().qmd > 2.0);
}

#[test]
fn test_projection_length_must_fit_the_cycle() {
    let mut stand = planted_loblolly(100);
    let err = stand.grow(12).unwrap_err();
    assert!(matches!(err, SimError::Validation(_)));
    // Nothing moved.
    assert_eq!(stand.age(), 0);
    assert_eq!(stand.live_count(), 100);
}

#[test]
fn test_all_species_complete_a_rotation() {
    let library = SpeciesLibrary::builtin();
    for species in Species::ALL {
        let mut stand =
            Stand::initialize_planted(400, 65.0, species.code(), &library).unwrap();
        stand.grow(40).unwrap();
        let m = stand.get_metrics();
        assert!(m.tpa > 0.0, "{species}: stand died out");
        assert!(m.qmd > 5.0, "{species}: qmd {}", m.qmd);
        assert!(m.volume > 500.0, "{species}: volume {}", m.volume);
    }
}
