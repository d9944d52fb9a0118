use approx::assert_relative_eq;

use neo_deflect::config::{ActionConfig, EngineSettings, load_catalog, load_plan, load_settings};
use neo_deflect::deflection::{ThrustDirection, from_config, target_mass_kg};
use neo_deflect::epoch::parse_epoch;
use neo_deflect::export::{positions::write_point_cloud, writer_for_path};
use neo_deflect::kernel::vector::norm;
use neo_deflect::mitigation::{DeflectionCampaign, miss_distance_km};
use neo_deflect::orbits::{AnomalyModel, ErrorKind, Planet};
use neo_deflect::propulsion::DeflectionAction;
use neo_deflect::uncertainty::ElementLabel;
use neo_deflect::{
    Body, CovarianceModel, DeflectionSession, KeplerSolver, apply_deflection, coordinates,
    evaluate_mitigation, sample_uncertainty_cloud,
};

const CATALOG: &str = "data/catalog.yaml";

#[test]
fn bundled_data_loads() {
    let catalog = load_catalog(CATALOG).expect("catalog");
    assert!(catalog.find("apophis").is_some());
    assert!(catalog.find("2024 yr4").is_some());
    let settings = load_settings("data/settings.toml").expect("settings");
    assert_eq!(settings.uncertainty.seed, Some(20_290_413));
    let plan = load_plan("data/plans/apophis.yaml").expect("plan");
    assert_eq!(plan.len(), 3);
}

#[test]
fn facade_coordinates_match_body_dispatch() {
    let catalog = load_catalog(CATALOG).unwrap();
    let elements = catalog.find("bennu").unwrap().elements();
    let d = 10_000.0;
    let via_root = coordinates(&elements, d).unwrap();
    let via_body = Body::from_elements(&elements).coordinates(d).unwrap();
    assert_eq!(via_root, via_body);
    let r = norm(&via_root);
    assert!(r > elements.perihelion_distance() - 1e-9 && r < elements.aphelion_distance() + 1e-9);

    let earth = Planet::Earth.body().coordinates(0.0).unwrap();
    assert_relative_eq!(norm(&earth), 0.9833, epsilon = 2e-3);
}

#[test]
fn plan_shifts_apophis_encounter_and_scores_it() {
    let catalog = load_catalog(CATALOG).unwrap();
    let record = catalog.find("Apophis").unwrap();
    let settings = EngineSettings::default();
    let solver = settings.kepler.solver();
    let encounter = parse_epoch("2029-04-13 21:46").unwrap();

    let mut session = DeflectionSession::new(
        record.designation.clone(),
        record.elements(),
        settings.deflection,
    );
    let baseline = miss_distance_km(&session.body(), &Body::EarthAnalytic, &solver, encounter)
        .unwrap();
    let mut campaign = DeflectionCampaign::new(baseline).unwrap();

    let mass = target_mass_kg(record);
    for entry in load_plan("data/plans/apophis.yaml").unwrap() {
        let action = from_config(&entry, mass, &settings.deflection).unwrap();
        session.apply(&action).unwrap();
        let miss =
            miss_distance_km(&session.body(), &Body::EarthAnalytic, &solver, encounter).unwrap();
        campaign.record_attempt(miss);
    }
    assert_eq!(session.attempts(), 3);
    assert_ne!(session.current_elements(), session.catalog_elements());

    let result = evaluate_mitigation(baseline, campaign.last_miss_km());
    assert!((0.0..=100.0).contains(&result.score));
    assert_relative_eq!(
        result.improvement_km,
        campaign.last_miss_km() - baseline,
        epsilon = 1e-9
    );
    assert_eq!(campaign.finish(campaign.last_miss_km()).attempts, 3);

    session.reset();
    assert_eq!(session.current_elements(), session.catalog_elements());
}

#[test]
fn zero_actions_are_identities() {
    let catalog = load_catalog(CATALOG).unwrap();
    let elements = catalog.find("didymos").unwrap().elements();
    let settings = EngineSettings::default();

    let kick = ActionConfig::Kinetic {
        delta_v_m_s: 0.0,
        direction: ThrustDirection::Normal,
    };
    let action = from_config(&kick, 1.0, &settings.deflection).unwrap();
    let out = apply_deflection(&elements, &action, &settings.deflection).unwrap();
    assert_eq!(out.delta_v_km_s, 0.0);
    assert_relative_eq!(out.elements.a, elements.a, max_relative = 1e-10);
    assert_relative_eq!(out.elements.e, elements.e, epsilon = 1e-10);

    let tractor = ActionConfig::GravityTractor {
        spacecraft_mass_kg: 20_000.0,
        standoff_km: 0.2,
        duration_days: 0.0,
        direction: ThrustDirection::AlongVelocity,
    };
    let action = from_config(&tractor, 1.0, &settings.deflection).unwrap();
    let out = apply_deflection(&elements, &action, &settings.deflection).unwrap();
    assert_eq!(out.steps, 0);
    assert_eq!(out.delta_v_km_s, 0.0);
    assert_eq!(out.elements, elements);
}

#[test]
fn collapsed_orbit_is_a_domain_error() {
    let catalog = load_catalog(CATALOG).unwrap();
    let mut elements = catalog.find("bennu").unwrap().elements();
    elements.a = 0.0;
    let settings = EngineSettings::default();
    let action = DeflectionAction::Kinetic {
        delta_v_km_s: 1.0e-3,
        direction: ThrustDirection::AlongVelocity,
    };
    let err = apply_deflection(&elements, &action, &settings.deflection).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
}

#[test]
fn catalog_cloud_is_seeded_and_exportable() {
    let catalog = load_catalog(CATALOG).unwrap();
    let record = catalog.find("didymos").unwrap();
    let elements = record.elements();
    let covariance = CovarianceModel::from_record(
        record.covariance.as_ref().unwrap(),
        &elements,
        record.q,
    )
    .unwrap();
    let solver = KeplerSolver::precise();
    let jd = 2_461_000.5;

    let cloud = sample_uncertainty_cloud(&elements, Some(&covariance), 500, jd, 99, &solver).unwrap();
    assert_eq!(cloud.len(), 500);
    let nominal = Body::from_elements(&elements).coordinates_at_jd(&solver, jd).unwrap();
    let centroid = cloud.centroid().unwrap();
    assert!(neo_deflect::kernel::vector::distance(&centroid, &nominal) < 1e-3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cloud.csv");
    let mut writer = writer_for_path(&path).unwrap();
    write_point_cloud(&mut writer, cloud.positions()).unwrap();
    drop(writer);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, ["sample", "x_au", "y_au", "z_au"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 500);
    let x: f64 = rows[0][1].parse().unwrap();
    assert_relative_eq!(x, cloud.positions()[0][0], epsilon = 1e-11);
}

#[test]
fn bundled_covariances_carry_their_own_nominals() {
    let catalog = load_catalog(CATALOG).unwrap();
    for key in ["apophis", "didymos"] {
        let record = catalog.find(key).unwrap();
        let block = record.covariance.as_ref().unwrap();
        let given = block.nominal.as_ref().expect("catalog nominal vector");
        assert_eq!(given.len(), block.labels.len());

        let elements = record.elements();
        let model = CovarianceModel::from_record(block, &elements, record.q).unwrap();
        assert_eq!(model.nominal(), given.as_slice());
        for (label, value) in model.labels().iter().zip(model.nominal()) {
            match label.parse::<ElementLabel>() {
                Ok(element) => assert_relative_eq!(
                    *value,
                    element.nominal(&elements, record.q),
                    epsilon = 1e-4
                ),
                Err(()) => assert!(*value > 2_400_000.0, "{key} {label} = {value}"),
            }
        }
    }
}

#[test]
fn anomaly_models_agree_for_circular_orbits() {
    let catalog = load_catalog(CATALOG).unwrap();
    let mut elements = catalog.find("bennu").unwrap().elements();
    elements.e = 0.0;
    let exact = elements.to_cartesian_km(AnomalyModel::Exact).unwrap();
    let approx = elements.to_cartesian_km(AnomalyModel::MeanAsTrue).unwrap();
    for k in 0..3 {
        assert_relative_eq!(exact.position[k], approx.position[k], epsilon = 1.0);
    }
}
