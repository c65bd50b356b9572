//! Integration test: load curve sets from files and build them.

use std::io::Write;
use std::path::PathBuf;

use approx::assert_relative_eq;
use pillar_config::prelude::*;
use pillar_core::{CoreError, Date};
use pillar_curves::bootstrap::NodeResolution;
use pillar_curves::traits::{DiscountFactors, ReadableCurve};
use pillar_curves::CurveError;
use pillar_math::interpolation::InterpolationMethod;
use pillar_math::MathError;

fn data(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file)
}

fn usd() -> CurveSetConfig {
    CurveSetConfig::load(data("usd_curves.toml")).unwrap()
}

#[test]
fn test_load_toml() {
    let set = usd();
    assert!(set.is_valid(), "{:?}", set.validate());
    assert_eq!(set.curves.len(), 4);

    let ois = set.curve("OIS").unwrap();
    assert_eq!(ois.kind, CurveKind::Discount);
    assert_eq!(ois.instruments.len(), 7);
    assert_eq!(ois.base_date, Date::from_ymd(2025, 1, 2).unwrap());

    let vol = set.curve("CAPVOL").unwrap();
    assert_eq!(vol.solver.max_iterations, 200);
    assert_eq!(vol.solver.step, Some(0.05));
    assert_eq!(vol.discount_curve.as_deref(), Some("OIS"));
}

#[test]
fn test_build_levels() {
    let set = usd();
    let levels: Vec<Vec<&str>> = set
        .build_levels()
        .unwrap()
        .into_iter()
        .map(|level| level.into_iter().map(|c| c.name.as_str()).collect())
        .collect();
    assert_eq!(levels, vec![vec!["OIS", "SOFR-ZERO"], vec!["ISSUER", "CAPVOL"]]);
}

#[test]
fn test_build_reprices_every_curve() {
    let built = usd().build().unwrap();
    assert_eq!(built.names(), vec!["OIS", "SOFR-ZERO", "ISSUER", "CAPVOL"]);

    for curve in built.iter() {
        assert!(
            curve.report.max_abs_error() < 1e-10,
            "{} error {}",
            curve.name,
            curve.report.max_abs_error()
        );
    }

    let ois = built.get("OIS").unwrap();
    assert_eq!(ois.curve.node_count(), 8);
    assert_eq!(
        ois.report.node("DEP-3M").unwrap().resolution,
        NodeResolution::InitialGuess
    );
    let two_years = Date::from_ymd(2027, 1, 2).unwrap();
    let df = ois.curve.discount_factor(two_years).unwrap();
    assert!(df > 0.98 && df < 1.0);

    let capvol = built.get("CAPVOL").unwrap();
    assert_eq!(capvol.report.nodes.len(), 3);
    assert_eq!(capvol.kind, CurveKind::Volatility);
}

#[test]
fn test_spread_curve_adds_base() {
    let built = usd().build().unwrap();
    let issuer = built.get("ISSUER").unwrap();
    let base = built.get("SOFR-ZERO").unwrap();

    assert!(issuer.curve.base_curve().is_some());
    let one_year = Date::from_ymd(2026, 1, 2).unwrap();
    let total = issuer.curve.value(one_year).unwrap();
    assert_relative_eq!(total, 0.039, epsilon = 1e-11);
    assert!(total > base.curve.value(one_year).unwrap());
}

#[test]
fn test_json_round_trip_through_file() {
    let set = usd();
    let json = set.to_json_string().unwrap();

    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let loaded = CurveSetConfig::load(file.path()).unwrap();
    assert_eq!(loaded, set);
}

#[test]
fn test_invalid_file_reports_every_error() {
    let toml = r#"
        [[curves]]
        name = "OIS"
        base_date = "2025-01-02"
        solver = { tolerance = -1.0 }

        [[curves]]
        name = "VOL"
        kind = "volatility"
        base_date = "2025-01-02"
        discount_curve = "MISSING"

        [[curves.instruments]]
        type = "cap"
        tenor = "2Y"
        strike = 0.01
        vol = 0.0
    "#;
    let set = CurveSetConfig::from_toml_str(toml).unwrap();
    let fields: Vec<String> = set.validate().into_iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        vec![
            "curves[0].solver.tolerance",
            "curves[0].instruments",
            "curves[1].instruments[0].vol",
            "curves[1].discount_curve",
        ]
    );
    assert!(matches!(
        set.build(),
        Err(ConfigError::MultipleValidationErrors(ref errors)) if errors.len() == 4
    ));
}

#[test]
fn test_parse_errors() {
    let err = CurveSetConfig::from_toml_str("[[curves]]\nname = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Deserialization(_)));

    let toml = r#"
        [[curves]]
        name = "OIS"
        base_date = "2025-01-02"
        interpolation = "CubicSpline"
    "#;
    assert!(CurveSetConfig::from_toml_str(toml).is_err());
}

#[test]
fn test_unbracketed_quote_fails_build() {
    let mut set = usd();
    let ois = set.curves.iter_mut().find(|c| c.name == "OIS").unwrap();
    ois.instruments.push(InstrumentConfig::swap("30Y".parse().unwrap(), -0.9));

    match set.build() {
        Err(ConfigError::Curve(CurveError::NodeFailure { instrument, source, .. })) => {
            assert_eq!(instrument, "SWP-30Y");
            assert!(matches!(
                *source,
                CurveError::Math(MathError::NoBracket { .. })
            ));
        }
        other => panic!("expected node failure, got {other:?}"),
    }
}

#[test]
fn test_linear_rate_discount_curve() {
    let toml = r#"
        [[curves]]
        name = "OIS"
        base_date = "2025-01-02"
        interpolation = "LinearRateInterpolation"

        [[curves.instruments]]
        type = "deposit"
        tenor = "6M"
        rate = 0.03

        [[curves.instruments]]
        type = "swap"
        tenor = "2Y"
        rate = 0.035
    "#;
    let set = CurveSetConfig::from_toml_str(toml).unwrap();
    assert_eq!(
        set.curve("OIS").unwrap().interpolation_method(),
        InterpolationMethod::LinearRate
    );
    let linear_rate = set.build().unwrap();
    let ois = linear_rate.get("OIS").unwrap();
    assert!(ois.report.max_abs_error() < 1e-10);

    let mut log_linear = set.clone();
    log_linear.curves[0].interpolation = Some(InterpolationMethod::LogLinear);
    let log_linear = log_linear.build().unwrap();

    let one_year = Date::from_ymd(2026, 1, 2).unwrap();
    let a = ois.curve.discount_factor(one_year).unwrap();
    let b = log_linear.get("OIS").unwrap().curve.discount_factor(one_year).unwrap();
    assert!((a - b).abs() > 1e-7, "{a} vs {b}");
}

#[test]
fn test_huge_tenor_fails_build() {
    let mut set = usd();
    let ois = set.curves.iter_mut().find(|c| c.name == "OIS").unwrap();
    ois.instruments.push(InstrumentConfig::deposit("2000000000D".parse().unwrap(), 0.03));

    assert!(matches!(
        set.build(),
        Err(ConfigError::Curve(CurveError::Core(CoreError::InvalidDate { .. })))
    ));
}
