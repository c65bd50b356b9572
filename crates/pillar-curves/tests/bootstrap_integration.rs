//! Integration test: bootstrap curves end to end and check the repricing
//! and node-placement guarantees.
//!
//! Market data: money market deposits and annual par swaps as of
//! January 2, 2025.
//!
//! | Tenor | Instrument | Quote   |
//! |-------|------------|---------|
//! | 1M    | Deposit    | 0.230%  |
//! | 3M    | Deposit    | 0.270%  |
//! | 6M    | Deposit    | 0.430%  |
//! | 2Y    | Swap       | 0.650%  |
//! | 3Y    | Swap       | 0.900%  |
//! | 5Y    | Swap       | 1.350%  |
//! | 10Y   | Swap       | 2.050%  |

use std::sync::Arc;

use approx::assert_relative_eq;
use pillar_core::{DayCountConvention, Date, Frequency};
use pillar_curves::prelude::*;
use pillar_math::MathError;
use proptest::prelude::*;

fn spot() -> Date {
    Date::from_ymd(2025, 1, 2).unwrap()
}

fn deposits() -> Vec<Deposit> {
    [("1M", 0.0023), ("3M", 0.0027), ("6M", 0.0043)]
        .into_iter()
        .map(|(tenor, rate)| Deposit::from_tenor(spot(), tenor, rate).unwrap())
        .collect()
}

fn swaps() -> Vec<Swap> {
    [("2Y", 0.0065), ("3Y", 0.009), ("5Y", 0.0135), ("10Y", 0.0205)]
        .into_iter()
        .map(|(tenor, rate)| Swap::from_tenor(spot(), tenor, rate, Frequency::Annual).unwrap())
        .collect()
}

#[test]
fn test_deposits_accepted_by_first_guess() {
    let output = Bootstrapper::new(CurveDefinition::discount("USD", spot()))
        .add_instruments(deposits())
        .run()
        .unwrap();

    assert_eq!(output.curve.node_count(), 4);
    assert!(output.report.all_accepted_by_guess());
    assert_eq!(output.report.solver_iterations(), 0);

    for deposit in deposits() {
        let implied = deposit.implied_quote(&output.curve).unwrap();
        assert!(
            (implied - deposit.quote()).abs() < 1e-11,
            "{} implied {implied}",
            deposit.id()
        );
    }
}

#[test]
fn test_every_instrument_reprices_at_its_node() {
    let output = Bootstrapper::new(CurveDefinition::discount("USD", spot()))
        .add_instruments(deposits())
        .add_instruments(swaps())
        .run()
        .unwrap();

    assert_eq!(output.curve.node_count(), 8);
    // Swaps with coupon dates between nodes need the solver.
    assert!(output.report.solver_iterations() > 0);
    assert!(output.report.solver_iterations() <= 100 * 7);

    for deposit in deposits() {
        assert_relative_eq!(
            deposit.implied_quote(&output.curve).unwrap(),
            deposit.quote(),
            epsilon = 1e-10
        );
    }
    for swap in swaps() {
        assert_relative_eq!(
            swap.implied_quote(&output.curve).unwrap(),
            swap.quote(),
            epsilon = 1e-10
        );
    }

    // Each node sits exactly at its instrument's maturity.
    let dates: Vec<Date> = output.curve.nodes().iter().map(|(d, _)| *d).collect();
    let mut maturities: Vec<Date> = deposits().iter().map(PriceableInstrument::maturity).collect();
    maturities.extend(swaps().iter().map(PriceableInstrument::maturity));
    assert_eq!(dates[0], spot());
    assert_eq!(dates[1..], maturities[..]);
}

#[test]
fn test_duplicate_maturity_first_wins() {
    let first = Deposit::from_tenor(spot(), "3M", 0.0027).unwrap().with_id("FIRST");
    let second = Deposit::from_tenor(spot(), "3M", 0.0099).unwrap().with_id("SECOND");

    let output = Bootstrapper::new(CurveDefinition::discount("USD", spot()))
        .add_instrument(first.clone())
        .add_instrument(second)
        .run()
        .unwrap();

    assert_eq!(output.curve.node_count(), 2);
    assert_eq!(output.report.nodes.len(), 1);
    assert_eq!(output.report.nodes[0].instrument, "FIRST");
    assert_eq!(output.report.skipped.len(), 1);
    assert_eq!(
        output.report.skipped[0].reason,
        pillar_curves::bootstrap::SkipReason::DuplicateMaturity {
            kept: "FIRST".to_string()
        }
    );
    assert_relative_eq!(
        first.implied_quote(&output.curve).unwrap(),
        0.0027,
        epsilon = 1e-12
    );
}

#[test]
fn test_flat_extrapolation_both_sides() {
    let mut vols = CurveUnderConstruction::new(CurveDefinition::new("VOL", spot())).unwrap();
    vols.append_or_replace_last_node(spot().add_years(1).unwrap(), 0.25)
        .unwrap();
    vols.append_or_replace_last_node(spot().add_years(2).unwrap(), 0.22)
        .unwrap();
    let vols = vols.freeze();

    assert_eq!(vols.value(spot().add_months(3).unwrap()).unwrap(), 0.25);
    assert_eq!(vols.value(spot().add_years(30).unwrap()).unwrap(), 0.22);
}

#[test]
fn test_no_bracket_leaves_curve_untouched() {
    // A par rate of -90% would need a discount factor far above the bound.
    let unreachable = Swap::from_tenor(spot(), "5Y", -0.9, Frequency::Annual)
        .unwrap()
        .with_id("SWP-BAD");
    let bootstrapper = Bootstrapper::new(CurveDefinition::discount("USD", spot()))
        .add_instruments(deposits())
        .add_instrument(unreachable);

    let mut curve = bootstrapper.new_curve().unwrap();
    let err = bootstrapper.bootstrap_into(&mut curve).unwrap_err();

    let CurveError::NodeFailure {
        instrument,
        last_error,
        source,
        ..
    } = &err
    else {
        panic!("expected a node failure, got {err:?}");
    };
    assert_eq!(instrument, "SWP-BAD");
    assert!(last_error.is_finite());
    assert!(matches!(
        **source,
        CurveError::Math(MathError::NoBracket { .. })
    ));
    assert!(err.is_recoverable());

    // Base node plus the three deposits, no trial node left behind.
    assert_eq!(curve.node_count(), 4);
    assert_eq!(
        curve.last_node().map(|(d, _)| d),
        Some(spot().add_months(6).unwrap())
    );
}

#[test]
fn test_instrument_before_base_date_is_rejected() {
    let stale = Deposit::new(
        Date::from_ymd(2024, 6, 3).unwrap(),
        Date::from_ymd(2024, 12, 2).unwrap(),
        0.01,
    );
    let err = Bootstrapper::new(CurveDefinition::discount("USD", spot()))
        .add_instrument(stale)
        .run()
        .unwrap_err();
    assert!(matches!(err, CurveError::UnorderedInstruments { .. }));
}

#[test]
fn test_spread_curve_over_zero_curve() {
    let base = Bootstrapper::new(CurveDefinition::new("SOFR-ZERO", spot()))
        .add_instrument(RateDeposit::from_tenor(spot(), "6M", 0.031).unwrap())
        .add_instrument(RateDeposit::from_tenor(spot(), "1Y", 0.033).unwrap())
        .build()
        .unwrap();
    let base = Arc::new(base);

    let quotes = [("6M", 0.036), ("1Y", 0.039), ("2Y", 0.041)];
    let output = Bootstrapper::new(CurveDefinition::new("ISSUER", spot()))
        .over(Arc::clone(&base))
        .add_instruments(
            quotes
                .iter()
                .map(|(tenor, rate)| RateDeposit::from_tenor(spot(), tenor, *rate).unwrap()),
        )
        .run()
        .unwrap();

    assert!(output.report.all_accepted_by_guess());
    for (tenor, rate) in quotes {
        let deposit = RateDeposit::from_tenor(spot(), tenor, rate).unwrap();
        assert_relative_eq!(
            deposit.implied_quote(&output.curve).unwrap(),
            rate,
            epsilon = 1e-11
        );
    }

    // Stored values are spreads; the composite adds the base back.
    let one_year = spot().add_years(1).unwrap();
    let spread = output
        .curve
        .nodes()
        .into_iter()
        .find(|(d, _)| *d == one_year)
        .map(|(_, v)| v)
        .unwrap();
    assert!(spread > 0.0);
    assert_relative_eq!(
        output.curve.value(one_year).unwrap(),
        base.value(one_year).unwrap() + spread,
        epsilon = 1e-15
    );
}

#[test]
fn test_optionlet_volatility_strip() {
    let discount = Arc::new(
        Bootstrapper::new(CurveDefinition::discount("OIS", spot()))
            .add_instruments(deposits())
            .add_instruments(swaps())
            .build()
            .unwrap(),
    );

    let quotes = [(2, 0.45), (3, 0.42), (5, 0.38)];
    let caps: Vec<CapFloor> = quotes
        .iter()
        .map(|&(years, vol)| {
            CapFloor::cap(
                &discount,
                spot(),
                spot().add_years(years).unwrap(),
                0.01,
                vol,
            )
            .unwrap()
        })
        .collect();

    let output = Bootstrapper::new(CurveDefinition::new("CAPVOL", spot()))
        .add_instruments(caps.clone())
        .run()
        .unwrap();

    // The first cap sees a flat curve at its own vol.
    assert_eq!(
        output.report.nodes[0].resolution,
        NodeResolution::InitialGuess
    );
    assert!(matches!(
        output.report.nodes[1].resolution,
        NodeResolution::Solved { .. }
    ));

    for cap in &caps {
        let implied = cap.implied_quote(&output.curve).unwrap();
        assert!(
            (implied - cap.quote()).abs() < 1e-10,
            "{} premium {implied} vs {}",
            cap.id(),
            cap.quote()
        );
    }

    // Declining flat vols strip into declining optionlet vols.
    let values: Vec<f64> = output.curve.nodes().iter().map(|(_, v)| *v).collect();
    assert!(values[1] < values[0] && values[2] < values[1]);
}

#[test]
fn test_curve_time_axis_follows_day_count() {
    let curve = Bootstrapper::new(
        CurveDefinition::discount("USD", spot()).with_day_count(DayCountConvention::Act360),
    )
    .add_instruments(deposits())
    .build()
    .unwrap();

    let three_months = spot().add_months(3).unwrap();
    let t = curve.time(three_months);
    assert_relative_eq!(t, 90.0 / 360.0, epsilon = 1e-15);
    assert!(curve.zero_rate(three_months).unwrap() > 0.0);
}

#[test]
fn test_independent_curves_in_parallel() {
    let jobs = vec![
        Bootstrapper::new(CurveDefinition::discount("A", spot())).add_instruments(deposits()),
        Bootstrapper::new(CurveDefinition::discount("B", spot()))
            .add_instruments(deposits())
            .add_instruments(swaps()),
    ];
    let results = build_independent(jobs);
    assert_eq!(results[0].as_ref().unwrap().curve.node_count(), 4);
    assert_eq!(results[1].as_ref().unwrap().curve.node_count(), 8);
}

proptest! {
    #[test]
    fn prop_deposit_strips_reprice(
        rates in prop::collection::vec(-0.005f64..0.08, 1..8),
    ) {
        let deposits: Vec<Deposit> = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| Deposit::from_tenor(spot(), &format!("{}M", i + 1), r).unwrap())
            .collect();

        let output = Bootstrapper::new(CurveDefinition::discount("P", spot()))
            .add_instruments(deposits.clone())
            .run()
            .unwrap();

        prop_assert_eq!(output.curve.node_count(), rates.len() + 1);
        for deposit in &deposits {
            let implied = deposit.implied_quote(&output.curve).unwrap();
            prop_assert!((implied - deposit.quote()).abs() < 1e-11);
        }
    }

    #[test]
    fn prop_swap_curves_converge(
        level in 0.0f64..0.06,
        slope in -0.002f64..0.004,
    ) {
        let swaps: Vec<Swap> = [1, 2, 3, 5, 7, 10]
            .iter()
            .map(|&y| {
                let rate = level + slope * f64::from(y);
                Swap::from_tenor(spot(), &format!("{y}Y"), rate, Frequency::Annual).unwrap()
            })
            .collect();

        let output = Bootstrapper::new(CurveDefinition::discount("P", spot()))
            .add_instruments(swaps.clone())
            .run()
            .unwrap();

        for node in &output.report.nodes {
            if let NodeResolution::Solved { iterations } = node.resolution {
                prop_assert!(iterations <= 100);
            }
        }
        for swap in &swaps {
            let implied = swap.implied_quote(&output.curve).unwrap();
            prop_assert!((implied - swap.quote()).abs() < 1e-9);
        }
    }
}
