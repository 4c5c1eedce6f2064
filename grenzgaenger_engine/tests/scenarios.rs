//! End-to-end scenarios run through the public API of the crate.

use grenzgaenger_engine::allowances::{commuter_allowance_monthly, family_bonus_monthly};
use grenzgaenger_engine::currency::{to_chf, to_eur};
use grenzgaenger_engine::models::{Child, MaritalStatus};
use grenzgaenger_engine::withholding::StGallenWithholdingCalculator;
use grenzgaenger_engine::{compute_result, CalculationInput, PaymentsPerYear, TaxTables};
use std::path::Path;

fn base(payments_per_year: PaymentsPerYear) -> CalculationInput {
    CalculationInput {
        gross_monthly_salary_chf: 6000.0,
        payments_per_year,
        age: 30,
        marital_status: MaritalStatus::Single,
        children: vec![],
        commuter_distance_km: 30,
        commuter_allowance_monthly: 123.0,
        family_bonus_monthly: 0.0,
        pensioner_bonus_monthly: 0.0,
        sole_earner_bonus_yearly: 0.0,
        insurance_contribution_monthly: 0.0,
        exchange_rate: 1.07,
    }
}

fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
    (actual - expected).abs() <= tolerance
}

#[test]
fn reference_commuter_with_student_child() {
    let tables = TaxTables::default();
    let student = Child {
        is_adult: true,
        lives_at_home: true,
        is_student: true,
    };
    let children = vec![student];
    let input = CalculationInput {
        gross_monthly_salary_chf: 6000.0,
        payments_per_year: PaymentsPerYear::Fourteen,
        age: 30,
        marital_status: MaritalStatus::Single,
        commuter_distance_km: 33,
        commuter_allowance_monthly: commuter_allowance_monthly(33, false, &tables),
        family_bonus_monthly: family_bonus_monthly(&children, &tables),
        children,
        pensioner_bonus_monthly: 0.0,
        sole_earner_bonus_yearly: 0.0,
        insurance_contribution_monthly: 550.0,
        exchange_rate: 1.0738,
    };
    assert_eq!(input.commuter_allowance_monthly, 123.0);
    assert_eq!(input.family_bonus_monthly, 54.18);

    let r = compute_result(&input, &tables);
    assert!(close(r.yearly_gross_eur, 90_199.20, 0.01));
    assert!(close(r.swiss_deductions.total, 948.0, 1e-9));
    assert!(close(r.withholding.source_tax, 330.0, 1e-9));
    assert!(close(r.austrian_tax.taxable_income, 54_986.13, 0.01));
    assert!(close(r.austrian_tax.special_payments_tax, 698.736, 1e-6));
    assert!(close(r.austrian_tax.tax_after_swiss_credit, 11_247.22, 0.01));
    assert!(close(r.yearly_net_eur, 54_498.41, 1.0));
    assert!(close(r.monthly_net_eur * 14.0, r.yearly_net_eur, 1e-6));
    assert!(close(r.average_monthly_net_eur, 4_541.53, 0.01));
    assert!(close(r.effective_tax_rate, 20.514, 0.001));
}

#[test]
fn yearly_net_increases_with_payment_cadence() {
    let tables = TaxTables::default();
    for salary in (4_000..=15_000).step_by(500) {
        let nets: Vec<f64> = PaymentsPerYear::ALL
            .iter()
            .map(|&p| {
                let input = CalculationInput {
                    gross_monthly_salary_chf: f64::from(salary),
                    ..base(p)
                };
                compute_result(&input, &tables).yearly_net_eur
            })
            .collect();
        assert!(nets[0] < nets[1] && nets[1] < nets[2], "salary {}: {:?}", salary, nets);
    }
}

#[test]
fn special_payments_are_taxed_below_the_average_rate() {
    let tables = TaxTables::default();
    for salary in (4_000..=15_000).step_by(500) {
        let at = |p| {
            let input = CalculationInput {
                gross_monthly_salary_chf: f64::from(salary),
                ..base(p)
            };
            compute_result(&input, &tables)
        };
        let twelve = at(PaymentsPerYear::Twelve);
        let fourteen = at(PaymentsPerYear::Fourteen);
        let average_rate = twelve.austrian_tax.gross_tax / twelve.austrian_tax.taxable_income;
        let extra_tax = fourteen.austrian_tax.gross_tax - twelve.austrian_tax.gross_tax;
        assert!(extra_tax < twelve.gross_salary_eur * 2.0 * average_rate, "salary {}", salary);
    }
}

#[test]
fn family_bonus_raises_net_income() {
    let tables = TaxTables::default();
    let without = compute_result(&base(PaymentsPerYear::Fourteen), &tables);

    let one = CalculationInput {
        children: vec![Child::default()],
        family_bonus_monthly: 166.68,
        ..base(PaymentsPerYear::Fourteen)
    };
    let gain = compute_result(&one, &tables).monthly_net_eur - without.monthly_net_eur;
    assert!(gain > 150.0 && gain < 350.0, "gain {}", gain);

    let two = CalculationInput {
        children: vec![Child::default(), Child::default()],
        family_bonus_monthly: 333.36,
        ..base(PaymentsPerYear::Fourteen)
    };
    let gain = compute_result(&two, &tables).monthly_net_eur - without.monthly_net_eur;
    assert!(gain > 300.0 && gain < 700.0, "gain {}", gain);
}

#[test]
fn insurance_contribution_costs_less_than_it_is() {
    let tables = TaxTables::default();
    let without = compute_result(&base(PaymentsPerYear::Fourteen), &tables);
    let with = compute_result(
        &CalculationInput {
            insurance_contribution_monthly: 550.0,
            ..base(PaymentsPerYear::Fourteen)
        },
        &tables,
    );
    let cost = without.monthly_net_eur - with.monthly_net_eur;
    assert!(cost > 200.0 && cost < 550.0, "cost {}", cost);
    let saving = without.austrian_tax.monthly_tax - with.austrian_tax.monthly_tax;
    assert!(saving > 0.0 && saving < 550.0, "saving {}", saving);
}

#[test]
fn larger_commuter_allowance_raises_net_income() {
    let tables = TaxTables::default();
    let small = compute_result(&base(PaymentsPerYear::Fourteen), &tables);
    let large = compute_result(
        &CalculationInput {
            commuter_allowance_monthly: 243.0,
            ..base(PaymentsPerYear::Fourteen)
        },
        &tables,
    );
    assert!(large.monthly_net_eur > small.monthly_net_eur);
    assert!(large.austrian_tax.taxable_income < small.austrian_tax.taxable_income);
}

#[test]
fn sole_earner_bonus_is_a_full_credit() {
    let tables = TaxTables::default();
    let without = compute_result(&base(PaymentsPerYear::Fourteen), &tables);
    let with = compute_result(
        &CalculationInput {
            sole_earner_bonus_yearly: 778.0,
            ..base(PaymentsPerYear::Fourteen)
        },
        &tables,
    );
    assert!(close(with.yearly_net_eur - without.yearly_net_eur, 778.0, 1e-6));
}

#[test]
fn effective_rate_grows_with_salary() {
    let tables = TaxTables::default();
    let rates: Vec<f64> = [6_000.0, 8_000.0, 10_000.0]
        .iter()
        .map(|&salary| {
            let input = CalculationInput {
                gross_monthly_salary_chf: salary,
                ..base(PaymentsPerYear::Fourteen)
            };
            compute_result(&input, &tables).effective_tax_rate
        })
        .collect();
    assert!(rates[0] < rates[1] && rates[1] < rates[2], "{:?}", rates);
    assert!(close(rates[0], 20.943, 0.001));
}

#[test]
fn more_children_never_raise_withholding() {
    let tables = TaxTables::default();
    let calc = StGallenWithholdingCalculator::new(&tables.st_gallen);
    for status in [MaritalStatus::Single, MaritalStatus::Married] {
        let mut previous = f64::INFINITY;
        for children in 0..=25 {
            let tax = calc.calculate(7_500.0, status, children).source_tax;
            assert!(tax >= 0.0 && tax <= previous);
            previous = tax;
        }
    }
}

#[test]
fn currency_round_trip() {
    for rate in [0.5, 1.0738, 1.5] {
        let chf = 6_123.45;
        assert!(close(to_chf(to_eur(chf, rate), rate), chf, 1e-9));
    }
}

#[test]
fn shipped_tables_match_builtin_figures() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tax_tables/2026.json");
    let shipped = TaxTables::from_file(&path).unwrap();
    let builtin = TaxTables::default();
    assert_eq!(shipped.tax_year, 2026);
    for payments in PaymentsPerYear::ALL {
        let input = base(payments);
        let a = compute_result(&input, &shipped);
        let b = compute_result(&input, &builtin);
        assert!(close(a.yearly_net_eur, b.yearly_net_eur, 1e-6));
        assert!(close(a.austrian_tax.monthly_tax, b.austrian_tax.monthly_tax, 1e-6));
    }
}
