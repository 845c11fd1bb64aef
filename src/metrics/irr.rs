//! Internal rate of return for the seed investor's cashflows

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Periodic rate bounds searched by the solver
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;

/// Net present value at a periodic rate and its derivative with respect to the rate
fn npv_with_slope(cashflows: &[f64], rate: f64) -> (f64, f64) {
    cashflows
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(npv, slope), (t, &cf)| {
            let growth = (1.0 + rate).powi(t as i32);
            (npv + cf / growth, slope - t as f64 * cf / (growth * (1.0 + rate)))
        })
}

fn annualize(periodic: f64, periods_per_year: u32) -> f64 {
    (1.0 + periodic).powi(periods_per_year as i32) - 1.0
}

/// Annualised IRR of evenly spaced cashflows
///
/// Newton-Raphson from a 10% annual guess, falling back to bisection over
/// [`MIN_RATE`, `MAX_RATE`]. Returns `None` when the flows never change sign
/// or no root is bracketed.
pub fn annualized_irr(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    let has_inflow = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let has_outflow = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = 0.10 / periods_per_year as f64;
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_with_slope(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }
        let next = (rate - npv / slope).clamp(MIN_RATE, MAX_RATE);
        if (next - rate).abs() < TOLERANCE {
            return Some(annualize(next, periods_per_year));
        }
        rate = next;
    }

    bisect(cashflows).map(|r| annualize(r, periods_per_year))
}

fn bisect(cashflows: &[f64]) -> Option<f64> {
    let npv = |r: f64| npv_with_slope(cashflows, r).0;
    let (mut low, mut high) = (MIN_RATE, MAX_RATE);
    let mut npv_low = npv(low);

    if npv_low * npv(high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }
    None
}

/// Annual IRR for an investor paying `seed` before the first month and
/// receiving `exit_proceeds` at the end of month `months`
pub fn investor_irr(seed: f64, exit_proceeds: f64, months: usize) -> Option<f64> {
    if seed <= 0.0 || months == 0 {
        return None;
    }
    let mut flows = vec![0.0; months + 1];
    flows[0] = -seed;
    flows[months] = exit_proceeds;
    annualized_irr(&flows, 12)
}
