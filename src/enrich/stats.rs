use adjustp::{Procedure, adjust};
use statrs::distribution::{DiscreteCDF, Hypergeometric};

use crate::enrich::EnrichError;

/// Upper tail P(X >= k) of the hypergeometric distribution.
pub fn hypergeom_upper_tail(
    population: u64,
    successes: u64,
    draws: u64,
    k: u64,
) -> Result<f64, EnrichError> {
    if k == 0 {
        return Ok(1.0);
    }
    let dist = Hypergeometric::new(population, successes, draws).map_err(|e| {
        EnrichError::Statistics(format!(
            "hypergeometric(N={population}, K={successes}, n={draws}): {e:?}"
        ))
    })?;
    Ok(dist.sf(k - 1).clamp(0.0, 1.0))
}

pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    if p_values.is_empty() {
        return Vec::new();
    }
    adjust(p_values, Procedure::BenjaminiHochberg)
}

/// Odds ratio of a 2x2 table, with Haldane's correction when any cell is zero.
pub fn odds_ratio(a: u64, b: u64, c: u64, d: u64) -> f64 {
    let (a, b, c, d) = if a == 0 || b == 0 || c == 0 || d == 0 {
        (a as f64 + 0.5, b as f64 + 0.5, c as f64 + 0.5, d as f64 + 0.5)
    } else {
        (a as f64, b as f64, c as f64, d as f64)
    };
    (a * d) / (b * c)
}

pub fn combined_score(p_value: f64, odds_ratio: f64) -> f64 {
    -p_value.max(f64::MIN_POSITIVE).ln() * odds_ratio
}

/// `num / den`, or 1.0 when there is nothing to compare against.
pub fn conservative_ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        1.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/enrich/stats.rs"]
mod tests;
