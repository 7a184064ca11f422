//! Seeded demo data: property survey responses spread over five batches.

use super::types::{Column, Dataset};
use crate::error::{ContingentError, Result};
use rand::distributions::{Distribution as _, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use rand::{Rng as _, SeedableRng as _};
use rand_distr::Normal;

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PROPERTY_TYPES: [&str; 4] = ["Apartment", "Independent", "Villa", "Studio"];
const SATISFACTION: [&str; 3] = ["Positive", "Neutral", "Negative"];
const SATISFACTION_WEIGHTS: [f64; 3] = [0.5, 0.2, 0.3];
const PRICE_MEAN: f64 = 5_000_000.0;
const PRICE_SD: f64 = 2_000_000.0;
const MISSING_RATE: f64 = 0.02;

/// Generates `rows` records with columns `Region`, `PropertyType`,
/// `Satisfaction`, `District`, `BatchID` and `Price`. About 2% of
/// `PropertyType` values are left empty.
///
/// # Errors
///
/// Fails when `rows` is zero.
pub fn generate_synthetic_dataset(rows: usize, seed: u64) -> Result<Dataset> {
    if rows == 0 {
        return Err(ContingentError::InvalidParameter(
            "synthetic dataset needs at least one row".to_owned(),
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let satisfaction = WeightedIndex::new(SATISFACTION_WEIGHTS)
        .map_err(|e| ContingentError::Other(e.to_string()))?;
    let price_dist =
        Normal::new(PRICE_MEAN, PRICE_SD).map_err(|e| ContingentError::Numeric(e.to_string()))?;

    let mut region = Vec::with_capacity(rows);
    let mut property = Vec::with_capacity(rows);
    let mut mood = Vec::with_capacity(rows);
    let mut district = Vec::with_capacity(rows);
    let mut batch = Vec::with_capacity(rows);
    let mut price = Vec::with_capacity(rows);

    for _ in 0..rows {
        region.push(Some(pick(&mut rng, &REGIONS)));
        let kind = pick(&mut rng, &PROPERTY_TYPES);
        property.push((rng.r#gen::<f64>() >= MISSING_RATE).then_some(kind));
        mood.push(SATISFACTION.get(satisfaction.sample(&mut rng)).copied());
        district.push(Some(format!("D{}", rng.gen_range(1..=10))));
        batch.push(Some(format!("Batch_{}", rng.gen_range(1..=5))));
        price.push(Some(price_dist.sample(&mut rng).round()));
    }

    Dataset::new(vec![
        Column::categorical("Region", region),
        Column::categorical("PropertyType", property),
        Column::categorical("Satisfaction", mood),
        Column::categorical("District", district),
        Column::categorical("BatchID", batch),
        Column::numeric("Price", price),
    ])
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}
