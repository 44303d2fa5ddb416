use crate::models::Technician;

/// Pick the technician whose expertise is numerically closest to `complexity`.
///
/// Ties go to the technician that appears first in `pool`. Returns `None`
/// only for an empty pool.
pub fn closest_technician(pool: &[Technician], complexity: u8) -> Option<&Technician> {
    // min_by_key returns the first of several equal minima
    pool.iter()
        .min_by_key(|tech| (i16::from(tech.expertise) - i16::from(complexity)).abs())
}
