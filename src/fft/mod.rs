pub mod radix2;

use lazy_static::lazy_static;
use num_complex::Complex32;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Base interface for forward DFT plans.
pub trait DftBase: Send + Sync {
    /// In-place forward transform. `buffer` must be exactly `size()` long.
    fn xform_inplace(&self, buffer: &mut [Complex32]);

    fn name(&self) -> String;
    fn size(&self) -> usize;
}

lazy_static! {
    static ref PLAN_CACHE: Mutex<HashMap<usize, Arc<dyn DftBase>>> = Mutex::new(HashMap::new());
}

/// Returns a DFT plan for size `n`, using caching.
/// Only power-of-two sizes are supported; the analysis window is one.
pub fn find_dft(n: usize) -> Arc<dyn DftBase> {
    assert!(n.is_power_of_two(), "DFT size must be a power of two: {}", n);

    // Cached plan lookup.
    {
        let cache = PLAN_CACHE.lock();
        if let Some(plan) = cache.get(&n) {
            return plan.clone();
        }
    }

    let plan: Arc<dyn DftBase> = Arc::new(radix2::DftRadix2::new(n));

    // Cache the plan.
    let mut cache = PLAN_CACHE.lock();
    cache.insert(n, plan.clone());
    plan
}
