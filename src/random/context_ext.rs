use std::any::TypeId;
use std::cell::RefMut;

use log::trace;
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::{Rng, SeedableRng};

use crate::context::Context;
use crate::error::ModelError;
use crate::hashing::hash_str;
use crate::random::roulette::roulette;
use crate::random::sampling_algorithms::sample_single_from_known_length;
use crate::random::{RngHolder, RngId, RngPlugin};

/// Gets a mutable reference to the random number generator associated with the given
/// [`RngId`]. If the Rng has not been used before, one will be created from the base seed
/// passed to `init_random`.
fn get_rng<R: RngId>(context: &Context) -> RefMut<'_, R::RngType> {
    let data_container = context
        .get_data_container(RngPlugin)
        .expect("You must initialize the random number generator with a base seed");
    let base_seed = data_container
        .base_seed
        .expect("You must initialize the random number generator with a base seed");

    let rng_holders = data_container
        .rng_holders
        .try_borrow_mut()
        .expect("random number generators cannot be borrowed re-entrantly");
    RefMut::map(rng_holders, |holders| {
        holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                trace!(
                    "creating new RNG (seed={}) for {}",
                    base_seed,
                    R::get_name()
                );
                let seed_offset = hash_str(R::get_name());
                RngHolder {
                    rng: Box::new(R::RngType::seed_from_u64(
                        base_seed.wrapping_add(seed_offset),
                    )),
                }
            })
            .rng
            .downcast_mut::<R::RngType>()
            .expect("RNG stored under the wrong type")
    })
}

// This is a trait extension on Context for
// random number generation functionality.
pub trait ContextRandomExt {
    /// Sets the base seed and forgets every existing stream, so streams are
    /// re-seeded lazily on their next use.
    fn init_random(&mut self, base_seed: u64);

    /// Applies `sampler` to the stream for `R`.
    ///
    /// # Panics
    ///
    /// Panics if `init_random` has not been called.
    fn sample<R: RngId, T>(&self, rng_id: R, sampler: impl FnOnce(&mut R::RngType) -> T) -> T;

    /// Uniform sample from `range`.
    fn sample_range<R: RngId, S, T>(&self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform;

    /// `true` with probability `p`. `p` must lie in `[0, 1]`.
    fn sample_bool<R: RngId>(&self, rng_id: R, p: f64) -> bool;

    /// Uniform draw from `[0, 1)`.
    fn sample_uniform<R: RngId>(&self, rng_id: R) -> f64;

    /// One roulette draw over `weights`; see `crate::random::roulette`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::SamplingError` if the weights are unusable. No
    /// random number is consumed in that case.
    fn sample_roulette<R: RngId>(
        &self,
        rng_id: R,
        weights: &[f64],
    ) -> Result<Option<usize>, ModelError>;

    /// Uniformly picks one item of an iterator whose length is known.
    fn sample_from_known_length<R: RngId, I, T>(&self, rng_id: R, iter: I) -> Option<T>
    where
        I: ExactSizeIterator<Item = T>;
}

impl ContextRandomExt for Context {
    fn init_random(&mut self, base_seed: u64) {
        trace!("initializing random module with base seed {base_seed}");
        let data_container = self.get_data_container_mut(RngPlugin);
        data_container.base_seed = Some(base_seed);
        data_container.rng_holders.get_mut().clear();
    }

    fn sample<R: RngId, T>(&self, _rng_id: R, sampler: impl FnOnce(&mut R::RngType) -> T) -> T {
        let mut rng = get_rng::<R>(self);
        sampler(&mut rng)
    }

    fn sample_range<R: RngId, S, T>(&self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    fn sample_bool<R: RngId>(&self, rng_id: R, p: f64) -> bool {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    fn sample_uniform<R: RngId>(&self, rng_id: R) -> f64 {
        self.sample(rng_id, |rng| rng.random::<f64>())
    }

    fn sample_roulette<R: RngId>(
        &self,
        rng_id: R,
        weights: &[f64],
    ) -> Result<Option<usize>, ModelError> {
        crate::random::validate_roulette_weights(weights)?;
        let u = self.sample_uniform(rng_id);
        roulette(weights, u)
    }

    fn sample_from_known_length<R: RngId, I, T>(&self, rng_id: R, iter: I) -> Option<T>
    where
        I: ExactSizeIterator<Item = T>,
    {
        self.sample(rng_id, |rng| sample_single_from_known_length(rng, iter))
    }
}
