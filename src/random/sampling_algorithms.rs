//! Uniform sampling from iterators. Generic over the container so callers can
//! pass filtered iterators without collecting them first.

use rand::Rng;

/// Sample a random element uniformly from a container of known length.
///
/// The container need not be randomly indexable; it only has to report its length.
pub fn sample_single_from_known_length<I, R, T>(rng: &mut R, mut iter: I) -> Option<T>
where
    R: Rng,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if len == 0 {
        return None;
    }
    let index = rng.random_range(0..len);
    iter.nth(index)
}
