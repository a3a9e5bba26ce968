//! Seeded, named random number streams.
//!
//! Every stream is keyed by a type declared with `define_rng!` and seeded from
//! the context's base seed plus a stable hash of the type's name, so a base seed
//! reproduces every stream exactly.
mod context_ext;
mod macros;
mod roulette;
mod sampling_algorithms;

use std::any::{Any, TypeId};
use std::cell::RefCell;

pub use context_ext::ContextRandomExt;
pub use macros::define_rng;
pub use roulette::{roulette, validate_roulette_weights};
pub use sampling_algorithms::sample_single_from_known_length;

use crate::define_data_plugin;
use crate::hashing::HashMap;
use rand::SeedableRng;

pub trait RngId: Copy + Clone + Any {
    type RngType: SeedableRng + rand::Rng;
    fn get_name() -> &'static str;
}

// Type-erased so streams of different generator types can share one map.
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: Option<u64>,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

// Stores:
// * base_seed: set by `init_random`; `None` until then
// * rng_holders: lazily created streams keyed by their RngId. Kept in a
//   RefCell so that sampling only needs `&Context`.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: None,
        rng_holders: RefCell::new(HashMap::default()),
    }
);
