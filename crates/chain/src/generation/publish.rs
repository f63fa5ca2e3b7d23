//! Atomic publication of generations.
//!
//! # Invariants
//!
//! - Readers always observe a complete generation; a swap never exposes a partial one.
//! - Generation numbers strictly increase in publication order.
//! - A failed rebuild leaves the current generation in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use super::{ComponentFactory, Generation, GenerationBuilder};
use crate::{BuildError, ChainsConfig};

/// Monotonic generation clock.
#[derive(Debug, Default)]
struct GenerationClock {
	next: AtomicU64,
}

impl GenerationClock {
	/// Returns the next generation number, starting at 1.
	fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Handle to the active generation.
///
/// Requests take the current generation with [`Generations::current`] and keep that
/// `Arc` for their whole lifetime; publishing never affects them.
pub struct Generations<Req, Resp> {
	current: ArcSwap<Generation<Req, Resp>>,
	clock: GenerationClock,
}

impl<Req, Resp> Generations<Req, Resp> {
	/// Publishes `initial` as the first generation.
	pub fn new(mut initial: Generation<Req, Resp>) -> Self {
		let clock = GenerationClock::default();
		initial.set_number(clock.next());
		Self {
			current: ArcSwap::from_pointee(initial),
			clock,
		}
	}

	/// The active generation.
	pub fn current(&self) -> Arc<Generation<Req, Resp>> {
		self.current.load_full()
	}

	/// Number of the active generation.
	pub fn number(&self) -> u64 {
		self.current.load().number()
	}

	/// Stamps `generation` with the next number and makes it active.
	pub fn publish(&self, mut generation: Generation<Req, Resp>) -> Arc<Generation<Req, Resp>> {
		generation.set_number(self.clock.next());
		let generation = Arc::new(generation);
		let previous = self.current.swap(Arc::clone(&generation));
		tracing::debug!(
			generation = generation.number(),
			previous = previous.number(),
			chains = generation.chains().len(),
			"generation published"
		);
		generation
	}

	/// Builds a generation from `config` and publishes it.
	///
	/// On error nothing is published and the current generation stays active.
	pub fn rebuild(
		&self,
		config: &ChainsConfig,
		factory: &dyn ComponentFactory<Req, Resp>,
	) -> Result<Arc<Generation<Req, Resp>>, BuildError> {
		match GenerationBuilder::build(config, factory) {
			Ok(generation) => Ok(self.publish(generation)),
			Err(error) => {
				tracing::warn!(generation = self.number(), %error, "rebuild failed; keeping current generation");
				Err(error)
			}
		}
	}
}

impl<Req, Resp> Default for Generations<Req, Resp> {
	fn default() -> Self {
		Self::new(Generation::empty())
	}
}

impl<Req, Resp> std::fmt::Debug for Generations<Req, Resp> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Generations")
			.field("current", &self.number())
			.finish_non_exhaustive()
	}
}
