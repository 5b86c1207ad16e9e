use crate::node::Key;
use hashbrown::HashMap;

/// Recycles key-to-index maps between list-diffs, so their allocations are reused.
///
/// Nested list-diffs each take their own map, so this is a small stack rather than a single map.
#[derive(Debug, Default)]
pub struct KeyMapPool(Vec<HashMap<Key, usize>>);

impl KeyMapPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Takes an empty map from the pool, or a fresh one.
	pub fn take(&mut self) -> HashMap<Key, usize> {
		self.0.pop().unwrap_or_default()
	}

	/// Clears `map` and returns it to the pool.
	pub fn give_back(&mut self, mut map: HashMap<Key, usize>) {
		map.clear();
		self.0.push(map)
	}

	/// The number of idle maps.
	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.0.len()
	}
}
