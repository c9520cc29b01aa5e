//! Case-insensitive, multi-valued header storage shared by request and
//! response sides.

use indexmap::IndexMap;

/// Case-insensitive mapping from header name to an ordered list of values.
///
/// Lookup ignores ASCII case; the first-seen spelling of a name is preserved
/// for iteration. Value order within a name is insertion order, so repeated
/// headers such as `Set-Cookie` survive round-trips intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
	entries: IndexMap<String, HeaderEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
	name: String,
	values: Vec<String>,
}

impl HeaderMap {
	/// Creates an empty map.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces all values for `name` with a single value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.insert_values(name, vec![value.into()]);
	}

	/// Replaces all values for `name`.
	pub fn insert_values(&mut self, name: impl Into<String>, values: Vec<String>) {
		let name = name.into();
		let key = name.to_ascii_lowercase();
		self.entries.insert(key, HeaderEntry { name, values });
	}

	/// Appends one value to `name`, preserving any existing values.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let key = name.to_ascii_lowercase();
		self.entries
			.entry(key)
			.or_insert_with(|| HeaderEntry {
				name,
				values: Vec::new(),
			})
			.values
			.push(value.into());
	}

	/// Returns the first value for `name`.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.get_all(name).and_then(|values| values.first().map(String::as_str))
	}

	/// Returns all values for `name` in insertion order.
	#[must_use]
	pub fn get_all(&self, name: &str) -> Option<&[String]> {
		self.entries
			.get(&name.to_ascii_lowercase())
			.map(|entry| entry.values.as_slice())
	}

	/// Returns all values for `name` joined with a comma, the form a host
	/// expects for a single serialized header line.
	#[must_use]
	pub fn joined(&self, name: &str) -> Option<String> {
		self.get_all(name).map(|values| values.join(","))
	}

	/// Returns true when `name` is present.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(&name.to_ascii_lowercase())
	}

	/// Removes `name`, returning its values.
	pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
		self.entries
			.shift_remove(&name.to_ascii_lowercase())
			.map(|entry| entry.values)
	}

	/// Removes all headers.
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Number of distinct header names.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true when no headers are present.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates `(original-case name, values)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.values()
			.map(|entry| (entry.name.as_str(), entry.values.as_slice()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_is_case_insensitive() {
		let mut headers = HeaderMap::new();
		headers.insert("X-Foo", "bar");
		assert_eq!(headers.get("x-foo"), Some("bar"));
		assert_eq!(headers.get("X-FOO"), Some("bar"));
		assert!(headers.contains("x-Foo"));
	}

	#[test]
	fn first_spelling_is_preserved_for_iteration() {
		let mut headers = HeaderMap::new();
		headers.append("Content-Type", "text/plain");
		headers.append("content-type", "text/html");
		let collected: Vec<_> = headers.iter().collect();
		assert_eq!(collected.len(), 1);
		assert_eq!(collected[0].0, "Content-Type");
		assert_eq!(collected[0].1, ["text/plain".to_string(), "text/html".to_string()]);
	}

	#[test]
	fn multi_valued_order_is_preserved_and_comma_joined() {
		let mut headers = HeaderMap::new();
		headers.append("Set-Cookie", "a=b;Path=/;");
		headers.append("Set-Cookie", "c=d;Path=/;");
		assert_eq!(
			headers.get_all("set-cookie").unwrap(),
			["a=b;Path=/;".to_string(), "c=d;Path=/;".to_string()]
		);

		headers.insert_values(
			"Cache-Control",
			vec!["must-revalidate".into(), "private".into(), "max-age=0".into()],
		);
		assert_eq!(headers.joined("cache-control").as_deref(), Some("must-revalidate,private,max-age=0"));
	}

	#[test]
	fn insert_replaces_append_accumulates() {
		let mut headers = HeaderMap::new();
		headers.append("Accept", "text/plain");
		headers.insert("accept", "text/html");
		assert_eq!(headers.get_all("Accept").unwrap(), ["text/html".to_string()]);
	}

	#[test]
	fn remove_returns_values() {
		let mut headers = HeaderMap::new();
		headers.insert("X-One", "1");
		assert_eq!(headers.remove("x-one"), Some(vec!["1".to_string()]));
		assert!(headers.is_empty());
		assert_eq!(headers.remove("x-one"), None);
	}
}
