//! The consumable argument source.
//!
//! An [`ArgumentSource`] adapts one execution's raw input — positional
//! values, named key/value pairs, or a pre-tokenized line — into the ordered
//! consumption model the binder works against:
//!
//! - [`try_next`](ArgumentSource::try_next) probes the named store first
//!   (consuming on hit), then takes the next positional;
//! - [`try_peek_positional`](ArgumentSource::try_peek_positional) lets the
//!   catalog search look at name tokens without consuming anything;
//! - [`set_size`](ArgumentSource::set_size) is called once a candidate is
//!   chosen: it skips the name tokens and *resets* consumption state, so a
//!   candidate that fails mid-parse leaves the source pristine for the next.

use crate::comparer::NameComparer;
use crate::value::RawValue;

struct NamedEntry {
    folded: String,
    value: RawValue,
    taken: bool,
}

/// An ordered, consumable view over one execution's raw arguments.
pub struct ArgumentSource {
    positional: Vec<RawValue>,
    named: Vec<NamedEntry>,
    comparer: NameComparer,
    cursor: usize,
}

impl ArgumentSource {
    /// Builds a source of positional values only.
    pub fn from_values(values: Vec<RawValue>, comparer: NameComparer) -> Self {
        Self {
            positional: values,
            named: Vec::new(),
            comparer,
            cursor: 0,
        }
    }

    /// Builds a source from key/value pairs.
    ///
    /// A pair with a `None` value is demoted to a positional of the key
    /// string; all other pairs become named entries.
    pub fn from_pairs(pairs: Vec<(String, Option<RawValue>)>, comparer: NameComparer) -> Self {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for (key, value) in pairs {
            match value {
                Some(value) => named.push(NamedEntry {
                    folded: comparer.fold(&key),
                    value,
                    taken: false,
                }),
                None => positional.push(RawValue::Text(key)),
            }
        }
        Self {
            positional,
            named,
            comparer,
            cursor: 0,
        }
    }

    /// Builds a source from pre-tokenized text.
    pub fn from_tokens(tokens: Vec<String>, comparer: NameComparer) -> Self {
        Self::from_values(tokens.into_iter().map(RawValue::Text).collect(), comparer)
    }

    /// Remaining argument count: unconsumed positionals plus unconsumed
    /// named entries.
    pub fn len(&self) -> usize {
        let positional = self.positional.len().saturating_sub(self.cursor);
        let named = self.named.iter().filter(|entry| !entry.taken).count();
        positional + named
    }

    /// Returns `true` if nothing remains to consume.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Skips past `height` leading name tokens and resets consumption state.
    pub fn set_size(&mut self, height: usize) {
        self.cursor = height.min(self.positional.len());
        for entry in &mut self.named {
            entry.taken = false;
        }
    }

    /// Fetches the value for `name`: the named store first (consuming on
    /// hit), else the next positional.
    pub fn try_next(&mut self, name: &str) -> Option<RawValue> {
        let folded = self.comparer.fold(name);
        if let Some(entry) = self
            .named
            .iter_mut()
            .find(|entry| !entry.taken && entry.folded == folded)
        {
            entry.taken = true;
            return Some(entry.value.clone());
        }
        if self.cursor < self.positional.len() {
            let value = self.positional[self.cursor].clone();
            self.cursor += 1;
            return Some(value);
        }
        None
    }

    /// Peeks at the positional slot at an absolute index, without consuming.
    ///
    /// Only text slots are visible; an object in a name position can never
    /// match an alias.
    pub fn try_peek_positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(RawValue::as_text)
    }

    /// Consumes and returns every remaining positional value.
    pub fn take_remaining(&mut self) -> Vec<RawValue> {
        let values = self.positional[self.cursor.min(self.positional.len())..].to_vec();
        self.cursor = self.positional.len();
        values
    }

    /// Consumes every remaining positional value, joined into one string.
    pub fn join_remaining(&mut self, separator: char) -> String {
        let values = self.take_remaining();
        values
            .iter()
            .map(RawValue::display)
            .collect::<Vec<_>>()
            .join(&separator.to_string())
    }
}

impl std::fmt::Debug for ArgumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentSource")
            .field("positional", &self.positional.len())
            .field("named", &self.named.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
