//! Incremental, case-insensitive substring search over a list of names.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// From the top of the list.
    Fresh,
    /// After the last match, towards the end.
    Next,
    /// Before the last match, towards the start.
    Previous,
}

#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    query: String,
    found: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn found(&self) -> Option<usize> {
        self.found
    }

    pub fn push(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop(&mut self) {
        self.query.pop();
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.found = None;
    }

    /// Find the next item containing the query. Stops at either end of the
    /// list; on a miss the previous match is kept.
    pub fn search<S: AsRef<str>>(&mut self, items: &[S], direction: SearchDirection) -> Option<usize> {
        if self.query.is_empty() {
            return None;
        }
        let needle = self.query.to_lowercase();
        let matches = |i: &usize| items[*i].as_ref().to_lowercase().contains(&needle);

        let hit = match (direction, self.found) {
            (SearchDirection::Fresh, _) | (SearchDirection::Next, None) => {
                (0..items.len()).find(matches)
            }
            (SearchDirection::Next, Some(found)) => (found + 1..items.len()).find(matches),
            (SearchDirection::Previous, Some(found)) => {
                (0..found.min(items.len())).rev().find(matches)
            }
            (SearchDirection::Previous, None) => None,
        };
        if hit.is_some() {
            self.found = hit;
        } else if direction == SearchDirection::Fresh {
            self.found = None;
        }
        hit
    }
}
