use std::ops::Index;
use std::sync::Arc;

/// Captured text of the most recent successful match.
///
/// Index 0 is the whole match, later indices are capture groups in pattern
/// order. A group that did not take part in the match reads as `""` through
/// indexing and as `None` through [`get`](Self::get).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matches {
    groups: Vec<Option<String>>,
    names: Arc<[Option<String>]>,
}

impl Matches {
    /// Builds matches from raw groups. `groups[0]` must be the whole match.
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self {
            groups,
            names: Arc::from(Vec::new()),
        }
    }

    /// Attaches group names, one slot per group (`None` for unnamed groups).
    pub fn with_names(mut self, names: Arc<[Option<String>]>) -> Self {
        self.names = names;
        self
    }

    pub(crate) fn from_captures(caps: &regex::Captures<'_>, names: &Arc<[Option<String>]>) -> Self {
        let groups = caps
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        Self {
            groups,
            names: Arc::clone(names),
        }
    }

    /// The whole matched text.
    pub fn whole(&self) -> &str {
        self.get(0).unwrap_or("")
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Looks a capture up by group name.
    pub fn name(&self, name: &str) -> Option<&str> {
        let index = self
            .names
            .iter()
            .position(|slot| slot.as_deref() == Some(name))?;
        self.get(index)
    }

    /// Number of groups, including the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|group| group.as_deref().unwrap_or(""))
    }
}

impl Index<usize> for Matches {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        self.groups[index].as_deref().unwrap_or("")
    }
}
