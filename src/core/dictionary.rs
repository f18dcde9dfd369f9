//! Character trie used for command-name autocomplete.
//!
//! Nodes live in a flat arena and refer to each other by index, so the parent
//! links used to rebuild words never fight the ownership of the child links.

use std::collections::BTreeMap;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct TreeNode {
    parent: Option<NodeId>,
    value: char,
    completes_word: bool,
    // Sorted so match results come out in a stable order.
    children: BTreeMap<char, NodeId>,
}

impl TreeNode {
    fn new(parent: Option<NodeId>, value: char) -> Self {
        Self {
            parent,
            value,
            completes_word: false,
            children: BTreeMap::new(),
        }
    }
}

/// A trie over registered names with case-insensitive and camel-case matching.
///
/// # Complexity
///
/// - `add_entry` / `contains`: O(k) where k = key length
/// - `matches`: O(k + m) for prefix queries, m = size of the matched subtrees
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::Dictionary;
///
/// let mut dict = Dictionary::new();
/// assert!(dict.add_entry("GetSet"));
/// assert!(dict.add_entry("get_value"));
/// assert!(!dict.add_entry("GetSet"));
///
/// // No delimiter in the query: case-insensitive prefix search.
/// assert_eq!(dict.matches("get"), vec!["GetSet", "get_value"]);
///
/// // Capital letters anchor word boundaries.
/// assert_eq!(dict.matches("GS"), vec!["GetSet"]);
/// ```
#[derive(Debug, Clone)]
pub struct Dictionary {
    nodes: Vec<TreeNode>,
    len: usize,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase letters and `_` start a new word inside a name.
#[inline]
pub fn is_delimiter(c: char) -> bool {
    c.is_uppercase() || c == '_'
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(None, '\0')],
            len: 0,
        }
    }

    /// Build a dictionary from a list of words, skipping duplicates.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for word in words {
            dict.add_entry(word.as_ref());
        }
        dict
    }

    /// Get the number of words.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the dictionary holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a word.
    ///
    /// Returns `false` if the word is empty or already present.
    pub fn add_entry(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let mut node = ROOT;
        for c in text.chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TreeNode::new(Some(node), c));
                    self.nodes[node].children.insert(c, child);
                    child
                }
            };
        }

        if self.nodes[node].completes_word {
            return false;
        }
        self.nodes[node].completes_word = true;
        self.len += 1;
        true
    }

    /// Unmark a word. Nodes are kept, only the completion flag is cleared.
    ///
    /// Returns `false` if the word was not present.
    pub fn remove_entry(&mut self, text: &str) -> bool {
        match self.find(text) {
            Some(node) if self.nodes[node].completes_word => {
                self.nodes[node].completes_word = false;
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Check if the exact word is present.
    pub fn contains(&self, text: &str) -> bool {
        !text.is_empty() && self.find(text).is_some_and(|node| self.nodes[node].completes_word)
    }

    /// All words in sorted order.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.len);
        self.collect_words(ROOT, &mut words);
        words
    }

    /// Find words matching a partially typed query.
    ///
    /// Queries without a delimiter (uppercase letter or `_`) match any word
    /// that starts with the query, ignoring case. Queries with a delimiter
    /// match camel-case style: after a delimiter has been typed, unmatched
    /// characters of the word are skipped until the query can continue from
    /// that delimiter, so `GS` finds `GetSet` and `GeSe` finds `GetSomeSet`.
    pub fn matches(&self, query: &str) -> Vec<String> {
        let query: Vec<char> = query.chars().collect();
        let mut words = Vec::new();

        if query.iter().copied().any(is_delimiter) {
            self.match_delimited(ROOT, &query, 0, None, &mut words);
        } else {
            let mut frontier = vec![ROOT];
            for &qc in &query {
                frontier = frontier
                    .into_iter()
                    .flat_map(|node| self.nodes[node].children.iter())
                    .filter(|(c, _)| chars_eq_ignore_case(**c, qc))
                    .map(|(_, &child)| child)
                    .collect();
                if frontier.is_empty() {
                    break;
                }
            }
            for node in frontier {
                self.collect_words(node, &mut words);
            }
        }

        words.sort();
        words
    }

    fn find(&self, text: &str) -> Option<NodeId> {
        let mut node = ROOT;
        for c in text.chars() {
            node = *self.nodes[node].children.get(&c)?;
        }
        Some(node)
    }

    fn match_delimited(
        &self,
        node: NodeId,
        query: &[char],
        index: usize,
        last_boundary: Option<usize>,
        words: &mut Vec<String>,
    ) {
        if index == query.len() {
            self.collect_words(node, words);
            return;
        }

        let last_boundary = if is_delimiter(query[index]) {
            Some(index)
        } else {
            last_boundary
        };

        for (&c, &child) in &self.nodes[node].children {
            if c == query[index] {
                self.match_delimited(child, query, index + 1, last_boundary, words);
            } else if let Some(boundary) = last_boundary {
                // Resume from the last boundary instead of failing outright.
                let next = if c == query[boundary] { boundary + 1 } else { boundary };
                self.match_delimited(child, query, next, last_boundary, words);
            }
        }
    }

    fn collect_words(&self, start: NodeId, words: &mut Vec<String>) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if self.nodes[node].completes_word {
                words.push(self.backtrace(node));
            }
            // Reverse so the sorted children pop in ascending order.
            stack.extend(self.nodes[node].children.values().rev());
        }
    }

    /// Rebuild the word ending at `node` by walking parent links to the root.
    fn backtrace(&self, mut node: NodeId) -> String {
        let mut chars = Vec::new();
        while let Some(parent) = self.nodes[node].parent {
            chars.push(self.nodes[node].value);
            node = parent;
        }
        chars.iter().rev().collect()
    }

    /// Remove all words.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
