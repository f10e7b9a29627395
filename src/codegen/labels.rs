use indexmap::IndexSet;

/// Insertion-ordered set of label names.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    names: IndexSet<String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `name`, inserting it at the end if absent.
    pub fn insert(&mut self, name: &str) -> usize {
        match self.names.get_index_of(name) {
            Some(idx) => idx,
            None => self.names.insert_full(name.to_string()).0,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Source of fresh `<prefix><N>` labels.
#[derive(Debug, Clone)]
pub struct LabelGen {
    prefix: &'static str,
    next: usize,
}

impl LabelGen {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    pub fn fresh(&mut self) -> String {
        let label = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        label
    }

    /// Number of labels handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}
