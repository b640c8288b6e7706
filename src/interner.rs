use std::collections::HashMap;

/// First-seen-order string table for a single encode pass.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    table: Vec<String>,
    index_by_value: HashMap<String, usize>,
}

impl StringTable {
    pub(crate) fn intern(&mut self, value: &str) -> usize {
        if let Some(index) = self.index_by_value.get(value) {
            return *index;
        }

        let index = self.table.len();
        self.table.push(value.to_string());
        self.index_by_value.insert(value.to_string(), index);
        index
    }

    pub(crate) fn intern_all<'a>(
        &mut self,
        values: impl IntoIterator<Item = &'a String>,
    ) -> Vec<usize> {
        values.into_iter().map(|value| self.intern(value)).collect()
    }

    #[must_use]
    pub(crate) fn into_strings(self) -> Vec<String> {
        self.table
    }
}
