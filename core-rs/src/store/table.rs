//! Row container shared by the store backends

use serde::{Deserialize, Serialize};

use super::models::Record;

/// Ordered rows plus the primary key sequence
///
/// Rows keep insertion order, which is the order associations resolve in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table<T> {
    next_id: u64,
    rows: Vec<T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<T: Record + Clone> Table<T> {
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Assign the next id and append
    pub fn insert(&mut self, mut row: T) -> T {
        row.set_id(self.next_id);
        self.next_id += 1;
        self.rows.push(row.clone());
        row
    }

    /// Replace the row with the same id; false if absent
    pub fn update(&mut self, row: T) -> bool {
        match self.rows.iter_mut().find(|r| r.id() == row.id()) {
            Some(existing) => {
                *existing = row;
                true
            }
            None => false,
        }
    }

    /// Remove every row matching `pred`, returning how many went
    pub fn delete_where<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|r| !pred(r));
        before - self.rows.len()
    }
}
