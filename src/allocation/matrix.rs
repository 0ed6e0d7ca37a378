use crate::error::{AllocError, Result};

/// Boolean processors × tasks grid. `rows[p][t]` is set when task `t` runs on
/// processor `p`. A valid allocation sets at most one bit per task column.
///
/// Rows may be ragged when parsed from text; the decoder reports that as a
/// structural issue instead of rejecting the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationMatrix {
    rows: Vec<Vec<bool>>,
}

impl AllocationMatrix {
    pub fn new(processors: usize, tasks: usize) -> Self {
        Self {
            rows: vec![vec![false; tasks]; processors],
        }
    }

    /// Materialise a gene vector: bit `[gene_i][i]` is set for every task `i`.
    /// Genes naming a processor at or beyond `processors` are left unset; the
    /// decoder reports them.
    pub fn from_genes(genes: &[usize], processors: usize) -> Self {
        let mut matrix = Self::new(processors, genes.len());
        for (task, &processor) in genes.iter().enumerate() {
            if let Some(row) = matrix.rows.get_mut(processor) {
                row[task] = true;
            }
        }
        matrix
    }

    /// Parse the persisted `MAP` form: rows separated by `;`, `0`/`1` columns
    /// separated by `,`.
    pub fn parse_map(map: &str) -> Result<Self> {
        let rows = map
            .trim()
            .split(';')
            .enumerate()
            .map(|(r, row)| {
                row.split(',')
                    .enumerate()
                    .map(|(c, value)| match value.trim() {
                        "0" => Ok(false),
                        "1" => Ok(true),
                        other => Err(AllocError::InvalidMap(format!(
                            "row {} column {} has value {:?}, expected 0 or 1",
                            r, c, other
                        ))),
                    })
                    .collect::<Result<Vec<bool>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn to_map(&self) -> String {
        (0..self.rows.len())
            .map(|p| self.processor_task_vector(p))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn set(&mut self, processor: usize, task: usize) {
        self.rows[processor][task] = true;
    }

    pub fn get(&self, processor: usize, task: usize) -> bool {
        self.rows
            .get(processor)
            .and_then(|row| row.get(task))
            .copied()
            .unwrap_or(false)
    }

    pub fn processor_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row; equal to every row's length unless the matrix is ragged.
    pub fn task_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn row_len(&self, processor: usize) -> usize {
        self.rows.get(processor).map_or(0, Vec::len)
    }

    pub fn processor_tasks(&self, processor: usize) -> Vec<usize> {
        self.rows
            .get(processor)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, set)| **set)
                    .map(|(t, _)| t)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn task_processors(&self, task: usize) -> Vec<usize> {
        (0..self.rows.len()).filter(|&p| self.get(p, task)).collect()
    }

    /// Processors hosting at least one task.
    pub fn active_processors(&self) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&p| self.rows[p].iter().any(|&set| set))
            .collect()
    }

    /// One row as text, e.g. `1,0,1`.
    pub fn processor_task_vector(&self, processor: usize) -> String {
        self.rows
            .get(processor)
            .map(|row| {
                row.iter()
                    .map(|&set| if set { "1" } else { "0" })
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_genes_sets_one_bit_per_task() {
        let m = AllocationMatrix::from_genes(&[1, 0, 1], 2);
        assert_eq!(m.processor_count(), 2);
        assert_eq!(m.task_count(), 3);
        assert_eq!(m.processor_tasks(0), vec![1]);
        assert_eq!(m.processor_tasks(1), vec![0, 2]);
        for t in 0..3 {
            assert_eq!(m.task_processors(t).len(), 1);
        }
    }

    #[test]
    fn from_genes_never_grows_past_known_processors() {
        let m = AllocationMatrix::from_genes(&[0, 4_000_000_000], 2);
        assert_eq!(m.processor_count(), 2);
        assert_eq!(m.task_count(), 2);
        assert!(m.get(0, 0));
        assert!(m.task_processors(1).is_empty());
    }

    #[test]
    fn parse_and_render_map() {
        let m = AllocationMatrix::parse_map("1,0,0;0,1,1").unwrap();
        assert_eq!(m.processor_count(), 2);
        assert_eq!(m.task_count(), 3);
        assert_eq!(m.to_map(), "1,0,0;0,1,1");
        assert_eq!(m.processor_task_vector(1), "0,1,1");
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let m = AllocationMatrix::parse_map(" 1, 0 ;0 ,1 ").unwrap();
        assert_eq!(m.to_map(), "1,0;0,1");
    }

    #[test]
    fn parse_rejects_non_binary_values() {
        assert!(matches!(
            AllocationMatrix::parse_map("1,2;0,1"),
            Err(AllocError::InvalidMap(_))
        ));
    }

    #[test]
    fn active_processors_skip_empty_rows() {
        let m = AllocationMatrix::parse_map("0,0;1,1;0,0").unwrap();
        assert_eq!(m.active_processors(), vec![1]);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let m = AllocationMatrix::parse_map("1,0,0;0,1").unwrap();
        assert_eq!(m.task_count(), 3);
        assert_eq!(m.row_len(1), 2);
        assert!(!m.get(1, 2));
    }
}
