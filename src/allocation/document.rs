use crate::allocation::decoder::DeclaredShape;
use crate::allocation::matrix::AllocationMatrix;

/// One numbered allocation of an [`AllocationSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: usize,
    pub matrix: AllocationMatrix,
}

/// A set of allocations in the persisted text form:
///
/// ```text
/// CONFIGURATION-DATA
/// FILENAME="problem.json"
/// END-CONFIGURATION-DATA
///
/// ALLOCATIONS
/// COUNT=1
/// TASKS=3
/// PROCESSORS=2
///
/// ALLOCATION
/// ID=1
/// MAP=1,0,1;0,1,0
/// END-ALLOCATION
///
/// END-ALLOCATIONS
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationSet {
    pub configuration: Option<String>,
    pub tasks: usize,
    pub processors: usize,
    pub allocations: Vec<Allocation>,
}

impl AllocationSet {
    pub fn new(tasks: usize, processors: usize) -> Self {
        Self {
            configuration: None,
            tasks,
            processors,
            allocations: Vec::new(),
        }
    }

    pub fn with_configuration(mut self, filename: impl Into<String>) -> Self {
        self.configuration = Some(filename.into());
        self
    }

    /// Append a gene vector as the next numbered allocation. Ids start at 1.
    pub fn push_genes(&mut self, genes: &[usize]) -> usize {
        let id = self.allocations.len() + 1;
        self.allocations.push(Allocation {
            id,
            matrix: AllocationMatrix::from_genes(genes, self.processors),
        });
        id
    }

    pub fn declared_shape(&self) -> DeclaredShape {
        DeclaredShape {
            processors: self.processors,
            tasks: self.tasks,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(ref filename) = self.configuration {
            out.push_str(&format!(
                "CONFIGURATION-DATA\nFILENAME=\"{}\"\nEND-CONFIGURATION-DATA\n\n",
                filename
            ));
        }
        out.push_str(&format!(
            "ALLOCATIONS\nCOUNT={}\nTASKS={}\nPROCESSORS={}\n",
            self.allocations.len(),
            self.tasks,
            self.processors
        ));
        for allocation in &self.allocations {
            out.push_str(&format!(
                "\nALLOCATION\nID={}\nMAP={}\nEND-ALLOCATION\n",
                allocation.id,
                allocation.matrix.to_map()
            ));
        }
        out.push_str("\nEND-ALLOCATIONS\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_blocks_in_order() {
        let mut set = AllocationSet::new(3, 2).with_configuration("problem.json");
        assert_eq!(set.push_genes(&[0, 1, 0]), 1);
        assert_eq!(set.push_genes(&[1, 1, 1]), 2);

        let text = set.render();
        assert!(text.starts_with("CONFIGURATION-DATA\nFILENAME=\"problem.json\"\n"));
        assert!(text.contains("COUNT=2\nTASKS=3\nPROCESSORS=2\n"));
        assert!(text.contains("ID=1\nMAP=1,0,1;0,1,0\nEND-ALLOCATION"));
        assert!(text.contains("ID=2\nMAP=0,0,0;1,1,1\nEND-ALLOCATION"));
        assert!(text.trim_end().ends_with("END-ALLOCATIONS"));
    }

    #[test]
    fn renders_exact_document() {
        let mut set = AllocationSet::new(3, 2).with_configuration("problem.json");
        set.push_genes(&[0, 1, 0]);

        assert_eq!(
            set.render(),
            "CONFIGURATION-DATA\n\
             FILENAME=\"problem.json\"\n\
             END-CONFIGURATION-DATA\n\
             \n\
             ALLOCATIONS\n\
             COUNT=1\n\
             TASKS=3\n\
             PROCESSORS=2\n\
             \n\
             ALLOCATION\n\
             ID=1\n\
             MAP=1,0,1;0,1,0\n\
             END-ALLOCATION\n\
             \n\
             END-ALLOCATIONS\n"
        );
    }

    #[test]
    fn renders_without_configuration() {
        let set = AllocationSet::new(1, 1);
        let text = set.render();
        assert!(text.starts_with("ALLOCATIONS\nCOUNT=0"));
        assert!(!text.contains("CONFIGURATION-DATA"));
    }
}
