use crate::model::record::{ProcessorRecord, TaskRecord};

/// True when `processor` can host `task` alone within `deadline` and its
/// RAM, download and upload capacities.
pub fn is_eligible(task: &TaskRecord, processor: &ProcessorRecord, deadline: f64) -> bool {
    task.runtime_on(processor) <= deadline
        && task.ram <= processor.ram
        && task.download <= processor.download
        && task.upload <= processor.upload
}

/// Ids of every processor that can host `task`, in processor order.
pub fn eligible_processors(
    task: &TaskRecord,
    processors: &[ProcessorRecord],
    deadline: f64,
) -> Vec<usize> {
    processors
        .iter()
        .filter(|p| is_eligible(task, p, deadline))
        .map(|p| p.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(id: usize, freq: f64) -> ProcessorRecord {
        ProcessorRecord::new(id, freq).with_capacity(4.0, 300.0, 50.0)
    }

    #[test]
    fn includes_processor_meeting_every_limit() {
        let task = TaskRecord::new(0, 1.0, 2.0).with_resources(2.0, 100.0, 10.0);
        assert!(is_eligible(&task, &processor(0, 2.0), 1.0));
    }

    #[test]
    fn boundary_values_are_inclusive() {
        let task = TaskRecord::new(0, 1.0, 2.0).with_resources(4.0, 300.0, 50.0);
        assert!(is_eligible(&task, &processor(0, 2.0), 1.0));
    }

    #[test]
    fn excludes_slow_processor() {
        let task = TaskRecord::new(0, 1.0, 2.0);
        assert!(!is_eligible(&task, &processor(0, 1.0), 1.5));
    }

    #[test]
    fn excludes_on_each_resource() {
        let p = processor(0, 2.0);
        let ram = TaskRecord::new(0, 1.0, 2.0).with_resources(5.0, 0.0, 0.0);
        let dl = TaskRecord::new(0, 1.0, 2.0).with_resources(0.0, 301.0, 0.0);
        let ul = TaskRecord::new(0, 1.0, 2.0).with_resources(0.0, 0.0, 51.0);
        assert!(!is_eligible(&ram, &p, 10.0));
        assert!(!is_eligible(&dl, &p, 10.0));
        assert!(!is_eligible(&ul, &p, 10.0));
    }

    #[test]
    fn returns_ids_in_processor_order() {
        let task = TaskRecord::new(0, 1.0, 2.0);
        let processors = vec![processor(0, 4.0), processor(1, 1.0), processor(2, 2.0)];
        assert_eq!(eligible_processors(&task, &processors, 1.0), vec![0, 2]);
    }
}
