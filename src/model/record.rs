use serde::{Deserialize, Serialize};

/// A unit of work to place on exactly one processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: usize,
    /// Processing time measured at `reference_frequency`
    pub time: f64,
    pub reference_frequency: f64,
    pub ram: f64,
    pub download: f64,
    pub upload: f64,
    /// Energy spent communicating with tasks on the same processor
    pub local_energy: f64,
    /// Energy spent communicating with tasks on other processors
    pub remote_energy: f64,
    /// Processor ids able to host this task. Filled once by the problem setup.
    #[serde(default)]
    pub eligible: Vec<usize>,
}

impl TaskRecord {
    pub fn new(id: usize, time: f64, reference_frequency: f64) -> Self {
        Self {
            id,
            time,
            reference_frequency,
            ram: 0.0,
            download: 0.0,
            upload: 0.0,
            local_energy: 0.0,
            remote_energy: 0.0,
            eligible: Vec::new(),
        }
    }

    pub fn with_resources(mut self, ram: f64, download: f64, upload: f64) -> Self {
        self.ram = ram;
        self.download = download;
        self.upload = upload;
        self
    }

    pub fn with_communication(mut self, local_energy: f64, remote_energy: f64) -> Self {
        self.local_energy = local_energy;
        self.remote_energy = remote_energy;
        self
    }

    /// Runtime of this task when scaled to the processor's frequency.
    pub fn runtime_on(&self, processor: &ProcessorRecord) -> f64 {
        self.time * self.reference_frequency / processor.frequency
    }

    pub fn communication_energy(&self) -> f64 {
        self.local_energy + self.remote_energy
    }
}

/// A processor with a quadratic power model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorRecord {
    pub id: usize,
    pub c2: f64,
    pub c1: f64,
    pub c0: f64,
    pub frequency: f64,
    pub ram: f64,
    pub download: f64,
    pub upload: f64,
}

impl ProcessorRecord {
    pub fn new(id: usize, frequency: f64) -> Self {
        Self {
            id,
            c2: 0.0,
            c1: 0.0,
            c0: 0.0,
            frequency,
            ram: 0.0,
            download: 0.0,
            upload: 0.0,
        }
    }

    pub fn with_coefficients(mut self, c2: f64, c1: f64, c0: f64) -> Self {
        self.c2 = c2;
        self.c1 = c1;
        self.c0 = c0;
        self
    }

    pub fn with_capacity(mut self, ram: f64, download: f64, upload: f64) -> Self {
        self.ram = ram;
        self.download = download;
        self.upload = upload;
        self
    }

    /// c2·f² + c1·f + c0
    pub fn energy_per_second(&self) -> f64 {
        let f = self.frequency;
        self.c2 * f * f + self.c1 * f + self.c0
    }

    /// Processing, local and remote energy of running `task` here.
    pub fn task_energy(&self, task: &TaskRecord) -> f64 {
        self.energy_per_second() * task.runtime_on(self) + task.communication_energy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_per_second_is_quadratic_in_frequency() {
        let p = ProcessorRecord::new(0, 2.0).with_coefficients(10.0, -25.0, 25.0);
        assert_eq!(p.energy_per_second(), 10.0 * 4.0 - 50.0 + 25.0);
    }

    #[test]
    fn runtime_scales_with_frequency() {
        let task = TaskRecord::new(0, 1.0, 2.0);
        let slow = ProcessorRecord::new(0, 1.0);
        let fast = ProcessorRecord::new(1, 4.0);
        assert_eq!(task.runtime_on(&slow), 2.0);
        assert_eq!(task.runtime_on(&fast), 0.5);
    }

    #[test]
    fn task_energy_includes_communication() {
        let task = TaskRecord::new(0, 1.0, 2.0).with_communication(0.5, 0.25);
        let p = ProcessorRecord::new(0, 2.0).with_coefficients(0.0, 0.0, 5.0);
        assert_eq!(p.task_energy(&task), 5.0 + 0.75);
    }
}
