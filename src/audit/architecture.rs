//! Architecture consistency across the inspected modules.

use super::finding::{ArchitectureMember, Finding};
use crate::module::{MachineKind, ModuleRecord};

/// Collects the architecture of each inspected module.
///
/// [`observe`](Self::observe) flags modules that are not architecture
/// neutral as they arrive; [`finish`](Self::finish) reports machine-kind
/// disagreement once every module has been seen.
#[derive(Debug, Default)]
pub struct ArchitectureChecker {
    seen: Vec<(MachineKind, ArchitectureMember)>,
}

impl ArchitectureChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `module` and return a finding if it targets a specific processor.
    pub fn observe(&mut self, module: &ModuleRecord) -> Option<Finding> {
        let architecture = module.architecture();
        self.seen.push((
            architecture.machine,
            ArchitectureMember {
                module: module.identity().clone(),
                file: module.file_name(),
                portability: architecture.portability,
            },
        ));

        if architecture.portability.is_portable() {
            None
        } else {
            Some(Finding::ArchitectureSpecific {
                module: module.identity().clone(),
                file: module.file_name(),
                architecture,
            })
        }
    }

    /// One finding per distinct machine kind when there is more than one,
    /// in order of first appearance.
    pub fn finish(self) -> Vec<Finding> {
        let mut machines: Vec<MachineKind> = Vec::new();
        for (machine, _) in &self.seen {
            if !machines.contains(machine) {
                machines.push(*machine);
            }
        }
        if machines.len() < 2 {
            return Vec::new();
        }

        machines
            .into_iter()
            .map(|machine| Finding::ArchitectureInconsistent {
                machine,
                modules: self
                    .seen
                    .iter()
                    .filter(|(m, _)| *m == machine)
                    .map(|(_, member)| member.clone())
                    .collect(),
            })
            .collect()
    }
}
