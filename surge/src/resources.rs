use surge_core::ResourceUsage;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Single point-in-time CPU and memory sample of the current process.
///
/// Created before the run to prime the CPU counters, then consumed by [ResourceSampler::sample]
/// once the run is done. Unsupported platforms report zeros.
pub struct ResourceSampler {
    pid: Pid,
    system: Option<System>,
}

impl ResourceSampler {
    pub fn start() -> Self {
        let pid = Pid::from_u32(std::process::id());

        let system = if sysinfo::IS_SUPPORTED_SYSTEM {
            let mut system = System::new();
            refresh(&mut system, pid);
            Some(system)
        } else {
            debug!("Resource sampling is not supported on this platform.");
            None
        };

        Self { pid, system }
    }

    pub fn sample(self) -> ResourceUsage {
        let Some(mut system) = self.system else {
            return ResourceUsage::default();
        };

        refresh(&mut system, self.pid);

        match system.process(self.pid) {
            Some(process) => ResourceUsage {
                cpu_usage_percent: process.cpu_usage() as f64,
                memory_usage_mb: process.memory() as f64 / (1024. * 1024.),
            },
            None => {
                debug!("Process {} not found; reporting zero resource usage.", self.pid);
                ResourceUsage::default()
            }
        }
    }
}

fn refresh(system: &mut System, pid: Pid) {
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::new().with_cpu().with_memory(),
    );
}
