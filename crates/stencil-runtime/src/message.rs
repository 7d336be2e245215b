//! Commander -> worker control messages (spec §5.E, ported from the
//! `bcast`/`scatter`/`'finalize'` sentinel protocol of `mpi_worker_main`).

use crate::custom_func::CustomFn;
use crate::task::TaskDescriptor;

#[derive(Clone)]
pub enum Envelope {
    Task {
        descriptor: TaskDescriptor,
        return_result: bool,
    },
    RegisterFunc {
        name: String,
        func: CustomFn,
    },
    Finalize,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Envelope::Task { descriptor, return_result } => f
                .debug_struct("Task")
                .field("descriptor", descriptor)
                .field("return_result", return_result)
                .finish(),
            Envelope::RegisterFunc { name, .. } => {
                f.debug_struct("RegisterFunc").field("name", name).finish()
            }
            Envelope::Finalize => write!(f, "Finalize"),
        }
    }
}
