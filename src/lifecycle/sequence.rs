/*!
 * Ordered Initialization with Unwind
 *
 * Stages are `(init, uninit)` pairs run in order. The first failing stage
 * stops the run and every completed stage is uninitialized in reverse, so the
 * live set is always a prefix of the order and never survives a failure.
 */

use crate::core::errors::{SubsystemError, SubsystemResult};
use crate::core::types::SubsystemId;
use tracing::{debug, warn};

type InitFn<'a> = Box<dyn Fn() -> SubsystemResult<()> + 'a>;
type UninitFn<'a> = Box<dyn Fn() + 'a>;

/// One named step of an initialization sequence
pub struct Stage<'a> {
    id: SubsystemId,
    init: InitFn<'a>,
    uninit: UninitFn<'a>,
}

impl<'a> Stage<'a> {
    pub fn fallible(
        id: SubsystemId,
        init: impl Fn() -> SubsystemResult<()> + 'a,
        uninit: impl Fn() + 'a,
    ) -> Self {
        Self {
            id,
            init: Box::new(init),
            uninit: Box::new(uninit),
        }
    }

    pub fn infallible(id: SubsystemId, init: impl Fn() + 'a, uninit: impl Fn() + 'a) -> Self {
        Self::fallible(
            id,
            move || {
                init();
                Ok(())
            },
            uninit,
        )
    }

    #[inline]
    pub fn id(&self) -> SubsystemId {
        self.id
    }
}

/// Why a sequence stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceFailure {
    /// Stage whose init failed
    pub failed: SubsystemId,
    /// Completed stages, in the order they were uninitialized
    pub rolled_back: Vec<SubsystemId>,
    pub error: SubsystemError,
}

/// Ordered list of stages
#[derive(Default)]
pub struct InitSequence<'a> {
    stages: Vec<Stage<'a>>,
}

impl<'a> InitSequence<'a> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage<'a>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn ids(&self) -> Vec<SubsystemId> {
        self.stages.iter().map(Stage::id).collect()
    }

    /// Initialize every stage in order
    ///
    /// Returns the number of initialized stages, or the failure after the
    /// completed prefix was rolled back.
    pub fn initialize(&self) -> Result<usize, SequenceFailure> {
        for (completed, stage) in self.stages.iter().enumerate() {
            if let Err(error) = (stage.init)() {
                warn!(
                    subsystem = %stage.id,
                    completed,
                    error = %error,
                    "Subsystem initialization failed, unwinding"
                );
                let rolled_back = self.unwind(completed);
                return Err(SequenceFailure {
                    failed: stage.id,
                    rolled_back,
                    error,
                });
            }
            debug!(subsystem = %stage.id, "Subsystem initialized");
        }
        Ok(self.stages.len())
    }

    /// Uninitialize the first `completed` stages in reverse order
    pub fn unwind(&self, completed: usize) -> Vec<SubsystemId> {
        let completed = completed.min(self.stages.len());
        self.stages[..completed]
            .iter()
            .rev()
            .map(|stage| {
                (stage.uninit)();
                debug!(subsystem = %stage.id, "Subsystem rolled back");
                stage.id
            })
            .collect()
    }
}
