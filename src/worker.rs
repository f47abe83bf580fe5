//! src/worker.rs
use crate::cache::LocalCache;
use crate::collection::InputFormat;
use crate::counters::Counters;
use crate::error::TaskError;
use crate::functions::{FileMapEmitter, MapContext, Mapper, SetupContext};
use crate::job::JobConfiguration;
use crate::master::{MapTask, TaskId};
use crate::storage::FileSystem;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(index: usize) -> Self {
        WorkerId(index)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// What every worker of one job shares.
pub struct TaskEnvironment<F> {
    pub conf: Arc<JobConfiguration>,
    pub fs: Arc<dyn FileSystem>,
    pub input_format: F,
    pub output_dir: PathBuf,
    pub attempts_dir: PathBuf,
    /// Raised once the job has given up on its workers.
    pub cancelled: Arc<AtomicBool>,
}

impl<F> TaskEnvironment<F> {
    fn check_cancelled(&self) -> Result<(), TaskError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(TaskError::Cancelled);
        }
        Ok(())
    }
}

impl<F: Clone> Clone for TaskEnvironment<F> {
    fn clone(&self) -> Self {
        TaskEnvironment {
            conf: self.conf.clone(),
            fs: self.fs.clone(),
            input_format: self.input_format.clone(),
            output_dir: self.output_dir.clone(),
            attempts_dir: self.attempts_dir.clone(),
            cancelled: self.cancelled.clone(),
        }
    }
}

pub struct TaskReport {
    pub task_id: TaskId,
    pub result: Result<Counters, TaskError>,
}

pub enum WorkerReport {
    /// Setup failed, so none of the assigned tasks ran.
    InitFailed {
        worker_id: WorkerId,
        tasks: Vec<TaskId>,
        error: TaskError,
    },
    Finished {
        worker_id: WorkerId,
        tasks: Vec<TaskReport>,
    },
}

pub struct Worker {
    id: WorkerId,
    cache: LocalCache,
    map_tasks: Vec<MapTask>,
}

impl Worker {
    pub fn new(id: WorkerId, cache: LocalCache) -> Self {
        Self {
            id,
            cache,
            map_tasks: vec![],
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn assign_map(&mut self, task: MapTask) {
        self.map_tasks.push(task);
    }

    pub fn has_task(&self) -> bool {
        !self.map_tasks.is_empty()
    }

    /// Sets the mapper up once, then runs the assigned tasks in order. A
    /// failing task does not stop the ones after it.
    #[tracing::instrument(name = "Run worker", skip_all, fields(worker = %self.id, tasks = self.map_tasks.len()))]
    pub fn run<M, F>(self, env: &TaskEnvironment<F>) -> WorkerReport
    where
        F: InputFormat,
        M: Mapper<Input = F::Document>,
    {
        let setup = SetupContext {
            conf: &env.conf,
            cache: &self.cache,
            fs: env.fs.as_ref(),
        };
        let mut mapper = match M::setup(&setup) {
            Ok(mapper) => mapper,
            Err(error) => {
                tracing::error!(error = ?error, "Worker setup failed");
                return WorkerReport::InitFailed {
                    worker_id: self.id,
                    tasks: self.map_tasks.iter().map(|task| task.task_id).collect(),
                    error,
                };
            }
        };

        let tasks = self
            .map_tasks
            .iter()
            .map(|task| {
                let result = run_task(&mut mapper, task, env);
                match &result {
                    Ok(counters) => tracing::debug!(task = %task.task_id, ?counters, "Task done"),
                    Err(error) => tracing::error!(task = %task.task_id, error = ?error, "Task failed"),
                }
                TaskReport {
                    task_id: task.task_id,
                    result,
                }
            })
            .collect();
        WorkerReport::Finished {
            worker_id: self.id,
            tasks,
        }
    }
}

// Output goes to a per-attempt file that only replaces the committed part
// file once the whole split has been mapped.
fn run_task<M, F>(
    mapper: &mut M,
    task: &MapTask,
    env: &TaskEnvironment<F>,
) -> Result<Counters, TaskError>
where
    F: InputFormat,
    M: Mapper<Input = F::Document>,
{
    env.check_cancelled()?;
    let output_name = task.task_id.output_name();
    let attempt_path = env
        .attempts_dir
        .join(task.attempt_name())
        .join(&output_name);
    let mut emitter = FileMapEmitter::new(env.fs.create(&attempt_path)?);
    let mut counters = Counters::default();

    let reader = env
        .input_format
        .create_reader(&task.input_split, env.fs.as_ref())?;
    {
        let mut context = MapContext::new(&mut counters, &mut emitter);
        for record in reader {
            env.check_cancelled()?;
            let (offset, document) = record?;
            mapper.map(offset, document, &mut context)?;
        }
    }
    let records = emitter.close()?;

    env.check_cancelled()?;
    env.fs.rename(&attempt_path, &env.output_dir.join(&output_name))?;
    tracing::debug!(task = %task.task_id, records, "Committed task output");
    Ok(counters)
}
