//! src/job.rs
use crate::cache::LocalCache;
use crate::collection::InputFormat;
use crate::configuration::{ClusterSettings, JobSettings, Settings};
use crate::counters::Counters;
use crate::error::{JobError, TaskError};
use crate::file_splitter::{FileSplitter, InputSplit};
use crate::functions::Mapper;
use crate::master::{Master, TaskId};
use crate::storage::FileSystem;
use crate::worker::{TaskEnvironment, Worker, WorkerId, WorkerReport};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinSet;
use uuid::Uuid;

const TEMPORARY_DIR: &str = "_temporary";
const SUCCESS_MARKER: &str = "_SUCCESS";

/// Raises the shared cancellation flag when dropped, so blocking workers
/// still running after the job gives up stop before committing output.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// String properties shipped to every worker of a job.
#[derive(Clone, Debug, Default)]
pub struct JobConfiguration {
    properties: HashMap<String, String>,
}

impl JobConfiguration {
    pub fn set(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[derive(Debug)]
pub struct JobReport {
    job_id: Uuid,
    counters: Counters,
    map_tasks: usize,
}

impl JobReport {
    pub fn job_id(&self) -> &Uuid {
        &self.job_id
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn map_tasks(&self) -> usize {
        self.map_tasks
    }
}

/// A map-only job run by an in-process pool of workers.
pub struct Job {
    name: String,
    cluster: ClusterSettings,
    settings: JobSettings,
    fs: Arc<dyn FileSystem>,
    conf: JobConfiguration,
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    cache_files: Vec<PathBuf>,
    num_reduce_tasks: u32,
}

impl Job {
    pub fn new(name: &str, settings: &Settings, fs: Arc<dyn FileSystem>) -> Self {
        Job {
            name: name.to_string(),
            cluster: settings.cluster.clone(),
            settings: settings.job.clone(),
            fs,
            conf: JobConfiguration::default(),
            input_path: None,
            output_path: None,
            cache_files: vec![],
            num_reduce_tasks: 1,
        }
    }

    pub fn conf_mut(&mut self) -> &mut JobConfiguration {
        &mut self.conf
    }

    pub fn set_input_path(&mut self, path: &Path) {
        self.input_path = Some(path.to_path_buf());
    }

    pub fn set_output_path(&mut self, path: &Path) {
        self.output_path = Some(path.to_path_buf());
    }

    /// Files copied into every worker's local cache before any task starts.
    pub fn add_cache_file(&mut self, path: &Path) {
        self.cache_files.push(path.to_path_buf());
    }

    pub fn set_num_reduce_tasks(&mut self, num_reduce_tasks: u32) {
        self.num_reduce_tasks = num_reduce_tasks;
    }

    /// Runs the job to completion, or until the configured timeout. On
    /// failure the counters are never exposed.
    #[tracing::instrument(name = "Run job", skip_all, fields(job = %self.name))]
    pub async fn run<M, F>(&self, input_format: F) -> Result<JobReport, JobError>
    where
        F: InputFormat,
        M: Mapper<Input = F::Document> + 'static,
    {
        if self.num_reduce_tasks != 0 {
            return Err(JobError::ReduceTasksUnsupported(self.num_reduce_tasks));
        }
        let input_path = self.input_path.as_ref().ok_or(JobError::MissingInputPath)?;
        let output_path = self
            .output_path
            .as_ref()
            .ok_or(JobError::MissingOutputPath)?;
        if self.fs.exists(output_path) {
            return Err(JobError::OutputExists(output_path.clone()));
        }

        let splits = FileSplitter::new(self.settings.split_size_in_bytes)
            .split(input_path, self.fs.as_ref())?;
        let job_id = Uuid::new_v4();
        let job_dir = self.cluster.work_dir.join(job_id.to_string());
        tracing::info!(%job_id, splits = splits.len(), "Starting job");

        let result = self
            .run_tasks::<M, F>(input_format, splits, &job_dir, output_path)
            .await;
        if let Err(e) = self.fs.delete(&job_dir, true) {
            tracing::warn!(error = ?e, "Failed to clean up {}", job_dir.display());
        }
        let (counters, map_tasks) = result?;

        self.fs.delete(&output_path.join(TEMPORARY_DIR), true)?;
        self.fs.create(&output_path.join(SUCCESS_MARKER))?;
        tracing::info!(%job_id, "Job complete");
        Ok(JobReport {
            job_id,
            counters,
            map_tasks,
        })
    }

    async fn run_tasks<M, F>(
        &self,
        input_format: F,
        splits: Vec<InputSplit>,
        job_dir: &Path,
        output_path: &Path,
    ) -> Result<(Counters, usize), JobError>
    where
        F: InputFormat,
        M: Mapper<Input = F::Document> + 'static,
    {
        let worker_count = usize::from(self.cluster.workers).max(1);
        let mut master = Master::new(worker_count, splits, self.settings.max_task_attempts);

        // One broadcast of the cache files, before any worker starts.
        let mut caches = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let dir = job_dir.join(WorkerId::new(i).to_string()).join("cache");
            caches.push(LocalCache::localize(
                &dir,
                &self.cache_files,
                self.fs.as_ref(),
            )?);
        }

        self.fs.create_dir_all(output_path)?;
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_on_exit = CancelOnDrop(cancelled.clone());
        let env = TaskEnvironment {
            conf: Arc::new(self.conf.clone()),
            fs: self.fs.clone(),
            input_format,
            output_dir: output_path.to_path_buf(),
            attempts_dir: output_path.join(TEMPORARY_DIR),
            cancelled,
        };

        let execution = self.execute::<M, F>(&mut master, &caches, &env);
        match self.settings.timeout() {
            Some(limit) => tokio::time::timeout(limit, execution)
                .await
                .map_err(|_| JobError::TimedOut(limit))??,
            None => execution.await?,
        }

        Ok((master.counters(), master.map_tasks().len()))
    }

    async fn execute<M, F>(
        &self,
        master: &mut Master,
        caches: &[LocalCache],
        env: &TaskEnvironment<F>,
    ) -> Result<(), JobError>
    where
        F: InputFormat,
        M: Mapper<Input = F::Document> + 'static,
    {
        while !master.is_complete() {
            let mut workers = JoinSet::new();
            for (i, tasks) in master.assign_tasks().into_iter().enumerate() {
                let mut worker = Worker::new(WorkerId::new(i), caches[i].clone());
                for task in tasks {
                    worker.assign_map(task);
                }
                if !worker.has_task() {
                    continue;
                }
                let worker_id = *worker.id();
                let env = env.clone();
                workers.spawn_blocking(move || {
                    let report = panic::catch_unwind(AssertUnwindSafe(|| worker.run::<M, F>(&env)));
                    (worker_id, report)
                });
            }

            while let Some(joined) = workers.join_next().await {
                let (worker_id, report) = joined.map_err(|_| JobError::Cancelled)?;
                let report = report.map_err(|_| JobError::WorkerPanicked(worker_id))?;
                handle_report(master, report)?;
            }
        }
        Ok(())
    }
}

fn handle_report(master: &mut Master, report: WorkerReport) -> Result<(), JobError> {
    match report {
        WorkerReport::Finished { tasks, .. } => {
            for task in tasks {
                match task.result {
                    Ok(counters) => master.complete(task.task_id, counters),
                    Err(error) => retry_or_fail(master, task.task_id, error)?,
                }
            }
        }
        WorkerReport::InitFailed {
            worker_id,
            tasks,
            error,
        } => {
            tracing::warn!(worker = %worker_id, "Rescheduling tasks of a worker that failed setup");
            let mut exhausted = None;
            for task_id in tasks {
                if !master.fail(task_id) && exhausted.is_none() {
                    exhausted = Some(task_id);
                }
            }
            if let Some(task) = exhausted {
                return Err(JobError::TaskFailed {
                    task,
                    attempts: master.task(task).attempt,
                    source: error,
                });
            }
        }
    }
    Ok(())
}

fn retry_or_fail(master: &mut Master, task_id: TaskId, error: TaskError) -> Result<(), JobError> {
    if master.fail(task_id) {
        tracing::warn!(task = %task_id, error = ?error, "Rescheduling failed task");
        Ok(())
    } else {
        Err(JobError::TaskFailed {
            task: task_id,
            attempts: master.task(task_id).attempt,
            source: error,
        })
    }
}
