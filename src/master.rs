//! src/master.rs
use crate::counters::Counters;
use crate::file_splitter::InputSplit;
use crate::worker::WorkerId;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    /// Name of the part file this task commits.
    pub fn output_name(&self) -> String {
        format!("part-m-{:05}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task_m_{:05}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TaskState {
    Idle,
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug)]
pub struct MapTask {
    pub task_id: TaskId,
    pub state: TaskState,
    pub worker_id: Option<WorkerId>,
    pub attempt: u32,
    pub input_split: InputSplit,
}

impl MapTask {
    pub fn attempt_name(&self) -> String {
        format!("attempt_m_{:05}_{}", self.task_id.0, self.attempt)
    }
}

/// Tracks map tasks from assignment to completion and owns the counters of
/// every successful attempt.
pub struct Master {
    worker_count: usize,
    max_attempts: u32,
    map_tasks: Vec<MapTask>,
    counters: Vec<Counters>,
}

impl Master {
    pub fn new(worker_count: usize, input_splits: Vec<InputSplit>, max_attempts: u32) -> Self {
        let map_tasks: Vec<MapTask> = input_splits
            .into_iter()
            .enumerate()
            .map(|(i, input_split)| MapTask {
                task_id: TaskId(i),
                state: TaskState::Idle,
                worker_id: None,
                attempt: 0,
                input_split,
            })
            .collect();
        let counters = vec![Counters::default(); map_tasks.len()];
        Master {
            worker_count: worker_count.max(1),
            max_attempts: max_attempts.max(1),
            map_tasks,
            counters,
        }
    }

    /// Hands every idle task to a worker, round-robin. A retried task is
    /// shifted to the next worker so it does not land where it just failed.
    pub fn assign_tasks(&mut self) -> Vec<Vec<MapTask>> {
        let mut assignments = vec![Vec::new(); self.worker_count];
        for task in self
            .map_tasks
            .iter_mut()
            .filter(|task| task.state == TaskState::Idle)
        {
            let worker = (task.task_id.0 + task.attempt as usize) % self.worker_count;
            task.worker_id = Some(WorkerId::new(worker));
            task.state = TaskState::InProgress;
            task.attempt += 1;
            assignments[worker].push(task.clone());
        }
        assignments
    }

    pub fn complete(&mut self, task_id: TaskId, counters: Counters) {
        self.map_tasks[task_id.0].state = TaskState::Completed;
        self.counters[task_id.0] = counters;
    }

    /// Records a failed attempt. Returns `true` when the task will be
    /// offered again, `false` once its attempts are used up.
    pub fn fail(&mut self, task_id: TaskId) -> bool {
        let task = &mut self.map_tasks[task_id.0];
        if task.attempt < self.max_attempts {
            task.state = TaskState::Idle;
            task.worker_id = None;
            true
        } else {
            task.state = TaskState::Failed;
            false
        }
    }

    pub fn task(&self, task_id: TaskId) -> &MapTask {
        &self.map_tasks[task_id.0]
    }

    pub fn map_tasks(&self) -> &[MapTask] {
        &self.map_tasks
    }

    pub fn is_complete(&self) -> bool {
        self.map_tasks
            .iter()
            .all(|task| task.state == TaskState::Completed)
    }

    pub fn counters(&self) -> Counters {
        let mut total = Counters::default();
        for counters in &self.counters {
            total.merge(counters);
        }
        total
    }
}
