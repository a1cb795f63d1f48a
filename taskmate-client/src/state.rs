//! Application state and the pure reducer that evolves it.

use taskmate_core::{FetchStatus, Operation, Task, TaskEdit, TaskError, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub list: Vec<Task>,
    pub status: FetchStatus,
    pub error: Option<String>,
}

impl TaskState {
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.list.iter().find(|task| task.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.list.iter_mut().find(|task| task.id == id)
    }
}

/// The successful result of a synchronisation operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDelta {
    Loaded(Vec<Task>),
    Created(Task),
    Updated(TaskEdit),
    Deleted(String),
    Completed(String),
}

impl TaskDelta {
    pub fn operation(&self) -> Operation {
        match self {
            TaskDelta::Loaded(_) => Operation::Fetch,
            TaskDelta::Created(_) => Operation::Create,
            TaskDelta::Updated(_) => Operation::Update,
            TaskDelta::Deleted(_) => Operation::Delete,
            TaskDelta::Completed(_) => Operation::Complete,
        }
    }

    /// The task this delta concerns, if it concerns a single one.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskDelta::Loaded(_) => None,
            TaskDelta::Created(task) => Some(&task.id),
            TaskDelta::Updated(edit) => Some(&edit.id),
            TaskDelta::Deleted(id) | TaskDelta::Completed(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    FetchRequested,
    /// A requested fetch was abandoned; carries the status from before the request.
    FetchCancelled(FetchStatus),
    Applied(TaskDelta),
    Failed(TaskError),
}

impl From<Result<TaskDelta, TaskError>> for TaskEvent {
    fn from(result: Result<TaskDelta, TaskError>) -> Self {
        match result {
            Ok(delta) => TaskEvent::Applied(delta),
            Err(e) => TaskEvent::Failed(e),
        }
    }
}

/// Compute the next state. Never performs I/O.
pub fn reduce(mut state: TaskState, event: &TaskEvent) -> TaskState {
    match event {
        TaskEvent::FetchRequested => {
            state.status = FetchStatus::Loading;
        }
        TaskEvent::FetchCancelled(previous) => {
            // Only undo our own Loading; a later result already settled it.
            if state.status == FetchStatus::Loading {
                state.status = *previous;
            }
        }
        TaskEvent::Applied(TaskDelta::Loaded(tasks)) => {
            state.status = FetchStatus::Succeeded;
            state.list = tasks.clone();
        }
        TaskEvent::Applied(TaskDelta::Created(task)) => match state.find_mut(&task.id) {
            Some(existing) => *existing = task.clone(),
            None => state.list.push(task.clone()),
        },
        TaskEvent::Applied(TaskDelta::Updated(edit)) => {
            if let Some(existing) = state.find_mut(&edit.id) {
                existing.apply_edit(edit);
            }
        }
        TaskEvent::Applied(TaskDelta::Deleted(id)) => {
            state.status = FetchStatus::Succeeded;
            state.list.retain(|task| task.id != *id);
        }
        TaskEvent::Applied(TaskDelta::Completed(id)) => {
            state.status = FetchStatus::Succeeded;
            if let Some(existing) = state.find_mut(id) {
                existing.status = TaskStatus::Completed;
            }
        }
        TaskEvent::Failed(e) => match e.operation {
            Operation::Fetch | Operation::Complete => {
                state.status = FetchStatus::Failed;
                state.error = Some(e.kind.to_string());
            }
            // Surfaced as notifications only.
            Operation::Create | Operation::Update | Operation::Delete => {}
        },
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmate_core::StoreError;

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            date: None,
            status: TaskStatus::Pending,
        }
    }

    fn loaded(tasks: Vec<Task>) -> TaskState {
        reduce(
            TaskState::default(),
            &TaskEvent::Applied(TaskDelta::Loaded(tasks)),
        )
    }

    #[test]
    fn test_fetch_lifecycle() {
        let state = reduce(TaskState::default(), &TaskEvent::FetchRequested);
        assert_eq!(state.status, FetchStatus::Loading);

        let state = reduce(
            state,
            &TaskEvent::Applied(TaskDelta::Loaded(vec![task("a", "A")])),
        );
        assert_eq!(state.status, FetchStatus::Succeeded);
        assert_eq!(state.list.len(), 1);

        let state = reduce(
            state,
            &TaskEvent::Failed(TaskError::fetch(StoreError::Transport("offline".into()))),
        );
        assert_eq!(state.status, FetchStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("Transport error: offline"));
    }

    #[test]
    fn test_cancelled_fetch_restores_previous_status() {
        let state = loaded(vec![task("a", "A")]);
        let loading = reduce(state.clone(), &TaskEvent::FetchRequested);

        let restored = reduce(loading, &TaskEvent::FetchCancelled(FetchStatus::Succeeded));
        assert_eq!(restored, state);

        let idle = reduce(TaskState::default(), &TaskEvent::FetchRequested);
        let idle = reduce(idle, &TaskEvent::FetchCancelled(FetchStatus::Idle));
        assert_eq!(idle.status, FetchStatus::Idle);
    }

    #[test]
    fn test_cancellation_after_settled_fetch_is_ignored() {
        let state = loaded(vec![task("a", "A")]);
        let next = reduce(state.clone(), &TaskEvent::FetchCancelled(FetchStatus::Idle));
        assert_eq!(next, state);
    }

    #[test]
    fn test_created_task_is_appended_once() {
        let state = loaded(vec![task("a", "A")]);
        let state = reduce(state, &TaskEvent::Applied(TaskDelta::Created(task("b", "B"))));
        let state = reduce(state, &TaskEvent::Applied(TaskDelta::Created(task("b", "B2"))));

        let ids: Vec<&str> = state.list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.find("b").unwrap().title, "B2");
    }

    #[test]
    fn test_update_of_unknown_task_is_noop() {
        let state = loaded(vec![task("a", "A")]);
        let edit = TaskEdit {
            id: "zzz".to_string(),
            title: "Nope".to_string(),
            description: String::new(),
            date: None,
        };
        let next = reduce(state.clone(), &TaskEvent::Applied(TaskDelta::Updated(edit)));
        assert_eq!(next, state);
    }

    #[test]
    fn test_complete_sets_status_and_is_idempotent() {
        let state = loaded(vec![task("a", "A"), task("b", "B")]);
        let event = TaskEvent::Applied(TaskDelta::Completed("a".to_string()));

        let once = reduce(state, &event);
        let twice = reduce(once.clone(), &event);

        assert_eq!(once.find("a").unwrap().status, TaskStatus::Completed);
        assert_eq!(once.find("b").unwrap().status, TaskStatus::Pending);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_complete_failure_marks_store_failed() {
        let state = loaded(vec![task("a", "A")]);
        let next = reduce(
            state,
            &TaskEvent::Failed(TaskError::complete(StoreError::NotFound("ghost".into()))),
        );

        assert_eq!(next.status, FetchStatus::Failed);
        assert_eq!(next.error.as_deref(), Some("Document not found: ghost"));
        assert_eq!(next.list.len(), 1);
    }

    #[test]
    fn test_delete_and_edit_failures_leave_state_alone() {
        let state = loaded(vec![task("a", "A")]);
        for err in [
            TaskError::delete(StoreError::Rejected("no".into())),
            TaskError::update(StoreError::Rejected("no".into())),
            TaskError::create(StoreError::Rejected("no".into())),
        ] {
            assert_eq!(reduce(state.clone(), &TaskEvent::Failed(err)), state);
        }
    }

    #[test]
    fn test_event_from_result() {
        let ok: Result<TaskDelta, TaskError> = Ok(TaskDelta::Deleted("a".into()));
        assert!(matches!(TaskEvent::from(ok), TaskEvent::Applied(_)));

        let err: Result<TaskDelta, TaskError> = Err(TaskError::delete(StoreError::NotFound("a".into())));
        assert!(matches!(TaskEvent::from(err), TaskEvent::Failed(_)));
    }
}
