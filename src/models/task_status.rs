use std::sync::mpsc::Sender;

/// A human readable description of what an operation is doing.
/// `sub` carries the detail line (e.g. the file being copied) under a headline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    pub main: String,
    pub sub: Option<String>,
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sub {
            Some(sub) if self.main.is_empty() => write!(f, "{sub}"),
            Some(sub) => write!(f, "{}: {sub}", self.main),
            None => write!(f, "{}", self.main),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: Option<u64>,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.total {
            Some(total) => write!(f, "{}/{total}", self.current),
            None => write!(f, "{}/?", self.current),
        }
    }
}

impl Progress {
    pub fn of(current: u64, total: u64) -> Self {
        Self {
            current,
            total: Some(total),
        }
    }

    /// Percentage complete. A zero total counts as already complete.
    pub fn percent(&self) -> u8 {
        match self.total {
            None => 0,
            Some(0) => 100,
            Some(total) => ((self.current.min(total) * 100) / total) as u8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Activity(Activity),
    Progress(Progress),
}

/// Progress sink handed to every long running operation.
/// Called synchronously on whatever thread runs the operation.
pub trait Reporter {
    fn emit(&self, status: TaskStatus);
}

impl dyn Reporter + '_ {
    pub fn main(&self, main: impl Into<String>) {
        self.emit(TaskStatus::Activity(Activity {
            main: main.into(),
            sub: None,
        }));
    }

    pub fn sub(&self, sub: impl Into<String>) {
        self.emit(TaskStatus::Activity(Activity {
            main: String::new(),
            sub: Some(sub.into()),
        }));
    }

    pub fn step(&self, current: u64, total: u64) {
        self.emit(TaskStatus::Progress(Progress::of(current, total)));
    }
}

impl<F> Reporter for F
where
    F: Fn(TaskStatus),
{
    fn emit(&self, status: TaskStatus) {
        self(status)
    }
}

/// Discards every status.
pub struct Silent;

impl Reporter for Silent {
    fn emit(&self, _status: TaskStatus) {}
}

/// Forwards statuses to another thread. A closed receiver is ignored.
pub struct ChannelReporter(pub Sender<TaskStatus>);

impl Reporter for ChannelReporter {
    fn emit(&self, status: TaskStatus) {
        let _ = self.0.send(status);
    }
}
