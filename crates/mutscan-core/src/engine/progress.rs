/// Events emitted by long-running workflows. Front-ends decide how to render them.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: String },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskAdvance { steps: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + 'a>;

/// Forwards [`Progress`] events to an optional callback; silent when none is set.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn phase(&self, name: impl Into<String>) {
        self.report(Progress::PhaseStart { name: name.into() });
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.phase("nothing happens");
        reporter.report(Progress::TaskFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let events = RefCell::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|e| events.borrow_mut().push(e)));
        reporter.phase("Sampling");
        reporter.report(Progress::TaskAdvance { steps: 3 });
        reporter.message("done");
        drop(reporter);
        assert_eq!(
            events.into_inner(),
            vec![
                Progress::PhaseStart {
                    name: "Sampling".to_string()
                },
                Progress::TaskAdvance { steps: 3 },
                Progress::Message("done".to_string()),
            ]
        );
    }
}
