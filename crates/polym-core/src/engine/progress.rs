use super::tools::EquilibrationKind;

#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    StepStart { bond: u32 },
    BondFormed { bond: u32, attempts: u32 },
    PerturbationPass { attempt: u32 },
    Exhausted { bond: u32 },
    EquilibrationStart { kind: EquilibrationKind },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_swallows_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::StepStart { bond: 1 });
    }

    #[test]
    fn callback_receives_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(format!("{:?}", event));
        }));

        reporter.report(Progress::StepStart { bond: 2 });
        reporter.report(Progress::BondFormed {
            bond: 2,
            attempts: 4,
        });

        drop(reporter);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("StepStart"));
        assert!(seen[1].contains("attempts: 4"));
    }
}
