//! Scripted failures for a [`MemoryTaskSource`](crate::mock_source::MemoryTaskSource)

use std::collections::HashMap;

use reqwest::StatusCode;

use crate::error::Error;

/// The operations of a task source that can be scripted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    SetCompleted,
    ExcludeDate,
}

const ALL_OPERATIONS: [Operation; 6] = [
    Operation::List,
    Operation::Create,
    Operation::Update,
    Operation::Delete,
    Operation::SetCompleted,
    Operation::ExcludeDate,
];

/// What happens to the next calls of an operation: `successes` calls go through,
/// then `failures` calls are rejected, then everything goes through again
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Script {
    pub successes: u32,
    pub failures: u32,
}

impl Script {
    /// Consume one step. Returns whether the call must fail
    fn step(&mut self) -> bool {
        if self.successes > 0 {
            self.successes -= 1;
            false
        } else if self.failures > 0 {
            self.failures -= 1;
            true
        } else {
            false
        }
    }
}


/// A set of [`Script`]s, one per operation. Operations without a script always succeed
#[derive(Clone, Debug, Default)]
pub struct MockBehaviour {
    scripts: HashMap<Operation, Script>,
    suspended: bool,
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails for its next `n_fails` calls
    pub fn fail_now(n_fails: u32) -> Self {
        let mut behaviour = Self::new();
        for op in ALL_OPERATIONS.iter() {
            behaviour = behaviour.script(*op, 0, n_fails);
        }
        behaviour
    }

    /// `op` succeeds `successes` times, then fails `failures` times
    pub fn script(mut self, op: Operation, successes: u32, failures: u32) -> Self {
        self.scripts.insert(op, Script { successes, failures });
        self
    }

    /// Let every call through (scripts are left untouched) until [`Self::resume`] is called
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Record a call to `op`, and return the error it must fail with, if any
    pub fn check(&mut self, op: Operation) -> Result<(), Error> {
        if self.suspended {
            return Ok(());
        }

        let fails = self.scripts.get_mut(&op).map_or(false, |script| script.step());
        if fails {
            log::debug!("Injecting a failure in {:?} (left: {:?})", op, self.scripts.get(&op));
            return Err(Error::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: Some(format!("injected failure of {:?}", op)),
            });
        }
        Ok(())
    }
}
