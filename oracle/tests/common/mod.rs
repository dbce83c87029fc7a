//! In-memory driver that records every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use sqljson_oracle::DriverError;
use sqljson_oracle::driver::{
    Binds, ColumnDescription, DriverConnection, DriverCursor, InputSizes, RawCell,
};

#[derive(Debug, Default)]
pub struct State {
    pub executed: Vec<(String, Binds)>,
    pub executed_many: Vec<(String, Vec<Binds>)>,
    pub input_sizes: Vec<InputSizes>,
    pub commits: usize,
    pub closed: usize,
    pub stmt_cache_size: Option<u32>,
    pub autocommit: bool,
    pub unreachable: bool,
    /// Statements starting with the prefix fail with the error.
    pub failures: Vec<(String, DriverError)>,
    pub close_error: Option<DriverError>,
    pub commit_error: Option<DriverError>,
    pub description: Vec<ColumnDescription>,
    pub rows: VecDeque<Vec<RawCell>>,
}

impl State {
    pub fn statements(&self) -> Vec<&str> {
        self.executed.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

pub type Shared = Rc<RefCell<State>>;

pub struct MockConnection {
    pub state: Shared,
}

impl MockConnection {
    pub fn new() -> (Self, Shared) {
        let state = Shared::default();
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

pub struct MockCursor {
    state: Shared,
}

impl MockCursor {
    pub fn new(state: Shared) -> Self {
        Self { state }
    }

    fn failure(&self, sql: &str) -> Option<DriverError> {
        self.state
            .borrow()
            .failures
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, err)| err.clone())
    }
}

impl DriverCursor for MockCursor {
    fn execute(&mut self, sql: &str, binds: &Binds) -> Result<(), DriverError> {
        self.state
            .borrow_mut()
            .executed
            .push((sql.to_string(), binds.clone()));
        self.failure(sql).map_or(Ok(()), Err)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Binds]) -> Result<(), DriverError> {
        self.state
            .borrow_mut()
            .executed_many
            .push((sql.to_string(), rows.to_vec()));
        self.failure(sql).map_or(Ok(()), Err)
    }

    fn set_input_sizes(&mut self, sizes: &InputSizes) -> Result<(), DriverError> {
        self.state.borrow_mut().input_sizes.push(sizes.clone());
        Ok(())
    }

    fn description(&self) -> Vec<ColumnDescription> {
        self.state.borrow().description.clone()
    }

    fn fetch_row(&mut self) -> Result<Option<Vec<RawCell>>, DriverError> {
        Ok(self.state.borrow_mut().rows.pop_front())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        state.closed += 1;
        state.close_error.clone().map_or(Ok(()), Err)
    }
}

impl DriverConnection for MockConnection {
    type Cursor = MockCursor;

    fn cursor(&mut self) -> Result<MockCursor, DriverError> {
        Ok(MockCursor::new(self.state.clone()))
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        state.commits += 1;
        state.commit_error.clone().map_or(Ok(()), Err)
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn autocommit(&self) -> bool {
        self.state.borrow().autocommit
    }

    fn set_autocommit(&mut self, on: bool) -> Result<(), DriverError> {
        self.state.borrow_mut().autocommit = on;
        Ok(())
    }

    fn set_stmt_cache_size(&mut self, size: u32) {
        self.state.borrow_mut().stmt_cache_size = Some(size);
    }

    fn ping(&mut self) -> Result<(), DriverError> {
        if self.state.borrow().unreachable {
            return Err(DriverError::interface("not connected"));
        }
        Ok(())
    }
}
