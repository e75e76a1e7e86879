//! Shared fakes for the delivery pipeline tests.
//!
//! Each test binary compiles its own copy, so not every helper is used
//! everywhere.
#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use courier_delivery::{Job, JobQueue, Transport, TransportError};
use courier_store::{
    Client, DataStore, Distribution, MemoryStore, NewClient, NewDistribution, RecipientFilter,
    UnitId,
};

/// Transport double that records calls and fails on request.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<(String, String, UnitId)>>,
    /// Number of leading calls to fail; `usize::MAX` fails forever.
    fail_first: AtomicUsize,
}

impl MockTransport {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_first: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_first: AtomicUsize::new(n),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().expect("mock lock").len()
    }

    pub fn recorded(&self) -> Vec<(String, String, UnitId)> {
        self.calls.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, text: &str, phone: &str, unit: UnitId) -> Result<(), TransportError> {
        self.calls
            .lock()
            .expect("mock lock")
            .push((text.to_string(), phone.to_string(), unit));

        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.fail_first.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(TransportError::Status { status: 500 });
        }
        Ok(())
    }
}

/// Job queue double that records submissions instead of running them.
#[derive(Default)]
pub struct RecordingQueue {
    submissions: Mutex<Vec<(Job, Duration)>>,
}

impl RecordingQueue {
    pub fn submissions(&self) -> Vec<(Job, Duration)> {
        self.submissions.lock().expect("queue lock").clone()
    }
}

impl JobQueue for RecordingQueue {
    fn submit(&self, job: Job, delay: Duration) {
        self.submissions
            .lock()
            .expect("queue lock")
            .push((job, delay));
    }
}

pub async fn add_client(store: &MemoryStore, phone: &str, operator_code: &str, tag: &str) -> Client {
    store
        .add_client(NewClient {
            phone: phone.to_string(),
            operator_code: operator_code.to_string(),
            tag: tag.to_string(),
            tz_offset_hours: 0,
        })
        .await
        .expect("add client")
}

/// A distribution whose window spans `[now - 1h, now + 1h]`.
pub async fn open_distribution(store: &MemoryStore, text: &str, filter: RecipientFilter) -> Distribution {
    let now = Utc::now();
    store
        .add_distribution(NewDistribution {
            start_at: now - TimeDelta::hours(1),
            end_at: now + TimeDelta::hours(1),
            message_text: text.to_string(),
            filter,
        })
        .await
        .expect("add distribution")
}
