use std::{collections::VecDeque, io};

use crate::{
    link::{LinkError, McuLink},
    protocol::Frame,
};

// Call counting link used by the unit tests. Queries are answered from the
// queued responses, everything else is acknowledged
#[derive(Debug, Default)]
pub struct MockLink {
    sent: Vec<Frame>,

    // Number of leading calls that fail whatever the request
    fail_first: usize,

    // Requests that always fail
    rejected: Vec<Frame>,

    responses: VecDeque<Frame>,
}

impl MockLink {
    pub fn failing(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Default::default()
        }
    }

    pub fn respond_with(&mut self, frame: Frame) {
        self.responses.push_back(frame);
    }

    pub fn reject(&mut self, request: Frame) {
        self.rejected.push(request);
    }

    pub fn calls(&self) -> usize {
        self.sent.len()
    }

    pub fn sent(&self) -> &[Frame] {
        &self.sent
    }

    pub fn count(&self, request: &Frame) -> usize {
        self.sent.iter().filter(|sent| *sent == request).count()
    }
}

impl McuLink for MockLink {
    fn exchange(
        &mut self,
        request: &Frame,
        expect_response: bool,
    ) -> Result<Option<Frame>, LinkError> {
        self.sent.push(*request);

        if self.sent.len() <= self.fail_first || self.rejected.contains(request) {
            return Err(io::Error::from(io::ErrorKind::TimedOut).into());
        }

        if !expect_response {
            return Ok(None);
        }

        self.responses
            .pop_front()
            .map(Some)
            .ok_or_else(|| io::Error::from(io::ErrorKind::TimedOut).into())
    }
}
