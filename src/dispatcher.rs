use tracing::{debug, warn};

use crate::{
    link::{LinkError, McuLink},
    protocol::Frame,
};

// Retry wrapper around a link: one attempt plus up to `retries` immediate
// retries, the last error is reported once they are exhausted
pub struct Dispatcher<L: McuLink> {
    link: L,
    retries: u32,
}

impl<L: McuLink> Dispatcher<L> {
    pub fn new(link: L, retries: u32) -> Self {
        Self { link, retries }
    }

    pub fn send(
        &mut self,
        request: &Frame,
        expect_response: bool,
    ) -> Result<Option<Frame>, LinkError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("Sending {request}, attempt {attempt}");

            match self.link.exchange(request, expect_response) {
                Ok(reply) => return Ok(reply),
                Err(err) if attempt <= self.retries => {
                    warn!("Attempt {attempt} for {request} failed: {err}");
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::{ACK, DEVICE_READY},
        testing::MockLink,
    };

    #[test]
    fn succeeds_after_k_failures() {
        for failures in 0..=3 {
            let mut dispatcher = Dispatcher::new(MockLink::failing(failures), 3);

            assert!(dispatcher.send(&DEVICE_READY, false).is_ok());
            assert_eq!(dispatcher.link().calls(), failures + 1);
        }
    }

    #[test]
    fn gives_up_after_retries() {
        let mut dispatcher = Dispatcher::new(MockLink::failing(usize::MAX), 5);

        let err = dispatcher.send(&DEVICE_READY, false).unwrap_err();

        assert!(matches!(err, LinkError::Io(_)));
        assert_eq!(dispatcher.link().calls(), 6);
    }

    #[test]
    fn no_retries_means_single_attempt() {
        let mut dispatcher = Dispatcher::new(MockLink::failing(1), 0);

        assert!(dispatcher.send(&DEVICE_READY, false).is_err());
        assert_eq!(dispatcher.link().calls(), 1);
    }

    #[test]
    fn forwards_response() {
        let mut link = MockLink::default();
        link.respond_with(ACK);
        let mut dispatcher = Dispatcher::new(link, 1);

        let reply = dispatcher.send(&ACK, true).unwrap();

        assert_eq!(reply, Some(ACK));
    }
}
