//! Status/error text resolution
//!
//! Text comes from the transport's lookup commands. A failed lookup yields
//! `None`; it is never resolved through the resolver again.

use obidrfid_core::{classify, Classification, Outcome};
use obidrfid_transport::Transport;

use crate::error::Result;

/// Looks up human text for reply codes
pub struct Resolver<'a> {
    transport: &'a mut dyn Transport,
}

impl<'a> Resolver<'a> {
    pub fn new(transport: &'a mut dyn Transport) -> Self {
        Self { transport }
    }

    /// Text of a reader status code
    pub async fn status_text(&mut self, code: i32) -> Result<Option<String>> {
        let reply = self.transport.status_text(code).await?;
        Ok((reply.code == 0).then_some(reply.text))
    }

    /// Text of an error code
    pub async fn error_text(&mut self, code: i32) -> Result<Option<String>> {
        let reply = self.transport.error_text(code).await?;
        Ok((reply.code == 0).then_some(reply.text))
    }

    /// Text for any non-success code, using the lookup matching its class
    pub async fn text(&mut self, code: i32) -> Result<Option<String>> {
        match classify(code) {
            Classification::Success => Ok(None),
            Classification::Status => self.status_text(code).await,
            Classification::Error => self.error_text(code).await,
        }
    }

    /// Fill in the text of a Status/Error outcome
    pub async fn refine<T>(&mut self, outcome: Outcome<T>) -> Result<Outcome<T>> {
        if outcome.is_success() {
            return Ok(outcome);
        }

        let text = self.text(outcome.code()).await?;
        Ok(outcome.with_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;
    use mockall::predicate::eq;
    use obidrfid_transport::TextReply;

    #[tokio::test]
    async fn test_success_needs_no_lookup() {
        let mut transport = MockTransport::new();
        transport.expect_status_text().times(0);
        transport.expect_error_text().times(0);

        let mut resolver = Resolver::new(&mut transport);
        let outcome = resolver.refine(Outcome::Success(7)).await.unwrap();

        assert_eq!(outcome, Outcome::Success(7));
        assert_eq!(resolver.text(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_by_class() {
        let mut transport = MockTransport::new();
        transport
            .expect_status_text()
            .with(eq(0x83))
            .times(1)
            .returning(|_| Ok(TextReply::ok("RF Communication Error")));
        transport
            .expect_error_text()
            .with(eq(-4))
            .times(1)
            .returning(|_| Ok(TextReply::ok("Malformed response frame")));

        let mut resolver = Resolver::new(&mut transport);

        let status: Outcome<()> = Outcome::Status { code: 0x83, text: None };
        let status = resolver.refine(status).await.unwrap();
        assert_eq!(status.text(), Some("RF Communication Error"));

        let error: Outcome<()> = Outcome::Error { code: -4, text: None };
        let error = resolver.refine(error).await.unwrap();
        assert_eq!(error.text(), Some("Malformed response frame"));
    }

    #[tokio::test]
    async fn test_failed_lookup_degrades_to_none() {
        let mut transport = MockTransport::new();
        transport
            .expect_error_text()
            .times(1)
            .returning(|_| Ok(TextReply::failed(-7)));

        let mut resolver = Resolver::new(&mut transport);
        assert_eq!(resolver.error_text(-99).await.unwrap(), None);
    }
}
