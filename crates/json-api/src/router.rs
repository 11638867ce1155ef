//! App Router

use salvo::Router;

use crate::{links, rate_limit::IssueRateLimiter};

/// Access link routes. Issuance sits behind the rate limiter; redemption
/// and deactivation do not.
pub(crate) fn app_router(limiter: IssueRateLimiter) -> Router {
    Router::with_path("api")
        .push(
            Router::new()
                .hoop(limiter)
                .push(
                    Router::with_path("generate-magic-link")
                        .post(links::generate_magic_link::handler),
                )
                .push(
                    Router::with_path("generate-permanent-magic-link")
                        .post(links::generate_permanent::handler),
                )
                .push(
                    Router::with_path("get-permanent-link")
                        .get(links::get_permanent_link::handler),
                ),
        )
        .push(Router::with_path("verify-magic-link").get(links::verify_magic_link::handler))
        .push(
            Router::with_path("verify-permanent-magic-link")
                .get(links::verify_permanent::handler),
        )
        .push(
            Router::with_path("deactivate-permanent-magic-link")
                .post(links::deactivate_permanent::handler),
        )
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use salvo::{
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use serde_json::json;
    use testresult::TestResult;

    use quotelink_app::{
        domain::access_links::{AccessLinksServiceError, MockAccessLinksService},
        tokens::TokenKind,
    };

    use crate::test_helpers::{
        TEST_BEARER, TEST_EMAIL, TEST_QUOTE_ID, links_service, make_issued_link,
        strict_links_mock,
    };

    use super::*;

    fn service(links: MockAccessLinksService, limit: u32) -> Service {
        links_service(
            links,
            app_router(IssueRateLimiter::new(limit, SignedDuration::from_mins(15))),
        )
    }

    #[tokio::test]
    async fn issuance_beyond_the_limit_never_reaches_the_service() -> TestResult {
        let link = make_issued_link(TokenKind::EphemeralAccess);

        let mut links = MockAccessLinksService::new();

        links
            .expect_issue_ephemeral()
            .once()
            .return_once(move |_, _, _| Ok(link));

        let service = service(links, 1);

        let first = TestClient::post("http://example.com/api/generate-magic-link")
            .json(&json!({ "quoteId": TEST_QUOTE_ID, "email": TEST_EMAIL }))
            .send(&service)
            .await;

        let second = TestClient::post("http://example.com/api/generate-magic-link")
            .json(&json!({ "quoteId": TEST_QUOTE_ID, "email": TEST_EMAIL }))
            .send(&service)
            .await;

        assert_eq!(first.status_code, Some(StatusCode::OK));
        assert_eq!(second.status_code, Some(StatusCode::TOO_MANY_REQUESTS));

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_limit_blocks_every_call() -> TestResult {
        let service = service(strict_links_mock(), 0);

        let res = TestClient::get(format!(
            "http://example.com/api/get-permanent-link?quoteId={TEST_QUOTE_ID}&email={TEST_EMAIL}"
        ))
        .send(&service)
        .await;

        assert_eq!(res.status_code, Some(StatusCode::TOO_MANY_REQUESTS));

        Ok(())
    }

    #[tokio::test]
    async fn redemption_is_not_rate_limited() -> TestResult {
        let mut links = MockAccessLinksService::new();

        links
            .expect_redeem_permanent()
            .times(3)
            .returning(|_, _| Err(AccessLinksServiceError::Deactivated));

        let service = service(links, 0);

        for _ in 0..3 {
            let mut res = TestClient::get(format!(
                "http://example.com/api/verify-permanent-magic-link?token={TEST_BEARER}"
            ))
            .send(&service)
            .await;

            assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
            assert!(res.take_string().await.is_ok(), "body should be readable");
        }

        Ok(())
    }
}
