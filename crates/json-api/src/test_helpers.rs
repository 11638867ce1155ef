//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use quotelink_app::{
    domain::{
        access_links::{MockAccessLinksService, data::IssuedLink, data::Redemption},
        quotes::records::QuoteRecord,
    },
    tokens::{TokenKind, TokenPolicy, TokenState},
};

use crate::state::State;

pub(crate) const TEST_QUOTE_ID: &str = "WIN123";
pub(crate) const TEST_EMAIL: &str = "a@b.com";
pub(crate) const TEST_BEARER: &str = "aGVhZGVy.Y2xhaW1z.c2ln";

pub(crate) fn test_token_id() -> Uuid {
    Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001)
}

pub(crate) fn make_quote() -> QuoteRecord {
    QuoteRecord {
        quote_id: TEST_QUOTE_ID.to_string(),
        email: TEST_EMAIL.to_string(),
        full_name: Some("Ada Lovelace".to_string()),
        quote_price: Some(Decimal::new(24_999, 2)),
        vehicle_reg: Some("AB12 CDE".to_string()),
        glass_type: Some("windscreen".to_string()),
        delivery_type: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_issued_link(kind: TokenKind) -> IssuedLink {
    let (url, expires_at) = match kind {
        TokenKind::EphemeralAccess => (
            format!("https://quotes.example.com/api/verify-magic-link?token={TEST_BEARER}"),
            Some(Timestamp::UNIX_EPOCH + jiff::SignedDuration::from_hours(24)),
        ),
        TokenKind::PermanentAccess => (
            format!("https://quotes.example.com/quote-access?token={TEST_BEARER}"),
            None,
        ),
    };

    IssuedLink {
        kind,
        token_id: test_token_id(),
        url,
        expires_at,
        tracked: true,
        quote: make_quote(),
    }
}

pub(crate) fn make_redemption(kind: TokenKind, state: TokenState) -> Redemption {
    Redemption {
        claims: TokenPolicy::for_kind(kind).claims_for(
            TEST_QUOTE_ID,
            TEST_EMAIL,
            test_token_id(),
            Timestamp::UNIX_EPOCH,
        ),
        quote: make_quote(),
        state,
    }
}

/// A mock that fails the test if any operation is called.
pub(crate) fn strict_links_mock() -> MockAccessLinksService {
    let mut links = MockAccessLinksService::new();

    links.expect_issue_ephemeral().never();
    links.expect_redeem_ephemeral().never();
    links.expect_issue_permanent().never();
    links.expect_redeem_permanent().never();
    links.expect_deactivate_permanent().never();
    links.expect_list_links().never();

    links
}

pub(crate) fn links_service(links: MockAccessLinksService, route: Router) -> Service {
    let state = Arc::new(State::new(Arc::new(links)));

    Service::new(Router::new().hoop(inject(state)).push(route))
}
