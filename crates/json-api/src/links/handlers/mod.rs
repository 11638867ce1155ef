//! Access Link Handlers

use salvo::{
    http::{StatusCode, header::LOCATION},
    prelude::{Response, StatusError},
};
use tracing::{info, warn};

use quotelink_app::domain::access_links::data::{IssuedLink, Redemption};

use crate::{extensions::*, observability::observe_link_outcome};

pub(crate) mod deactivate_permanent;
pub(crate) mod generate_magic_link;
pub(crate) mod generate_permanent;
pub(crate) mod get_permanent_link;
pub(crate) mod verify_magic_link;
pub(crate) mod verify_permanent;

fn record_issued(link: &IssuedLink) {
    let variant = link.kind.variant();

    if link.tracked {
        observe_link_outcome(variant, "issued");
        info!(variant, token_id = %link.token_id, "access link issued");
    } else {
        observe_link_outcome(variant, "issued_untracked");
        warn!(variant, token_id = %link.token_id, "access link issued without a descriptor");
    }
}

fn record_redeemed(redemption: &Redemption) {
    let variant = redemption.claims.kind.variant();
    let state = redemption.state.as_str();

    observe_link_outcome(variant, state);
    info!(variant, state, token_id = %redemption.claims.token_id, "access link redeemed");
}

/// Answer with a 302 to `location`.
fn redirect(res: &mut Response, location: &str) -> Result<(), StatusError> {
    res.add_header(LOCATION, location, true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::FOUND);

    Ok(())
}
