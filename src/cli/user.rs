//! tt user commands: show, sign-in, sign-out.

use serde::Serialize;

use crate::error::Result;
use crate::identity;
use crate::output::{emit_success, HumanOutput};
use crate::storage::Identity;

use super::GlobalArgs;

#[derive(Serialize)]
struct UserReport {
    user: Option<String>,
    signed_in: Option<String>,
}

impl UserReport {
    fn new(active: &Identity, signed_in: Option<Identity>) -> Self {
        Self {
            user: active.user_id().map(str::to_string),
            signed_in: signed_in.and_then(|id| id.user_id().map(str::to_string)),
        }
    }
}

pub fn run_show(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let store = global.store(&config);
    let active = identity::resolve_identity(&store, global.user.as_deref());
    let signed_in = identity::load_signed_in(&store);

    let mut human = HumanOutput::new(format!("tt user: {active}"));
    if active == Identity::Anonymous {
        human.push_next_step("tt user sign-in <id>");
    } else if signed_in.as_ref() != Some(&active) {
        human.push_warning("identity comes from --user or TT_USER, not from sign-in");
    }

    let report = UserReport::new(&active, signed_in);
    emit_success(global.output(), "user show", &report, Some(&human))
}

pub fn run_sign_in(id: String, global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut store = global.store(&config);
    let identity = identity::sign_in(&mut store, &id)?;
    tracing::info!(user = %identity, "signed in");

    let mut human = HumanOutput::new(format!("tt user sign-in: {identity}"));
    human.push_next_step("tt list");

    let report = UserReport::new(&identity, Some(identity.clone()));
    emit_success(global.output(), "user sign-in", &report, Some(&human))
}

pub fn run_sign_out(global: GlobalArgs) -> Result<()> {
    let config = global.config()?;
    let mut store = global.store(&config);
    identity::sign_out(&mut store)?;
    tracing::info!("signed out");

    let human = HumanOutput::new("tt user sign-out: anonymous");
    let report = UserReport::new(&Identity::Anonymous, None);
    emit_success(global.output(), "user sign-out", &report, Some(&human))
}
