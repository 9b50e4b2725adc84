//! Demo driver: loads a config and a store fixture, then walks the
//! management screen from the command line.
//!
//! ```text
//! CUSTOMER_CENTER_CONFIG=config.json CUSTOMER_CENTER_FIXTURE=store.json \
//!     customer-center <path-id> [survey-option-id]
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};

use customercenter_center::FlowStep;
use customercenter_core::{OptionId, PathId};
use customercenter_infra::{
    FIXTURE_PATH_ENV, InMemoryPurchaseClient, StoreFixture, build_customer_center,
    load_config_from_env, load_fixture,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    customercenter_observability::init();

    let config = load_config_from_env()?;
    let fixture = match std::env::var(FIXTURE_PATH_ENV) {
        Ok(path) => load_fixture(path)?,
        Err(_) => {
            tracing::warn!("{FIXTURE_PATH_ENV} not set; using an empty store");
            StoreFixture::default()
        }
    };

    let client = Arc::new(InMemoryPurchaseClient::from_fixture(fixture));
    let mut app = build_customer_center(&config, client)?;
    let events = app.subscribe();

    app.manage.load_screen().await?;
    if let Some(info) = app.manage.subscription_information() {
        println!("{}", info.heading());
        println!("{}", info.price);
        if let Some(line) = info.renewal_line() {
            println!("{line}");
        }
    }

    let mut args = std::env::args().skip(1);
    let Some(path_arg) = args.next() else {
        for path in &app.manage.screen().paths {
            println!("- {} ({})", path.title, path.id);
        }
        println!("Contact support: {}", app.manage.contact_support_url()?);
        return Ok(());
    };

    let path_id = PathId::new(path_arg).context("invalid path id")?;
    let mut step = app.manage.determine_flow(&path_id).await?;

    if let FlowStep::ShowFeedbackSurvey(survey) = &step {
        println!("{}", survey.title);
        for option in &survey.options {
            println!("- {} ({})", option.title, option.id);
        }
        let Some(option_arg) = args.next() else {
            return Ok(());
        };
        let option_id = OptionId::new(option_arg).context("invalid option id")?;
        step = app.manage.select_survey_option(&option_id).await?;
    }

    match step {
        FlowStep::ShowFeedbackSurvey(_) => {}
        FlowStep::ShowPromotionalOffer(session) => {
            let sheet = session.presentation();
            println!(
                "{}\n{}\n{}\n{}",
                sheet.headline, sheet.subtitle, sheet.offer_title, sheet.then_title
            );
            let txn = app.manage.accept_offer(session).await?;
            println!("purchased: {}", txn.transaction_identifier);
        }
        FlowStep::Perform(action) => println!("action: {action:?}"),
    }

    for event in events.drain() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
