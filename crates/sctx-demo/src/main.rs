#![forbid(unsafe_code)]

//! Counter walkthrough: a reducer-backed store, a provider, and a connected
//! component that renders `count: N` and bumps itself twice.
//!
//! Set `SCTX_LOG` (e.g. `SCTX_LOG=sctx_connect=trace`) to see the
//! connector's lifecycle events.

use sctx_connect::{
    ActionMap, BoundAction, ConnectError, Payload, Props, Provider, Selector, named, with_stream,
};
use sctx_core::State;
use sctx_core::testing::{counter_store, increment};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SCTX_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn counter_view(payload: &Payload) -> String {
    let label = payload
        .value("label")
        .and_then(Value::as_str)
        .unwrap_or("count");
    let value = payload
        .value("count")
        .and_then(Value::as_i64)
        .unwrap_or_default();
    format!("{label}: {value}")
}

fn run() -> Result<(), ConnectError> {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount()?;

    let selector = Selector::new(|state: &State, _props: Option<&Props>| {
        let count = state
            .pointer("/counter/value")
            .cloned()
            .unwrap_or(json!(0));
        State::from_iter([("count", count)])
    });
    let actions = ActionMap::new().creator("increment", |_| increment());
    let counter = with_stream(Some(selector), Some(actions)).wrap(named("Counter", counter_view));

    let props = State::from_iter([("label", json!("clicks"))]);
    let connector = counter.mount(&provider.context(), props)?;
    let _printer = connector.on_change(|payload| println!("{}", counter_view(payload)));

    info!(component = counter.display_name(), "mounted");
    println!("{}", counter.view(&connector)?);

    let bump = connector.render(|p| p.action("increment").and_then(BoundAction::as_creator).cloned())?;
    if let Some(bump) = bump {
        bump.call(&[])?;
        bump.call(&[])?;
    }

    info!(
        updates = connector.updates(),
        dispatched = fixture.dispatch_count(),
        "walkthrough finished"
    );
    provider.unmount();
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}
