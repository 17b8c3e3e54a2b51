//! End-to-end lifecycle scenarios: store → provider → consumer → render.

use std::cell::RefCell;
use std::rc::Rc;

use sctx_connect::{
    ActionMap, BoundAction, ConnectError, Connected, Connector, Consumer, Context, ContextValue,
    Named, Payload, Props, Provider, Selector, connect, named, with_stream,
};
use sctx_core::testing::{INCREMENT, ReducerStore, counter_store, increment};
use sctx_core::{Action, Dispatch, State, StateStream, Store, StreamError};
use serde_json::{Value, json};

fn counter_text(p: &Payload) -> String {
    p.pointer("/counter/value")
        .map(Value::to_string)
        .unwrap_or_default()
}

fn counter_component() -> Connected<Named<fn(&Payload) -> String>> {
    let actions = ActionMap::new().creator("increment", |_| increment());
    with_stream(None, Some(actions)).wrap(named("Counter", counter_text as fn(&Payload) -> String))
}

fn press(connector: &Connector<Context>, name: &str) {
    let bound = connector
        .render(|p| p.action(name).and_then(BoundAction::as_creator).cloned())
        .unwrap()
        .unwrap();
    bound.call(&[]).unwrap();
}

#[test]
fn counter_renders_zero_then_two() {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();

    let counter = counter_component();
    assert_eq!(counter.display_name(), "with_stream(Counter)");

    let connector = counter.mount(&provider.context(), Props::new()).unwrap();
    assert_eq!(counter.view(&connector).unwrap(), "0");

    press(&connector, "increment");
    press(&connector, "increment");

    assert_eq!(counter.view(&connector).unwrap(), "2");
    assert_eq!(fixture.dispatch_count(), 2);
    assert!(fixture.dispatched().iter().all(|a| a.kind() == INCREMENT));
}

#[test]
fn foo_bar_props_reach_selector() {
    let context = Context::fixed(ContextValue::detached(State::new()));
    let selector = Selector::new(|_state: &State, props: Option<&Props>| {
        let text = props
            .and_then(|p| p.get("foo"))
            .cloned()
            .unwrap_or(Value::Null);
        State::from_iter([("text", text)])
    });
    let component = with_stream(Some(selector), None).wrap(|p: &Payload| p.value("text").cloned());

    let text = component
        .render(&context, State::from_iter([("foo", json!("bar"))]))
        .unwrap();
    assert_eq!(text, Some(json!("bar")));
}

#[test]
fn first_render_uses_initial_state() {
    let updates = StateStream::new();
    let initial = State::from_value(json!({ "greeting": "hello" })).unwrap();
    let store = Store::new(updates, Dispatch::noop(), initial);
    let mut provider = Provider::new(store);
    provider.mount().unwrap();

    let greeting = provider
        .render(|context| {
            Consumer::new().render(context, |p| p.value("greeting").cloned())
        })
        .unwrap()
        .unwrap();
    assert_eq!(greeting, Some(json!("hello")));
}

#[test]
fn no_delivery_after_provider_unmount() {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();
    let connector = Consumer::new().mount(&provider.context()).unwrap();

    let renders = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renders);
    let _sub = connector.on_change(move |p| sink.borrow_mut().push(counter_text(p)));

    fixture.store().dispatch().call(increment());
    provider.unmount();
    fixture.store().dispatch().call(increment());

    assert_eq!(*renders.borrow(), vec!["1".to_owned()]);
}

#[test]
fn no_delivery_after_connector_unmount() {
    let fixture = counter_store();
    let mut connector = connect(fixture.store().clone(), None, None).unwrap();

    let renders = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&renders);
    let _sub = connector.on_change(move |_| *counter.borrow_mut() += 1);

    connector.unmount();
    fixture.store().dispatch().call(increment());

    assert_eq!(*renders.borrow(), 0);
    assert_eq!(connector.current_payload().unwrap_err(), ConnectError::Disposed);
}

#[test]
fn unmount_from_inside_listener_drops_queued_update() {
    let fixture = counter_store();
    let connector = Rc::new(RefCell::new(
        connect(fixture.store().clone(), None, None).unwrap(),
    ));

    let renders = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renders);
    let handle = Rc::clone(&connector);
    let dispatch = fixture.store().dispatch().clone();
    let _sub = connector.borrow().on_change(move |p| {
        sink.borrow_mut().push(counter_text(p));
        // Queue a second update, then tear down before it is delivered.
        dispatch.call(increment());
        if let Ok(mut connector) = handle.try_borrow_mut() {
            connector.unmount();
        }
    });

    fixture.store().dispatch().call(increment());

    assert_eq!(*renders.borrow(), vec!["1".to_owned()]);
    assert_eq!(fixture.dispatch_count(), 2);
}

#[test]
fn literal_action_is_dispatched_explicitly() {
    let fixture = ReducerStore::builder()
        .slice("log", json!([]), |value, action| {
            let mut entries = value.as_array().cloned().unwrap_or_default();
            entries.push(json!(action.kind()));
            Some(Value::Array(entries))
        })
        .build();
    let actions = ActionMap::new().literal("reset", Action::new("reset"));
    let connector = connect(fixture.store().clone(), None, Some(actions)).unwrap();

    let (literal, dispatch) = connector
        .render(|p| {
            (
                p.action("reset").and_then(BoundAction::as_literal).cloned(),
                p.dispatch().clone(),
            )
        })
        .unwrap();

    // Binding never dispatches on its own.
    assert_eq!(fixture.dispatch_count(), 0);

    let literal = literal.unwrap();
    dispatch.call(literal.clone());
    assert_eq!(fixture.dispatched(), vec![literal]);
    let log = connector.render(|p| p.value("log").cloned()).unwrap();
    assert_eq!(log, Some(json!(["reset"])));
}

#[test]
fn provider_teardown_makes_context_inert() {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();
    let context = provider.context();
    provider.unmount();

    let connector = Consumer::new().mount(&context).unwrap();
    let renders = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&renders);
    let _sub = connector.on_change(move |_| *counter.borrow_mut() += 1);

    fixture.store().dispatch().call(increment());
    assert_eq!(*renders.borrow(), 0);
    assert!(!context.is_live());
}

#[test]
fn store_failure_propagates_to_consumers() {
    let updates = StateStream::new();
    let store = Store::new(updates.clone(), Dispatch::noop(), State::new());
    let mut provider = Provider::new(store);
    provider.mount().unwrap();
    let connector = Consumer::new().mount(&provider.context()).unwrap();

    updates.error(StreamError::new("disconnected"));

    let expected = ConnectError::Stream(StreamError::new("disconnected"));
    assert_eq!(connector.current_payload().unwrap_err(), expected);
    assert_eq!(provider.value().unwrap_err(), expected);
    assert!(!connector.is_live());
}

#[test]
fn selector_failure_surfaces_at_mount() {
    let fixture = counter_store();
    let selector = Selector::try_new(|_state: &State, _props: Option<&Props>| {
        Err::<State, _>("missing slice")
    });
    let err = connect(fixture.store().clone(), Some(selector), None).unwrap_err();
    assert_eq!(
        err,
        ConnectError::Selector {
            message: "missing slice".to_owned()
        }
    );
}

#[test]
fn provider_mounted_after_emission_renders_latest_state() {
    let fixture = counter_store();
    fixture.store().dispatch().call(increment());

    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();

    let value = Consumer::new()
        .render(&provider.context(), |p| p.pointer("/counter/value").cloned())
        .unwrap();
    assert_eq!(value, Some(json!(1)));

    let counter = counter_component();
    let connector = counter.mount(&provider.context(), Props::new()).unwrap();
    assert_eq!(counter.view(&connector).unwrap(), "1");

    press(&connector, "increment");
    assert_eq!(counter.view(&connector).unwrap(), "2");
}

#[test]
fn consumer_attached_after_emission_sees_current_state() {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();
    fixture.store().dispatch().call(increment());
    fixture.store().dispatch().call(increment());

    let connector = Consumer::new().mount(&provider.context()).unwrap();
    assert_eq!(connector.render(counter_text).unwrap(), "2");
}

#[test]
fn rejected_props_keep_connector_live() {
    let fixture = counter_store();
    let mut provider = Provider::new(fixture.store().clone());
    provider.mount().unwrap();

    let selector = Selector::try_new(|state: &State, props: Option<&Props>| {
        match props.and_then(|p| p.get("bad")) {
            Some(_) => Err("unsupported prop"),
            None => Ok(state.clone()),
        }
    });
    let mut connector = Consumer::new()
        .with_selector(selector)
        .mount(&provider.context())
        .unwrap();

    let err = connector
        .set_props(State::from_iter([("bad", json!(1))]))
        .unwrap_err();
    assert!(matches!(err, ConnectError::Selector { .. }));

    fixture.store().dispatch().call(increment());

    assert!(connector.is_live());
    assert_eq!(connector.render(counter_text).unwrap(), "1");
}
