//! Integration tests for the hook dispatcher lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use diffhooks::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("diffhooks=debug")
        .with_test_writer()
        .try_init();
}

/// Counts generation steps and mirrors the count into its own store.
macro_rules! counting_hook {
    ($ty:ident, $name:literal) => {
        #[derive(Debug, Default)]
        struct $ty {
            store: HookStore,
            steps: u64,
        }

        impl $ty {
            const NAME: &'static str = $name;

            fn class() -> HookClass {
                HookClass::new(Self::NAME, || Box::new(Self::default()))
            }
        }

        impl Hook for $ty {
            fn name(&self) -> &'static str {
                Self::NAME
            }
            fn store(&self) -> &HookStore {
                &self.store
            }
            fn store_mut(&mut self) -> &mut HookStore {
                &mut self.store
            }
            fn after_diffusion_step(&mut self) -> HookResult<()> {
                self.steps += 1;
                self.store
                    .set("steps", Arc::new(self.steps), Retention::Strong);
                Ok(())
            }
        }
    };
}

counting_hook!(CounterA, "a");
counting_hook!(CounterB, "b");

#[test]
fn test_enable_unknown_hook_lists_registered_names() {
    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(CounterB::class());
    dispatcher.register_hook_class(CounterA::class());

    let err = dispatcher.enable("missing").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("missing"));
    assert!(err.message.contains("[a, b]"), "message was: {}", err.message);
}

#[test]
fn test_dispatcher_get_always_fails() {
    let mut dispatcher = HookDispatcher::with_builtins();
    assert_eq!(
        dispatcher.get("anything").unwrap_err().kind,
        ErrorKind::NotImplemented
    );

    dispatcher.enable(SaveEverythingHook::NAME).unwrap();
    dispatcher
        .set("anything", Arc::new(1u32), Retention::Strong)
        .unwrap();
    assert_eq!(
        dispatcher.get("anything").unwrap_err().kind,
        ErrorKind::NotImplemented
    );
}

#[test]
fn test_set_many_reaches_every_enabled_hook() {
    init_tracing();

    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(CounterA::class());
    dispatcher.register_hook_class(CounterB::class());
    dispatcher.enable("a").unwrap();
    dispatcher.enable("b").unwrap();

    dispatcher
        .set_many(
            [
                ("alpha".to_string(), Arc::new(1u32) as StoredValue),
                ("beta".to_string(), Arc::new(2u32) as StoredValue),
            ],
            Retention::Strong,
        )
        .unwrap();

    for name in ["a", "b"] {
        let hook = dispatcher.hook(name).expect("enabled");
        assert_eq!(*hook.store().get_as::<u32>("alpha").unwrap(), 1);
        assert_eq!(*hook.store().get_as::<u32>("beta").unwrap(), 2);
    }
}

#[test]
fn test_weakly_published_values_vanish_with_their_owner() {
    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(CounterA::class());
    dispatcher.enable("a").unwrap();

    let latents: Arc<Vec<f32>> = Arc::new(vec![0.5; 16]);
    dispatcher
        .set("latents", latents.clone() as StoredValue, Retention::Weak)
        .unwrap();

    let hook = dispatcher.hook("a").unwrap();
    assert!(hook.get("latents").is_ok());

    drop(latents);
    let err = dispatcher.hook("a").unwrap().get("latents").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn test_after_diffusion_step_increments_each_counter_once() {
    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(CounterA::class());
    dispatcher.register_hook_class(CounterB::class());
    dispatcher.enable("a").unwrap();
    dispatcher.enable("b").unwrap();

    dispatcher.after_diffusion_step().unwrap();

    for name in ["a", "b"] {
        let hook = dispatcher.hook(name).unwrap();
        assert_eq!(*hook.store().get_as::<u64>("steps").unwrap(), 1);
    }
}

#[test]
fn test_reenable_replaces_instance_and_discards_its_state() {
    static INSTANCES: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Tracked {
        store: HookStore,
    }

    impl Default for Tracked {
        fn default() -> Self {
            INSTANCES.fetch_add(1, Ordering::SeqCst);
            Self {
                store: HookStore::new(),
            }
        }
    }

    impl Hook for Tracked {
        fn name(&self) -> &'static str {
            "tracked"
        }
        fn store(&self) -> &HookStore {
            &self.store
        }
        fn store_mut(&mut self) -> &mut HookStore {
            &mut self.store
        }
    }

    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(HookClass::new("tracked", || Box::new(Tracked::default())));

    dispatcher.enable("tracked").unwrap();
    dispatcher
        .set("state", Arc::new(7u32), Retention::Strong)
        .unwrap();
    assert!(dispatcher.hook("tracked").unwrap().get("state").is_ok());

    dispatcher.enable("tracked").unwrap();
    assert_eq!(INSTANCES.load(Ordering::SeqCst), 2);
    assert_eq!(dispatcher.enabled_names(), vec!["tracked"]);

    // The replacement starts from an empty store; nothing of the first
    // instance is reachable through the dispatcher.
    let err = dispatcher.hook("tracked").unwrap().get("state").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[derive(Debug, Default)]
struct RecordingClose {
    store: HookStore,
}

impl RecordingClose {
    fn class() -> HookClass {
        HookClass::new("recording_close", || Box::new(Self::default()))
    }
}

impl Hook for RecordingClose {
    fn name(&self) -> &'static str {
        "recording_close"
    }
    fn store(&self) -> &HookStore {
        &self.store
    }
    fn store_mut(&mut self) -> &mut HookStore {
        &mut self.store
    }
    fn close(&mut self) -> HookResult<()> {
        self.store.set("closed", Arc::new(true), Retention::Strong);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FailingClose {
    store: HookStore,
}

impl FailingClose {
    fn class() -> HookClass {
        HookClass::new("failing_close", || Box::new(Self::default()))
    }
}

impl Hook for FailingClose {
    fn name(&self) -> &'static str {
        "failing_close"
    }
    fn store(&self) -> &HookStore {
        &self.store
    }
    fn store_mut(&mut self) -> &mut HookStore {
        &mut self.store
    }
    fn close(&mut self) -> HookResult<()> {
        Err(HookError::plugin("buffer flush failed"))
    }
}

#[test]
fn test_close_fans_out_and_leaves_hooks_enabled() {
    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(RecordingClose::class());
    dispatcher.enable("recording_close").unwrap();

    dispatcher.close().unwrap();

    // Closed, but still enabled from the registry's point of view.
    assert!(dispatcher.is_enabled("recording_close"));
    let hook = dispatcher.hook("recording_close").unwrap();
    assert!(*hook.store().get_as::<bool>("closed").unwrap());
}

#[test]
fn test_fanout_failure_aborts_delivery_to_later_hooks() {
    let mut dispatcher = HookDispatcher::new();
    dispatcher.register_hook_class(FailingClose::class());
    dispatcher.register_hook_class(RecordingClose::class());
    dispatcher.enable("failing_close").unwrap();
    dispatcher.enable("recording_close").unwrap();

    let err = dispatcher.close().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Plugin);

    // The hook enabled after the failing one was never reached.
    let hook = dispatcher.hook("recording_close").unwrap();
    assert!(!hook.store().contains("closed"));
}

#[test]
fn test_with_builtins_registers_save_everything() {
    let mut dispatcher = HookDispatcher::with_builtins();
    assert!(dispatcher.registry().contains(SaveEverythingHook::NAME));

    dispatcher.enable(SaveEverythingHook::NAME).unwrap();
    dispatcher.after_diffusion_step().unwrap();
    dispatcher.close().unwrap();
}
