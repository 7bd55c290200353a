//! # Send Outcome Conformance
//!
//! Every send yields exactly one outcome, and the outcome tells the caller
//! what happened to the handoff:
//!
//! 1. **Registered destination**: `Ok(())`, destination later observes the payload
//! 2. **Deregistered destination**: registration failure, never success, never a hang
//! 3. **Capacity limit**: delivery failure, distinguishable from (2)
//! 4. **Ordering**: sequential sends from one caller arrive in order
//! 5. **Payload**: re-sending the same payload behaves identically

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use shared_channel::{
        ChannelEndpoint, ChannelRegistry, DestinationId, Dispatcher, FailureKind, SendError,
        Sender,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Seen<T> = Arc<Mutex<Vec<T>>>;

    /// Registers a destination that records everything it receives.
    fn register_recorder<T: Send + 'static>(
        registry: &ChannelRegistry,
        dispatcher: &Dispatcher,
        name: &str,
    ) -> (ChannelEndpoint<T>, Seen<T>) {
        let seen: Seen<T> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let endpoint = registry
            .register_channel(name, move |m: T| sink.lock().push(m), &dispatcher.handle())
            .expect("registration");
        (endpoint, seen)
    }

    // =============================================================================
    // SCENARIO 1: REGISTERED DESTINATION
    // =============================================================================

    #[test]
    fn test_logger_observes_hello() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let (endpoint, seen) = register_recorder::<&'static str>(&registry, &dispatcher, "Logger");

        assert_eq!(endpoint.send("hello"), Ok(()));

        // Accepted is not processed: nothing observed until the dispatcher runs
        assert!(seen.lock().is_empty());

        dispatcher.dispatch_queued_events();
        assert_eq!(*seen.lock(), vec!["hello"]);
    }

    // =============================================================================
    // SCENARIO 2: DEREGISTERED DESTINATION
    // =============================================================================

    #[test]
    fn test_deregistered_logger_fails_with_registration_error() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let (endpoint, seen) = register_recorder::<&'static str>(&registry, &dispatcher, "Logger");

        registry
            .deregister(&DestinationId::new("Logger"))
            .expect("deregister");

        let err = endpoint.send("hello").expect_err("send must fail");
        assert_eq!(err.kind(), FailureKind::Registration);
        assert_eq!(err.destination().as_str(), "Logger");
        assert!(!err.to_string().is_empty());

        dispatcher.dispatch_queued_events();
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_torn_down_dispatcher_fails_with_registration_error() {
        let registry = ChannelRegistry::default();
        let dispatcher = Dispatcher::new();
        let (endpoint, _seen) = register_recorder::<u32>(&registry, &dispatcher, "Logger");

        drop(dispatcher);

        let err = endpoint.send(1).expect_err("send must fail");
        assert!(matches!(err, SendError::Disconnected { .. }));
        assert!(err.is_registration_failure());
    }

    #[test]
    fn test_unregistered_destination_via_routed_sender() {
        let registry = Arc::new(ChannelRegistry::default());
        let sender = registry.sender_for::<u32>("Nobody");

        let err = sender.send(1).expect_err("send must fail");
        assert!(matches!(err, SendError::NotRegistered { .. }));
        assert_eq!(err.kind(), FailureKind::Registration);
    }

    // =============================================================================
    // SCENARIO 3: CAPACITY LIMIT
    // =============================================================================

    #[test]
    fn test_queue_full_is_distinct_delivery_failure() {
        let registry = ChannelRegistry::default();
        let dispatcher = Dispatcher::new();
        let queue_full: ChannelEndpoint<String> = registry
            .register_channel_with_capacity("QueueFull", |_: String| {}, &dispatcher.handle(), 1)
            .expect("registration");
        let (logger, _seen) = register_recorder::<String>(&registry, &dispatcher, "Logger");
        registry
            .deregister(&DestinationId::new("Logger"))
            .expect("deregister");

        queue_full.send("m".to_string()).expect("first send fits");
        let full = queue_full.send("m".to_string()).expect_err("second send overflows");
        let gone = logger.send("m".to_string()).expect_err("deregistered");

        assert_eq!(full.kind(), FailureKind::Delivery);
        assert_eq!(gone.kind(), FailureKind::Registration);
        assert_ne!(full.to_string(), gone.to_string());
        assert!(full.is_retryable());
        assert!(!gone.is_retryable());
    }

    #[test]
    fn test_full_queue_recovers_after_drain() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let seen: Seen<u32> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let endpoint = registry
            .register_channel_with_capacity(
                "QueueFull",
                move |m: u32| sink.lock().push(m),
                &dispatcher.handle(),
                1,
            )
            .expect("registration");

        endpoint.send(1).expect("fits");
        assert!(endpoint.send(2).is_err());

        dispatcher.dispatch_queued_events();
        endpoint.send(3).expect("room again");
        dispatcher.dispatch_queued_events();

        // The rejected message was never enqueued
        assert_eq!(*seen.lock(), vec![1, 3]);
    }

    // =============================================================================
    // ORDERING AND PAYLOAD
    // =============================================================================

    #[test]
    fn test_sequential_sends_arrive_in_order() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let (endpoint, seen) = register_recorder::<u32>(&registry, &dispatcher, "Logger");

        for i in 0..100 {
            endpoint.send(i).expect("send");
        }
        dispatcher.dispatch_queued_events();

        assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_resending_same_payload_behaves_identically() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let (endpoint, seen) = register_recorder::<String>(&registry, &dispatcher, "Logger");
        let payload = "hello".to_string();

        let first = endpoint.send(payload.clone());
        let second = endpoint.send(payload.clone());
        dispatcher.dispatch_queued_events();

        assert_eq!(first, second);
        assert_eq!(payload, "hello");
        assert_eq!(*seen.lock(), vec!["hello", "hello"]);
    }

    #[test]
    fn test_every_send_has_exactly_one_outcome() {
        let registry = ChannelRegistry::default();
        let mut dispatcher = Dispatcher::new();
        let endpoint: ChannelEndpoint<u32> = registry
            .register_channel_with_capacity("Logger", |_: u32| {}, &dispatcher.handle(), 4)
            .expect("registration");

        let mut accepted = 0;
        let mut failed = 0;
        for i in 0..10 {
            match endpoint.send(i) {
                Ok(()) => accepted += 1,
                Err(_) => failed += 1,
            }
        }
        dispatcher.dispatch_queued_events();

        assert_eq!(accepted, 4);
        assert_eq!(failed, 6);
        let stats = registry
            .stats(&DestinationId::new("Logger"))
            .expect("stats");
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.failed, 6);
        assert_eq!(stats.delivered, 4);
    }
}
