//! # Registration Lifecycle
//!
//! Exercises endpoints shared across threads while a dispatcher task runs:
//!
//! 1. **Concurrent producers**: every accepted message is delivered once,
//!    and each producer's messages keep their relative order
//! 2. **Deregistration mid-stream**: once `deregister` returns, sends fail
//!    immediately and nothing accepted before it is lost
//! 3. **Runtime wiring**: the same contract through `ChannelRuntime`

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use channel_runtime::{ChannelRuntime, RuntimeConfig};
    use parking_lot::Mutex;
    use shared_channel::{
        BusConfig, ChannelEndpoint, ChannelRegistry, DestinationId, Dispatcher, FailureKind,
        RetryPolicy, RetryingSender, Sender,
    };
    use tokio::sync::watch;
    use tokio::time::timeout;

    type Seen = Arc<Mutex<Vec<(usize, u32)>>>;

    async fn wait_until(seen: &Seen, count: usize) {
        timeout(Duration::from_secs(5), async {
            while seen.lock().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("deliveries did not arrive in time");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_producers_keep_per_producer_order() {
        const PRODUCERS: usize = 4;
        const PER_PRODUCER: u32 = 250;

        let registry = ChannelRegistry::new(BusConfig {
            channel_capacity: 64,
            ..BusConfig::default()
        });
        let dispatcher = Dispatcher::new();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let endpoint: ChannelEndpoint<(usize, u32)> = registry
            .register_channel(
                "Logger",
                move |m: (usize, u32)| sink.lock().push(m),
                &dispatcher.handle(),
            )
            .expect("registration");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(dispatcher.run(shutdown_rx));

        // Retry capacity limits so every message is eventually accepted
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let sender = RetryingSender::new(
                    endpoint.clone(),
                    RetryPolicy {
                        max_attempts: 10_000,
                        backoff: Duration::from_micros(50),
                    },
                );
                thread::spawn(move || {
                    for i in 0..PER_PRODUCER {
                        sender.send((producer, i)).expect("send");
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().expect("producer thread");
        }

        wait_until(&seen, PRODUCERS * PER_PRODUCER as usize).await;
        shutdown_tx.send(true).expect("shutdown");
        task.await.expect("dispatcher task");

        let mut by_producer: HashMap<usize, Vec<u32>> = HashMap::new();
        for (producer, i) in seen.lock().iter() {
            by_producer.entry(*producer).or_default().push(*i);
        }
        assert_eq!(by_producer.len(), PRODUCERS);
        for messages in by_producer.values() {
            assert_eq!(*messages, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_deregistration_mid_stream() {
        let registry = ChannelRegistry::default();
        let dispatcher = Dispatcher::new();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let endpoint: ChannelEndpoint<(usize, u32)> = registry
            .register_channel(
                "Logger",
                move |m: (usize, u32)| sink.lock().push(m),
                &dispatcher.handle(),
            )
            .expect("registration");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(dispatcher.run(shutdown_rx));

        let mut accepted = 0;
        for i in 0..50 {
            endpoint.send((0, i)).expect("send before deregistration");
            accepted += 1;
        }

        registry
            .deregister(&DestinationId::new("Logger"))
            .expect("deregister");

        for i in 50..60 {
            let err = endpoint.send((0, i)).expect_err("send after deregistration");
            assert_eq!(err.kind(), FailureKind::Registration);
        }

        wait_until(&seen, accepted).await;
        shutdown_tx.send(true).expect("shutdown");
        task.await.expect("dispatcher task");

        assert_eq!(seen.lock().len(), accepted);
    }

    #[tokio::test]
    async fn test_runtime_end_to_end() {
        let runtime = ChannelRuntime::start(RuntimeConfig::default());
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let logger = runtime
            .register("Logger", move |m: String| sink.lock().push(m))
            .expect("register");

        logger.send("hello".to_string()).expect("send");
        timeout(Duration::from_secs(1), async {
            while seen.lock().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("delivery");

        runtime
            .registry()
            .deregister(&DestinationId::new("Logger"))
            .expect("deregister");
        let err = logger.send("hello".to_string()).expect_err("deregistered");
        assert!(err.is_registration_failure());

        runtime.shutdown().await.expect("shutdown");
        assert_eq!(*seen.lock(), vec!["hello"]);
    }
}
