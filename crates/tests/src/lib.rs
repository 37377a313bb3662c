//! # Integration Tests
//!
//! End-to-end tests covering the full relay path: raw notification bytes
//! through the ingestion pipeline into the sink registry and out to real
//! files and sockets.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn contracts_compile() {
        let _ = contracts::SettingsVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{HeartRateSource, RelaySettings};
    use dispatcher::SinkRegistry;
    use ingestion::{BackpressureConfig, IngestionPipeline, MockHeartRateSource, MockSourceConfig};

    fn settings_with_targets(dir: &std::path::Path) -> RelaySettings {
        let mut settings = RelaySettings::default();
        settings.log.file = dir.join("log.csv").display().to_string();
        settings.ibi.file = dir.join("ibi.txt").display().to_string();
        settings.bpm.file = dir.join("bpm.txt").display().to_string();
        settings
    }

    /// Raw notification bytes -> decode -> channel -> registry -> files.
    #[tokio::test]
    async fn raw_notification_reaches_all_file_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_with_targets(dir.path());

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);
        assert_eq!(registry.sink_count(), 4);

        let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            bpm_ramp: Vec::new(),
            ..Default::default()
        }));
        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let receiver = pipeline.take_receiver().unwrap();
        pipeline.start();

        // flags: contact detected + RR intervals present, 8-bit BPM 80,
        // RR 1024 (1s) and 2048 (2s)
        source.push_raw(&[0b10110, 80, 0x00, 0x04, 0x00, 0x08]);

        let reading = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("reading not delivered")
            .unwrap();
        assert_eq!(reading.beats_per_minute, 80);
        assert_eq!(reading.rr_intervals, vec![1024, 2048]);

        registry.dispatch(&reading);

        let log = std::fs::read_to_string(dir.path().join("log.csv")).unwrap();
        assert!(log.contains(",80,Contact,,\"1024,2048\""), "log row: {log:?}");
        assert!(log.ends_with("\r\n"));

        let ibi = std::fs::read_to_string(dir.path().join("ibi.txt")).unwrap();
        assert_eq!(ibi, "1000\r\n2000\r\n");

        let bpm = std::fs::read_to_string(dir.path().join("bpm.txt")).unwrap();
        assert_eq!(bpm, "80");

        for (name, snapshot) in registry.metrics() {
            assert_eq!(snapshot.write_count, 1, "sink {name}");
            assert_eq!(snapshot.failure_count, 0, "sink {name}");
        }

        pipeline.stop();
    }

    /// The mock emitter thread drives the same path a real transport would.
    #[tokio::test]
    async fn mock_ramp_flows_through_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let bpm_path = dir.path().join("bpm.txt");
        let mut settings = RelaySettings::default();
        settings.bpm.file = bpm_path.display().to_string();

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);

        let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            tickrate: Duration::from_millis(5),
            bpm_ramp: vec![60, 61, 62],
            loop_ramp: false,
        }));
        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let receiver = pipeline.take_receiver().unwrap();
        pipeline.start();
        source.initiate().unwrap();

        for expected in [60u16, 61, 62] {
            let reading = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
                .await
                .expect("ramp reading not delivered")
                .unwrap();
            assert_eq!(reading.beats_per_minute, expected);
            registry.dispatch(&reading);
        }

        // The raw BPM sink overwrites, leaving the last value.
        assert_eq!(std::fs::read_to_string(&bpm_path).unwrap(), "62");

        source.dispose();
        pipeline.stop();
    }

    /// UDP broadcast delivers one datagram per reading.
    #[tokio::test]
    async fn udp_sink_broadcasts_csv_rows() {
        let receiver_socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver_socket
            .set_read_timeout(Some(Duration::from_secs(1)))
            .unwrap();
        let port = receiver_socket.local_addr().unwrap().port();

        let mut settings = RelaySettings::default();
        settings.udp.hostname = "127.0.0.1".to_string();
        settings.udp.port = port;

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);

        let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            bpm_ramp: Vec::new(),
            ..Default::default()
        }));
        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let channel = pipeline.take_receiver().unwrap();
        pipeline.start();

        source.push_raw(&[0b00110, 72]);
        let reading = channel.recv().await.unwrap();
        registry.dispatch(&reading);

        let mut buf = [0u8; 512];
        let len = receiver_socket.recv(&mut buf).unwrap();
        let datagram = std::str::from_utf8(&buf[..len]).unwrap();
        assert!(datagram.contains(",72,Contact,,"), "datagram: {datagram:?}");
        assert!(datagram.ends_with('\n'));

        pipeline.stop();
    }

    /// A settings file drives the whole relay: loaded from disk, it
    /// determines which targets receive readings.
    #[tokio::test]
    async fn config_file_drives_sink_targets() {
        let dir = tempfile::tempdir().unwrap();
        let bpm_path = dir.path().join("bpm.txt");
        let config_path = dir.path().join("pulselink.toml");
        std::fs::write(
            &config_path,
            format!(
                "[source]\ndisconnected_timeout_secs = 5\n\n[bpm]\nfile = \"{}\"\n",
                bpm_path.display()
            ),
        )
        .unwrap();

        let settings = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();
        assert_eq!(settings.source.disconnected_timeout_secs, 5);

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);

        let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            bpm_ramp: Vec::new(),
            ..Default::default()
        }));
        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let channel = pipeline.take_receiver().unwrap();
        pipeline.start();

        source.push_raw(&[0b00110, 64]);
        registry.dispatch(&channel.recv().await.unwrap());

        assert_eq!(std::fs::read_to_string(&bpm_path).unwrap(), "64");
        // The log target was left blank, so no log file appears.
        assert!(!dir.path().join("log.csv").exists());

        pipeline.stop();
    }

    /// Rebuilding the registry swaps the whole sink set; in-flight readings
    /// before the swap land in the old targets, later ones in the new.
    #[tokio::test]
    async fn settings_reload_swaps_sink_set() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");

        let mut settings = RelaySettings::default();
        settings.bpm.file = first.display().to_string();

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);

        let source = Arc::new(MockHeartRateSource::new(MockSourceConfig {
            bpm_ramp: Vec::new(),
            ..Default::default()
        }));
        let mut pipeline = IngestionPipeline::new(
            source.clone() as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let channel = pipeline.take_receiver().unwrap();
        pipeline.start();

        source.push_raw(&[0b00110, 70]);
        registry.dispatch(&channel.recv().await.unwrap());

        settings.bpm.file = second.display().to_string();
        registry.rebuild(&settings);

        source.push_raw(&[0b00110, 71]);
        registry.dispatch(&channel.recv().await.unwrap());

        assert_eq!(std::fs::read_to_string(&first).unwrap(), "70");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "71");

        pipeline.stop();
    }
}

#[cfg(test)]
mod supervisor_tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{ContractError, HeartRateSource, NotificationCallback, RelaySettings};
    use dispatcher::SinkRegistry;
    use ingestion::{BackpressureConfig, IngestionPipeline, MockHeartRateSource, MockSourceConfig};
    use supervisor::{Watchdog, WatchdogConfig};

    /// Source whose reconnects always fail.
    struct DeadSource {
        initiate_calls: AtomicUsize,
        disposed: AtomicBool,
    }

    impl DeadSource {
        fn new() -> Self {
            Self {
                initiate_calls: AtomicUsize::new(0),
                disposed: AtomicBool::new(false),
            }
        }
    }

    impl HeartRateSource for DeadSource {
        fn initiate(&self) -> Result<(), ContractError> {
            self.initiate_calls.fetch_add(1, Ordering::SeqCst);
            Err(ContractError::source_connection("device unreachable"))
        }

        fn listen(&self, _callback: NotificationCallback) {}

        fn stop(&self) {
            self.disposed.store(true, Ordering::SeqCst);
        }

        fn is_disposed(&self) -> bool {
            self.disposed.load(Ordering::SeqCst)
        }
    }

    /// A failed reconnect surfaces as an error reading on the same channel
    /// decoded readings travel, and error readings leave file sinks alone.
    #[tokio::test]
    async fn failed_reconnect_surfaces_error_reading() {
        let dir = tempfile::tempdir().unwrap();
        let bpm_path = dir.path().join("bpm.txt");
        let mut settings = RelaySettings::default();
        settings.bpm.file = bpm_path.display().to_string();

        let registry = SinkRegistry::new();
        registry.rebuild(&settings);

        let dead = Arc::new(DeadSource::new());
        let mut pipeline = IngestionPipeline::new(
            Arc::new(MockHeartRateSource::new(MockSourceConfig {
                bpm_ramp: Vec::new(),
                ..Default::default()
            })) as Arc<dyn HeartRateSource>,
            BackpressureConfig::default(),
        );
        let channel = pipeline.take_receiver().unwrap();
        pipeline.start();

        let watchdog = Watchdog::spawn(
            WatchdogConfig {
                timeout: Duration::from_millis(20),
                check_interval: Duration::from_millis(20),
            },
            dead.clone() as Arc<dyn HeartRateSource>,
            Some(pipeline.reading_sender()),
        );

        let reading = tokio::time::timeout(Duration::from_secs(2), channel.recv())
            .await
            .expect("error reading not delivered")
            .unwrap();
        assert!(reading.is_error);
        assert!(reading.error_message.is_some());

        registry.dispatch(&reading);
        assert!(!bpm_path.exists(), "error reading must not touch file sinks");
        assert!(dead.initiate_calls.load(Ordering::SeqCst) >= 1);

        watchdog.stop();
        pipeline.stop();
    }
}
