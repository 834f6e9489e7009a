use std::io::Write;

use log::{debug, info, warn};

use crate::{
    config::NetworkConfig,
    connectivity::ConnectivityManager,
    ports::{ClockPort, TransportPort},
    types::TelemetryRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent,
    /// Link was down; the observation is discarded.
    Offline,
    /// The endpoint could not be reached or the write failed.
    Dropped,
}

/// Fire-and-forget HTTP GET reporter for the ingestion channel.
#[derive(Debug, Clone)]
pub struct TelemetryReporter {
    host: String,
    port: u16,
    api_key: String,
    linger_ms: u64,
    sent: u64,
    dropped: u64,
}

impl TelemetryReporter {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            host: network.ingest_host.clone(),
            port: network.ingest_port,
            api_key: network.api_key.clone(),
            linger_ms: network.send_linger_ms,
            sent: 0,
            dropped: 0,
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn request_path(&self, record: TelemetryRecord) -> String {
        format!(
            "/update?api_key={}&{}={}",
            self.api_key,
            record.field.as_str(),
            record.value
        )
    }

    pub fn build_request(&self, record: TelemetryRecord) -> String {
        format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.request_path(record),
            self.host
        )
    }

    pub fn report<B>(
        &mut self,
        hw: &mut B,
        link: &ConnectivityManager,
        record: TelemetryRecord,
    ) -> ReportOutcome
    where
        B: TransportPort + ClockPort,
    {
        if !link.is_connected() {
            debug!(
                "offline, discarding {}={}",
                record.field.label(),
                record.value
            );
            return ReportOutcome::Offline;
        }

        let mut conn = match hw.open(&self.host, self.port) {
            Ok(conn) => conn,
            Err(err) => {
                warn!(
                    "failed to reach {}:{} for {}: {err}",
                    self.host,
                    self.port,
                    record.field.label()
                );
                self.dropped = self.dropped.saturating_add(1);
                return ReportOutcome::Dropped;
            }
        };

        info!(
            "sending {}={} ({}) to {}",
            record.field.as_str(),
            record.value,
            record.field.label(),
            self.host
        );

        let request = self.build_request(record);
        if let Err(err) = conn
            .write_all(request.as_bytes())
            .and_then(|()| conn.flush())
        {
            warn!("failed to send {}: {err}", record.field.label());
            self.dropped = self.dropped.saturating_add(1);
            return ReportOutcome::Dropped;
        }

        // Give the stack time to push the request out before the socket closes.
        hw.delay_ms(self.linger_ms);
        drop(conn);

        self.sent = self.sent.saturating_add(1);
        debug!("send complete");
        ReportOutcome::Sent
    }
}
