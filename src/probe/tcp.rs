//! Raw TCP connect probe.
//!
//! Opens a connection and writes a single zero byte to make sure the socket is
//! not half-closed. The target's own wire protocol is never spoken, so an open
//! socket only shows that *something* accepts connections on that port. Treat
//! a success as a weak signal, not proof that the service is healthy.

use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use super::{require_timeout, FailureCause, Probe, ProbeSuccess, TcpTarget};
use crate::resilience::timeouts::with_deadline;

/// Byte written after connecting.
const SENTINEL: u8 = 0x00;

/// Default deadline for the sentinel write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// TCP probe that connects, writes one sentinel byte and disconnects.
#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    target: TcpTarget,
    /// Connection establishment timeout.
    timeout: Duration,
    /// Sentinel write timeout.
    write_timeout: Duration,
}

impl TcpConnectProbe {
    /// Build a probe for `address` (`host:port`).
    ///
    /// Fails with `InvalidTarget` on a malformed address or a zero timeout.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, FailureCause> {
        Ok(Self {
            target: TcpTarget::parse(address)?,
            timeout: require_timeout(timeout, "per-attempt timeout")?,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        })
    }

    /// Override the sentinel write deadline.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Result<Self, FailureCause> {
        self.write_timeout = require_timeout(write_timeout, "write timeout")?;
        Ok(self)
    }

    pub fn address(&self) -> &TcpTarget {
        &self.target
    }
}

impl Probe for TcpConnectProbe {
    fn target(&self) -> String {
        self.target.to_string()
    }

    async fn attempt(&self) -> Result<ProbeSuccess, FailureCause> {
        debug!(address = %self.target, "TCP probe connecting");

        let mut stream = with_deadline(self.timeout, async {
            TcpStream::connect((self.target.host(), self.target.port()))
                .await
                .map_err(|e| FailureCause::ConnectionRefused(e.to_string()))
        })
        .await?;

        write_sentinel(&mut stream, self.write_timeout).await?;

        debug!(address = %self.target, "TCP probe connected and wrote sentinel");
        // `stream` drops here, closing the socket before the next attempt.
        Ok(ProbeSuccess::default())
    }
}

/// Write the sentinel byte within `write_timeout`.
async fn write_sentinel<W>(writer: &mut W, write_timeout: Duration) -> Result<(), FailureCause>
where
    W: AsyncWrite + Unpin,
{
    with_deadline(write_timeout, async {
        writer
            .write_all(&[SENTINEL])
            .await
            .map_err(|e| FailureCause::WriteFailed(e.to_string()))
    })
    .await
}
