use std::{
    io,
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use envmon_common::TransportPort;

/// Plain TCP transport to the ingestion host. Works on the host and on
/// ESP-IDF, whose lwIP stack backs `std::net`.
pub struct TcpTransport {
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            write_timeout,
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(5))
    }
}

impl TransportPort for TcpTransport {
    type Connection = TcpStream;

    fn open(&mut self, host: &str, port: u16) -> io::Result<Self::Connection> {
        let mut last_err = None;

        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.write_timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("`{host}` did not resolve to any address"),
            )
        }))
    }
}
