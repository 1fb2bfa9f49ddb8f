//! Connected byte streams to the host.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::RPC_TARGET;
use crate::endpoint::Endpoint;
use crate::errors::ConnectError;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Stream types the runner can attach through.
#[derive(Debug)]
pub enum ConnectionStream {
    /// TCP connection.
    Tcp(TcpStream),
    /// Unix domain socket connection.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ConnectionStream {
    /// Connects to the endpoint, blocking until the transport is established.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] when the endpoint cannot be resolved or
    /// refuses the connection. No retry is attempted.
    pub fn connect(endpoint: &Endpoint) -> Result<Self, ConnectError> {
        match endpoint {
            Endpoint::Tcp { host, port } => connect_tcp(host, *port).map(Self::Tcp),
            Endpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    UnixStream::connect(path.as_std_path())
                        .map(Self::Unix)
                        .map_err(|source| ConnectError::Unix {
                            path: path.to_string(),
                            source,
                        })
                }

                #[cfg(not(unix))]
                {
                    let _ = path;
                    Err(ConnectError::UnsupportedUnix {
                        endpoint: endpoint.to_string(),
                    })
                }
            }
        }
    }

    /// Creates an independently owned handle to the same connection.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the socket cannot be duplicated.
    pub fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
            #[cfg(unix)]
            Self::Unix(stream) => stream.try_clone().map(Self::Unix),
        }
    }

    fn shutdown(&self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.shutdown(Shutdown::Both),
            #[cfg(unix)]
            Self::Unix(stream) => stream.shutdown(Shutdown::Both),
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Closes a connection from another thread.
///
/// Shutting the socket down makes any blocked read on the connection return
/// end of stream, which is how the dispatch worker is asked to stop.
#[derive(Debug)]
pub struct ShutdownHandle {
    stream: ConnectionStream,
}

impl ShutdownHandle {
    pub(crate) fn new(stream: ConnectionStream) -> Self {
        Self { stream }
    }

    /// Shuts down both directions of the connection.
    ///
    /// # Errors
    ///
    /// Returns the OS error reported by `shutdown(2)`. A connection the host
    /// already closed reports `NotConnected`, which is treated as success.
    pub fn shutdown(&self) -> io::Result<()> {
        match self.stream.shutdown() {
            Err(error) if error.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, ConnectError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ConnectError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .collect();

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(source) => {
                debug!(target: RPC_TARGET, %addr, error = %source, "tcp connect attempt failed");
                last_error = Some(ConnectError::Tcp { addr, source });
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ConnectError::ResolveEmpty {
        host: host.to_owned(),
        port,
    }))
}
