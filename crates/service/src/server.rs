use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::config::ServerConfig;
use super::error::Error;
use super::protocol::{fallback_reply, handle_request};
use bellman_ford_core::ShortestPathSolver;

/// Reads one line of at most `max_bytes` bytes, newline included.
///
/// Returns `Ok(None)` if the peer closed the stream before sending anything.
pub async fn read_line_bounded<R: AsyncRead + Unpin>(
    reader: R,
    max_bytes: usize,
) -> Result<Option<String>, Error> {
    let mut limited = BufReader::new(reader).take(max_bytes as u64 + 1);
    let mut line = String::new();

    let read = limited.read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    if read > max_bytes {
        return Err(Error::LineTooLong(max_bytes));
    }
    Ok(Some(line))
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &str) -> Result<(), Error> {
    writer.write_all(reply.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// One-request-per-connection TCP front end for a [`ShortestPathSolver`].
///
/// Connections are served one after another. Every request is decoded into
/// its own graph, so nothing is shared between requests except the
/// (stateless) solver configuration.
pub struct GraphServer<S> {
    config: ServerConfig,
    solver: S,
}

impl<S> GraphServer<S>
where
    S: ShortestPathSolver + Clone + Send + Sync + 'static,
{
    pub fn new(config: ServerConfig, solver: S) -> Self {
        GraphServer { config, solver }
    }

    pub async fn bind(&self) -> Result<TcpListener, Error> {
        let address = self.config.bind_address();
        TcpListener::bind(&address).await.map_err(|e| {
            error!("Failed to bind TCP listener to {}: {}", address, e);
            Error::IoError(e)
        })
    }

    /// Binds the configured address and serves until the task is dropped.
    pub async fn run(self) -> Result<(), Error> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Accept loop. A failing connection is logged and never ends the loop.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        info!("GraphServer: listening on {}", listener.local_addr()?);

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept TCP connection: {}", e);
                    continue;
                }
            };

            info!("Client connected: {}", peer_addr);
            match self.handle_connection(stream).await {
                Ok(()) => info!("Client disconnected: {}", peer_addr),
                Err(e) => warn!("Client {} error: {}. Continuing.", peer_addr, e),
            }
        }
    }

    async fn handle_connection(&self, stream: TcpStream) -> Result<(), Error> {
        let (reader, mut writer) = stream.into_split();

        let request = match timeout(
            self.config.read_timeout(),
            read_line_bounded(reader, self.config.max_line_bytes),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.config.read_timeout_ms)),
        };

        let line = match request {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Connection closed before a request was sent");
                return Ok(());
            }
            Err(e) => {
                if let Err(write_err) = write_reply(&mut writer, &fallback_reply(&e)).await {
                    debug!("Could not deliver error reply: {}", write_err);
                }
                return Err(e);
            }
        };

        debug!("Request: {}", line.trim_end());
        let reply = self.solve(line).await;
        debug!("Reply: {}", reply);

        write_reply(&mut writer, &reply).await?;
        writer.shutdown().await?;
        Ok(())
    }

    /// Runs the CPU-bound solve on the blocking pool under the configured deadline.
    ///
    /// On timeout the computation is abandoned; it cannot be interrupted midway.
    async fn solve(&self, line: String) -> String {
        let solver = self.solver.clone();
        let task = tokio::task::spawn_blocking(move || handle_request(&line, &solver));

        match timeout(self.config.solve_timeout(), task).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(join_err)) => {
                let e = Error::SolverTaskFailed(join_err.to_string());
                error!("{}", e);
                fallback_reply(&e)
            }
            Err(_) => {
                let e = Error::Timeout(self.config.solve_timeout_ms);
                warn!("Abandoning request: {}", e);
                fallback_reply(&e)
            }
        }
    }
}
