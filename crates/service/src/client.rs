use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};
use tracing::debug;

use super::error::Error;

/// Sends `payload` as a single line to the service at `addr` and returns the
/// reply line without its terminator.
///
/// Line breaks inside `payload` are folded into spaces, so a pretty-printed
/// JSON document can be sent as is.
pub async fn query(addr: &str, payload: &str, deadline: Duration) -> Result<String, Error> {
    let line = payload.lines().collect::<Vec<_>>().join(" ");

    let exchange = async {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", addr);
        let (reader, mut writer) = stream.into_split();

        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reply = String::new();
        let read = BufReader::new(reader).read_line(&mut reply).await?;
        if read == 0 {
            return Err(Error::EmptyReply);
        }
        Ok::<String, Error>(reply.trim_end().to_string())
    };

    timeout(deadline, exchange)
        .await
        .map_err(|_| Error::Timeout(deadline.as_millis() as u64))?
}
